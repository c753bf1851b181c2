//! SQL identifier quoting

/// Words that must be quoted when used as an identifier
pub const KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "CREATE", "DELETE", "DISTINCT", "DROP", "EXISTS", "FALSE",
    "FROM", "GRANT", "GROUP", "INSERT", "IS", "JOIN", "NOT", "NULL", "ON", "OR", "ORDER", "REVOKE",
    "ROLE", "SCHEMA", "SELECT", "TABLE", "TO", "TRUE", "UNION", "UPDATE", "USER", "WHERE",
];

#[inline]
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// True if `s` can appear unquoted and still read back as itself
pub fn is_simple(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') && !is_keyword(s)
}

/// Quote an identifier for catalog DDL, leaving simple names bare
pub fn quote(s: &str) -> String {
    if is_simple(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_names_stay_bare() {
        assert_eq!(quote("ALICE"), "ALICE");
        assert_eq!(quote("_T1"), "_T1");
        assert_eq!(quote("ACCOUNTS_2024"), "ACCOUNTS_2024");
    }

    #[test]
    fn others_are_quoted() {
        assert_eq!(quote("alice"), "\"alice\"");
        assert_eq!(quote("1ST"), "\"1ST\"");
        assert_eq!(quote("MY ROLE"), "\"MY ROLE\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("SELECT"), "\"SELECT\"");
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }
}

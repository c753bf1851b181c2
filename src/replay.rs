//! Reading catalog rows back
//!
//! Understands exactly the DDL that [`crate::sql`] writes:
//!
//! ```text
//! CREATE USER <name> | CREATE ROLE <name> | CREATE SCHEMA <name>
//! CREATE TABLE [<schema>.]<name>()
//! GRANT <role> TO <principal>
//! GRANT ALL | <privilege>[, <privilege>...]
//!     [ON SCHEMA <schema> | ON [<schema>.]<table>] TO <principal>
//! ```

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{CatalogError, Result};
use crate::grant::Grant;
use crate::ids::{GrantId, ObjectId, PrincipalId};
use crate::object::CatalogObject;
use crate::principal::Principal;
use crate::privilege::{Privilege, PrivilegeSet};
use crate::state::CatalogState;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Unquoted word, upper-cased
    Word(String),
    /// Double-quoted identifier, unescaped
    Quoted(String),
    Comma,
    Dot,
    LParen,
    RParen,
}

/// Table or schema reference by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Schema(String),
    Table { schema: Option<String>, name: String },
}

/// One parsed catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateUser(String),
    CreateRole(String),
    CreateSchema(String),
    CreateTable { schema: Option<String>, name: String },
    GrantRole { role: String, grantee: String },
    GrantRights { rights: PrivilegeSet, target: Option<Target>, grantee: String },
}

fn tokenize(sql: &str) -> std::result::Result<Vec<Token>, String> {
    let mut out = Vec::new();
    let mut chars = sql.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' => {
                chars.next();
                out.push(Token::Comma);
            }
            '.' => {
                chars.next();
                out.push(Token::Dot);
            }
            '(' => {
                chars.next();
                out.push(Token::LParen);
            }
            ')' => {
                chars.next();
                out.push(Token::RParen);
            }
            '"' => {
                chars.next();
                out.push(Token::Quoted(quoted(&mut chars)?));
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut w = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    w.push(c.to_ascii_uppercase());
                    chars.next();
                }
                out.push(Token::Word(w));
            }
            c => return Err(format!("unexpected character {c:?}")),
        }
    }
    Ok(out)
}

fn quoted(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<String, String> {
    let mut s = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                s.push('"');
            }
            Some('"') => return Ok(s),
            Some(c) => s.push(c),
            None => return Err("unterminated quoted identifier".into()),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = std::result::Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn peek_word(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == kw)
    }

    fn eat_word(&mut self, kw: &str) -> bool {
        if self.peek_word(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, kw: &str) -> PResult<()> {
        if self.eat_word(kw) {
            Ok(())
        } else {
            Err(format!("expected {kw}, found {:?}", self.peek()))
        }
    }

    fn expect(&mut self, tok: Token) -> PResult<()> {
        match self.next() {
            Some(t) if t == tok => Ok(()),
            t => Err(format!("expected {tok:?}, found {t:?}")),
        }
    }

    /// Bare words must not be keywords; quoted ones can be anything
    fn ident(&mut self) -> PResult<String> {
        match self.next() {
            Some(Token::Quoted(s)) => Ok(s),
            Some(Token::Word(w)) if !crate::ident::is_keyword(&w) => Ok(w),
            t => Err(format!("expected identifier, found {t:?}")),
        }
    }

    fn qualified(&mut self) -> PResult<(Option<String>, String)> {
        let first = self.ident()?;
        if self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            Ok((Some(first), self.ident()?))
        } else {
            Ok((None, first))
        }
    }

    fn end(&self) -> PResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(format!("unexpected trailing {t:?}")),
        }
    }

    fn statement(&mut self) -> PResult<Statement> {
        let stmt = if self.eat_word("CREATE") {
            self.create()?
        } else if self.eat_word("GRANT") {
            self.grant()?
        } else {
            return Err(format!("unsupported statement starting with {:?}", self.peek()));
        };
        self.end()?;
        Ok(stmt)
    }

    fn create(&mut self) -> PResult<Statement> {
        if self.eat_word("USER") {
            Ok(Statement::CreateUser(self.ident()?))
        } else if self.eat_word("ROLE") {
            Ok(Statement::CreateRole(self.ident()?))
        } else if self.eat_word("SCHEMA") {
            Ok(Statement::CreateSchema(self.ident()?))
        } else if self.eat_word("TABLE") {
            let (schema, name) = self.qualified()?;
            self.expect(Token::LParen)?;
            self.expect(Token::RParen)?;
            Ok(Statement::CreateTable { schema, name })
        } else {
            Err(format!("unsupported CREATE {:?}", self.peek()))
        }
    }

    fn grant(&mut self) -> PResult<Statement> {
        let rights = match self.peek() {
            Some(Token::Word(w)) if w == "ALL" => {
                self.pos += 1;
                Some(PrivilegeSet::ALL)
            }
            Some(Token::Word(w))
                if matches!(w.as_str(), "SELECT" | "DELETE" | "INSERT" | "UPDATE" | "ALTER") =>
            {
                Some(self.privileges()?)
            }
            _ => None,
        };
        let Some(rights) = rights else {
            let role = self.ident()?;
            self.expect_word("TO")?;
            return Ok(Statement::GrantRole { role, grantee: self.ident()? });
        };
        let target = if self.eat_word("ON") {
            if self.eat_word("SCHEMA") {
                Some(Target::Schema(self.ident()?))
            } else {
                let (schema, name) = self.qualified()?;
                Some(Target::Table { schema, name })
            }
        } else {
            None
        };
        self.expect_word("TO")?;
        Ok(Statement::GrantRights { rights, target, grantee: self.ident()? })
    }

    fn privileges(&mut self) -> PResult<PrivilegeSet> {
        let mut set = PrivilegeSet::EMPTY;
        loop {
            let p = if self.eat_word("ALTER") {
                self.expect_word("ANY")?;
                self.expect_word("SCHEMA")?;
                Privilege::AlterAnySchema
            } else {
                match self.next() {
                    Some(Token::Word(w)) => w
                        .parse::<Privilege>()
                        .map_err(|_| format!("unknown privilege {w}"))?,
                    t => return Err(format!("expected privilege, found {t:?}")),
                }
            };
            set.insert(p);
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            } else {
                return Ok(set);
            }
        }
    }
}

/// Parse one catalog row
pub fn parse(sql: &str) -> std::result::Result<Statement, String> {
    let mut p = Parser { tokens: tokenize(sql)?, pos: 0 };
    p.statement()
}

impl CatalogState {
    /// Recreate the entry described by a row under its persisted id
    pub(crate) fn restore(&mut self, id: u64, stmt: Statement) -> Result<()> {
        let fail = |reason: String| CatalogError::Replay { id, reason };
        match stmt {
            Statement::CreateUser(name) => {
                self.insert_principal(Principal::user(PrincipalId(id), name))
            }
            Statement::CreateRole(name) => {
                self.insert_principal(Principal::role(PrincipalId(id), name))
            }
            Statement::CreateSchema(name) => {
                self.insert_object(CatalogObject::schema(ObjectId(id), name))
            }
            Statement::CreateTable { schema, name } => {
                let schema = schema.map(|s| self.lookup_schema(&s).map_err(fail)).transpose()?;
                self.insert_object(CatalogObject::table(ObjectId(id), schema, name))
            }
            Statement::GrantRole { role, grantee } => {
                let role = self.lookup_principal(&role).map_err(fail)?;
                let grantee = self.lookup_principal(&grantee).map_err(fail)?;
                self.insert_grant(Grant::for_role(GrantId(id), grantee, role))
            }
            Statement::GrantRights { rights, target, grantee } => {
                let grantee = self.lookup_principal(&grantee).map_err(fail)?;
                let object = target.map(|t| self.lookup_target(&t).map_err(fail)).transpose()?;
                self.insert_grant(Grant::for_rights(GrantId(id), grantee, rights, object)?)
            }
        }
    }

    fn lookup_principal(&self, name: &str) -> std::result::Result<PrincipalId, String> {
        self.principal_by_name(name).ok_or_else(|| format!("unknown principal {name}"))
    }

    fn lookup_schema(&self, name: &str) -> std::result::Result<ObjectId, String> {
        self.schema_by_name(name).ok_or_else(|| format!("unknown schema {name}"))
    }

    fn lookup_target(&self, target: &Target) -> std::result::Result<ObjectId, String> {
        match target {
            Target::Schema(name) => self.lookup_schema(name),
            Target::Table { schema, name } => {
                let schema = schema.as_deref().map(|s| self.lookup_schema(s)).transpose()?;
                self.table_by_name(schema, name).ok_or_else(|| format!("unknown table {name}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_rows() {
        assert_eq!(parse("CREATE USER ALICE").unwrap(), Statement::CreateUser("ALICE".into()));
        assert_eq!(
            parse("CREATE ROLE \"read only\"").unwrap(),
            Statement::CreateRole("read only".into())
        );
        assert_eq!(
            parse("CREATE TABLE SALES.\"Orders\"()").unwrap(),
            Statement::CreateTable { schema: Some("SALES".into()), name: "Orders".into() }
        );
    }

    #[test]
    fn parses_role_grant_with_keyword_name() {
        assert_eq!(
            parse("GRANT \"SELECT\" TO BOB").unwrap(),
            Statement::GrantRole { role: "SELECT".into(), grantee: "BOB".into() }
        );
    }

    #[test]
    fn parses_privilege_lists() {
        assert_eq!(
            parse("GRANT SELECT, ALTER ANY SCHEMA, UPDATE TO BOB").unwrap(),
            Statement::GrantRights {
                rights: PrivilegeSet::SELECT
                    | PrivilegeSet::ALTER_ANY_SCHEMA
                    | PrivilegeSet::UPDATE,
                target: None,
                grantee: "BOB".into(),
            }
        );
        assert_eq!(
            parse("GRANT ALL ON SCHEMA SALES TO BOB").unwrap(),
            Statement::GrantRights {
                rights: PrivilegeSet::ALL,
                target: Some(Target::Schema("SALES".into())),
                grantee: "BOB".into(),
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("DROP TABLE X").is_err());
        assert!(parse("GRANT SELECT TO").is_err());
        assert!(parse("GRANT SELECT ON T TO BOB EXTRA").is_err());
        assert!(parse("CREATE ROLE \"open").is_err());
        assert!(parse("GRANT TRUNCATE ON T TO BOB").is_err());
    }
}

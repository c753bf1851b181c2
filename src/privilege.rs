//! Privilege kinds and privilege sets

use std::fmt;
use std::ops::{BitOr, Sub};

/// One elementary permission kind
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
pub enum Privilege {
    #[strum(serialize = "SELECT")]
    Select,
    #[strum(serialize = "DELETE")]
    Delete,
    #[strum(serialize = "INSERT")]
    Insert,
    #[strum(serialize = "UPDATE")]
    Update,
    #[strum(serialize = "ALTER ANY SCHEMA")]
    AlterAnySchema,
}

impl Privilege {
    /// Display order used in catalog dumps. Differs from declaration order.
    pub const CANONICAL: [Privilege; 5] = [
        Privilege::Select,
        Privilege::Delete,
        Privilege::Insert,
        Privilege::AlterAnySchema,
        Privilege::Update,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of privileges, stored as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrivilegeSet(u8);

impl PrivilegeSet {
    pub const EMPTY: PrivilegeSet = PrivilegeSet(0);
    pub const SELECT: PrivilegeSet = PrivilegeSet(Privilege::Select.bit());
    pub const DELETE: PrivilegeSet = PrivilegeSet(Privilege::Delete.bit());
    pub const INSERT: PrivilegeSet = PrivilegeSet(Privilege::Insert.bit());
    pub const UPDATE: PrivilegeSet = PrivilegeSet(Privilege::Update.bit());
    pub const ALTER_ANY_SCHEMA: PrivilegeSet = PrivilegeSet(Privilege::AlterAnySchema.bit());
    /// Table privileges. Does not include ALTER ANY SCHEMA.
    pub const ALL: PrivilegeSet = PrivilegeSet(
        Self::SELECT.0 | Self::DELETE.0 | Self::INSERT.0 | Self::UPDATE.0,
    );

    #[inline]
    pub fn contains(self, p: Privilege) -> bool {
        self.0 & p.bit() != 0
    }

    #[inline]
    pub fn contains_all(self, other: PrivilegeSet) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn union(self, other: PrivilegeSet) -> PrivilegeSet {
        PrivilegeSet(self.0 | other.0)
    }

    #[inline]
    pub fn difference(self, other: PrivilegeSet) -> PrivilegeSet {
        PrivilegeSet(self.0 & !other.0)
    }

    pub fn insert(&mut self, p: Privilege) {
        self.0 |= p.bit();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in canonical display order
    pub fn iter(self) -> impl Iterator<Item = Privilege> {
        Privilege::CANONICAL.into_iter().filter(move |p| self.contains(*p))
    }

    /// Privilege list as written in a GRANT statement
    pub fn to_sql(self) -> String {
        if self == Self::ALL {
            return "ALL".to_string();
        }
        self.iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Privilege> for PrivilegeSet {
    fn from(p: Privilege) -> Self {
        PrivilegeSet(p.bit())
    }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = Privilege>>(iter: I) -> Self {
        let mut set = PrivilegeSet::EMPTY;
        for p in iter {
            set.insert(p);
        }
        set
    }
}

impl BitOr for PrivilegeSet {
    type Output = PrivilegeSet;
    fn bitor(self, rhs: PrivilegeSet) -> PrivilegeSet {
        self.union(rhs)
    }
}

impl Sub for PrivilegeSet {
    type Output = PrivilegeSet;
    fn sub(self, rhs: PrivilegeSet) -> PrivilegeSet {
        self.difference(rhs)
    }
}

impl fmt::Display for PrivilegeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn all_excludes_alter_any_schema() {
        assert!(!PrivilegeSet::ALL.contains(Privilege::AlterAnySchema));
        assert_eq!(PrivilegeSet::ALL.len(), 4);
        assert_eq!(Privilege::iter().count(), 5);
    }

    #[test]
    fn set_equality_ignores_insertion_order() {
        let a: PrivilegeSet = [Privilege::Update, Privilege::Select].into_iter().collect();
        let b = PrivilegeSet::SELECT | PrivilegeSet::UPDATE;
        assert_eq!(a, b);
    }

    #[test]
    fn all_shortcut() {
        let s = PrivilegeSet::SELECT
            | PrivilegeSet::DELETE
            | PrivilegeSet::INSERT
            | PrivilegeSet::UPDATE;
        assert_eq!(s.to_sql(), "ALL");
        assert_eq!(
            (s | PrivilegeSet::ALTER_ANY_SCHEMA).to_sql(),
            "SELECT, DELETE, INSERT, ALTER ANY SCHEMA, UPDATE"
        );
    }

    #[test]
    fn canonical_order() {
        let s = PrivilegeSet::UPDATE | PrivilegeSet::SELECT | PrivilegeSet::ALTER_ANY_SCHEMA;
        assert_eq!(s.to_sql(), "SELECT, ALTER ANY SCHEMA, UPDATE");
        assert_eq!(PrivilegeSet::UPDATE.to_sql(), "UPDATE");
        assert_eq!((PrivilegeSet::DELETE | PrivilegeSet::INSERT).to_sql(), "DELETE, INSERT");
    }

    #[test]
    fn difference_and_membership() {
        let s = PrivilegeSet::ALL - PrivilegeSet::DELETE;
        assert!(s.contains(Privilege::Select));
        assert!(!s.contains(Privilege::Delete));
        assert!(PrivilegeSet::ALL.contains_all(s));
        assert!((PrivilegeSet::SELECT - PrivilegeSet::SELECT).is_empty());
    }

    #[test]
    fn keywords_parse_back() {
        for p in Privilege::iter() {
            assert_eq!(p.to_string().parse::<Privilege>().unwrap(), p);
        }
        assert_eq!("ALTER ANY SCHEMA".parse::<Privilege>().unwrap(), Privilege::AlterAnySchema);
        assert!("TRUNCATE".parse::<Privilege>().is_err());
    }
}

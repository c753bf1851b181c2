//! Typed catalog identifiers
//!
//! Principals, objects and grants draw from one id counter owned by the
//! catalog. Ids are indices into the catalog's arenas, never pointers.

use std::fmt;

macro_rules! catalog_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

catalog_id!(
    /// Id of a user or role
    PrincipalId
);
catalog_id!(
    /// Id of a schema or table
    ObjectId
);
catalog_id!(
    /// Id of a grant record
    GrantId
);

//! Error types for grantbook

use crate::ids::{GrantId, ObjectId, PrincipalId};

/// The main error type for catalog and grant operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("grant {id} is a {actual} grant, not a {expected} grant")]
    InvalidShape {
        id: GrantId,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("grant {0} cannot be renamed")]
    RenameUnsupported(String),
    #[error("grant {0} has been revoked")]
    Invalidated(GrantId),
    #[error("privilege set of grant {0} is empty")]
    EmptyPrivileges(GrantId),
    #[error("role {role} is already granted to {grantee}")]
    DuplicateGrant {
        grantee: PrincipalId,
        role: PrincipalId,
    },
    #[error("granting role {role} to {grantee} would create a cycle")]
    CircularRole {
        grantee: PrincipalId,
        role: PrincipalId,
    },
    #[error("{0} is not a role")]
    NotARole(String),
    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: &'static str, name: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("cannot replay catalog row {id}: {reason}")]
    Replay { id: u64, reason: String },
    #[error("stored setting {key} is corrupt: {value:?}")]
    CorruptSetting { key: &'static str, value: String },
    #[error("catalog storage error: {0}")]
    Storage(#[from] heed::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid catalog configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl CatalogError {
    /// True for faults that indicate a bug in the caller rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::InvalidShape { .. } | Self::RenameUnsupported(_) | Self::Invalidated(_)
        )
    }

    pub(crate) fn principal_not_found(id: PrincipalId) -> Self {
        Self::NotFound(format!("principal {id}"))
    }

    pub(crate) fn object_not_found(id: ObjectId) -> Self {
        Self::NotFound(format!("object {id}"))
    }

    pub(crate) fn grant_not_found(id: GrantId) -> Self {
        Self::NotFound(format!("grant {id}"))
    }
}

impl From<figment::Error> for CatalogError {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

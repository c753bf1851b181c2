//! Grant records
//!
//! A grant is either the delegation of a role or the assignment of a
//! privilege set on one scope (a schema, a table, or the whole database).
//! The two shapes are variants of [`GrantKind`]; a record can never hold
//! both. Once revoked, a record is cleared and every further read faults.

use crate::error::{CatalogError, Result};
use crate::ids::{GrantId, ObjectId, PrincipalId};
use crate::principal::RightOwner;
use crate::privilege::PrivilegeSet;
use crate::session::Session;
use crate::sql::{self, SqlNames};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantKind {
    /// The grantee is a member of `role`
    Role(PrincipalId),
    /// The grantee holds `rights` on `object`, or globally when `None`
    Rights {
        rights: PrivilegeSet,
        object: Option<ObjectId>,
    },
}

impl GrantKind {
    fn shape(&self) -> &'static str {
        match self {
            GrantKind::Role(_) => "role",
            GrantKind::Rights { .. } => "privilege",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Live {
    grantee: PrincipalId,
    kind: GrantKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    id: GrantId,
    live: Option<Live>,
}

impl Grant {
    /// Role grant: `grantee` becomes a member of `role`
    pub fn for_role(id: GrantId, grantee: PrincipalId, role: PrincipalId) -> Self {
        Grant { id, live: Some(Live { grantee, kind: GrantKind::Role(role) }) }
    }

    /// Privilege grant on `object`, or global when `object` is `None`
    pub fn for_rights(
        id: GrantId,
        grantee: PrincipalId,
        rights: PrivilegeSet,
        object: Option<ObjectId>,
    ) -> Result<Self> {
        if rights.is_empty() {
            return Err(CatalogError::EmptyPrivileges(id));
        }
        Ok(Grant { id, live: Some(Live { grantee, kind: GrantKind::Rights { rights, object } }) })
    }

    #[inline]
    pub fn id(&self) -> GrantId {
        self.id
    }

    /// Generated bookkeeping name. Carries no meaning.
    pub fn name(&self) -> String {
        match self.live.map(|l| l.kind) {
            Some(GrantKind::Role(_)) => format!("RIGHT_{}", self.id),
            _ => self.id.to_string(),
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.live.is_some()
    }

    fn live(&self) -> Result<&Live> {
        self.live.as_ref().ok_or(CatalogError::Invalidated(self.id))
    }

    pub fn kind(&self) -> Result<GrantKind> {
        Ok(self.live()?.kind)
    }

    pub fn grantee(&self) -> Result<PrincipalId> {
        Ok(self.live()?.grantee)
    }

    pub fn granted_role(&self) -> Result<Option<PrincipalId>> {
        Ok(match self.live()?.kind {
            GrantKind::Role(role) => Some(role),
            GrantKind::Rights { .. } => None,
        })
    }

    pub fn granted_object(&self) -> Result<Option<ObjectId>> {
        Ok(match self.live()?.kind {
            GrantKind::Rights { object, .. } => object,
            GrantKind::Role(_) => None,
        })
    }

    /// Privilege set of a privilege grant. Faults on a role grant.
    pub fn rights(&self) -> Result<PrivilegeSet> {
        match self.live()?.kind {
            GrantKind::Rights { rights, .. } => Ok(rights),
            kind => Err(self.wrong_shape("privilege", kind)),
        }
    }

    /// Replace the privilege set in place. Grantee and scope never change.
    pub fn set_rights(&mut self, new: PrivilegeSet) -> Result<()> {
        let id = self.id;
        let live = self.live.as_mut().ok_or(CatalogError::Invalidated(id))?;
        match &mut live.kind {
            GrantKind::Rights { rights, .. } => {
                if new.is_empty() {
                    return Err(CatalogError::EmptyPrivileges(id));
                }
                *rights = new;
                Ok(())
            }
            GrantKind::Role(_) => Err(CatalogError::InvalidShape {
                id,
                expected: "privilege",
                actual: "role",
            }),
        }
    }

    /// Grant records are system-named and can never be renamed
    pub fn rename(&self, _new_name: &str) -> Result<()> {
        Err(CatalogError::RenameUnsupported(self.name()))
    }

    /// Canonical `GRANT ... TO ...` text for this record
    pub fn to_sql<N: SqlNames + ?Sized>(&self, names: &N) -> Result<String> {
        sql::grant_sql(self, names)
    }

    /// Same text with the privileges aimed at `object` instead, used to
    /// carry grants over to a recreated table. Role grants ignore `object`.
    pub fn to_sql_for_copy<N: SqlNames + ?Sized>(
        &self,
        names: &N,
        object: Option<ObjectId>,
    ) -> Result<String> {
        sql::grant_sql_for(self, names, object)
    }

    /// Revoke this record.
    ///
    /// Detaches it from the grantee, drops it from the session's catalog
    /// state and deletes its metadata row, then clears it. Rolls back with
    /// the session if the enclosing transaction fails.
    pub fn remove(&mut self, session: &mut Session<'_>) -> Result<()> {
        let live = *self.live()?;
        let grantee = session.state.principal_mut(live.grantee)?;
        // A stale copy must not detach the grant that replaced it
        let linked = match live.kind {
            GrantKind::Role(role) => grantee.role_grant(role),
            GrantKind::Rights { object, .. } => grantee.right_grant(object),
        };
        if linked != Some(self.id) {
            return Err(CatalogError::grant_not_found(self.id));
        }
        match live.kind {
            GrantKind::Role(role) => grantee.revoke_role(role)?,
            GrantKind::Rights { object, .. } => grantee.revoke_right(object)?,
        };
        session.state.grants.remove(&self.id);
        session.remove_meta(self.id.get())?;
        tracing::debug!(grant = %self.id, grantee = %live.grantee, "grant removed");
        self.live = None;
        Ok(())
    }

    fn wrong_shape(&self, expected: &'static str, kind: GrantKind) -> CatalogError {
        CatalogError::InvalidShape { id: self.id, expected, actual: kind.shape() }
    }
}

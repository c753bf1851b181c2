//! Users and roles, and the bookkeeping of grants issued to them

use std::collections::BTreeMap;

use crate::error::{CatalogError, Result};
use crate::ident::quote;
use crate::ids::{GrantId, ObjectId, PrincipalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// Terminal principal, never granted to anyone
    User,
    /// Can hold grants and be granted to other principals
    Role,
}

/// Anything that can receive grants.
///
/// A grant record calls back into its grantee when it is revoked, so the
/// grantee stops listing it.
pub trait RightOwner {
    /// Quoted catalog identifier
    fn sql(&self) -> String;

    /// Detach the grant of `role`. Fails if the role was never granted.
    fn revoke_role(&mut self, role: PrincipalId) -> Result<GrantId>;

    /// Detach the privilege grant for `object` (`None` is the global scope).
    /// Fails if there is no grant for that scope.
    fn revoke_right(&mut self, object: Option<ObjectId>) -> Result<GrantId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub kind: PrincipalKind,
    roles: BTreeMap<PrincipalId, GrantId>,
    rights: BTreeMap<Option<ObjectId>, GrantId>,
}

impl Principal {
    pub fn new(id: PrincipalId, name: impl Into<String>, kind: PrincipalKind) -> Self {
        Principal { id, name: name.into(), kind, roles: BTreeMap::new(), rights: BTreeMap::new() }
    }

    pub fn user(id: PrincipalId, name: impl Into<String>) -> Self {
        Self::new(id, name, PrincipalKind::User)
    }

    pub fn role(id: PrincipalId, name: impl Into<String>) -> Self {
        Self::new(id, name, PrincipalKind::Role)
    }

    #[inline]
    pub fn is_role(&self) -> bool {
        self.kind == PrincipalKind::Role
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            PrincipalKind::User => "user",
            PrincipalKind::Role => "role",
        }
    }

    /// Grant record through which `role` was given to this principal
    pub fn role_grant(&self, role: PrincipalId) -> Option<GrantId> {
        self.roles.get(&role).copied()
    }

    /// Grant record holding this principal's privileges on `object`
    pub fn right_grant(&self, object: Option<ObjectId>) -> Option<GrantId> {
        self.rights.get(&object).copied()
    }

    /// Roles granted directly to this principal
    pub fn granted_roles(&self) -> impl Iterator<Item = PrincipalId> + '_ {
        self.roles.keys().copied()
    }

    /// Every grant record issued to this principal, role grants first
    pub fn grant_ids(&self) -> impl Iterator<Item = GrantId> + '_ {
        self.roles.values().chain(self.rights.values()).copied()
    }

    pub(crate) fn attach_role(&mut self, role: PrincipalId, grant: GrantId) -> Result<()> {
        if self.roles.contains_key(&role) {
            return Err(CatalogError::DuplicateGrant { grantee: self.id, role });
        }
        self.roles.insert(role, grant);
        Ok(())
    }

    pub(crate) fn attach_right(&mut self, object: Option<ObjectId>, grant: GrantId) -> Result<()> {
        if let Some(existing) = self.rights.get(&object) {
            return Err(CatalogError::AlreadyExists {
                kind: "grant",
                name: existing.to_string(),
            });
        }
        self.rights.insert(object, grant);
        Ok(())
    }
}

impl RightOwner for Principal {
    fn sql(&self) -> String {
        quote(&self.name)
    }

    fn revoke_role(&mut self, role: PrincipalId) -> Result<GrantId> {
        self.roles.remove(&role).ok_or_else(|| {
            CatalogError::NotFound(format!("role {role} granted to {}", self.name))
        })
    }

    fn revoke_right(&mut self, object: Option<ObjectId>) -> Result<GrantId> {
        self.rights.remove(&object).ok_or_else(|| match object {
            Some(o) => {
                CatalogError::NotFound(format!("right on object {o} granted to {}", self.name))
            }
            None => CatalogError::NotFound(format!("global right granted to {}", self.name)),
        })
    }
}

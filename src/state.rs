//! In-memory catalog state: arenas of principals, objects and grants

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CatalogError, Result};
use crate::grant::{Grant, GrantKind};
use crate::ids::{GrantId, ObjectId, PrincipalId};
use crate::object::{CatalogObject, ObjectKind};
use crate::principal::Principal;
use crate::sql::{self, SqlNames};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub(crate) principals: BTreeMap<PrincipalId, Principal>,
    pub(crate) objects: BTreeMap<ObjectId, CatalogObject>,
    pub(crate) grants: BTreeMap<GrantId, Grant>,
    principal_names: BTreeMap<String, PrincipalId>,
    schema_names: BTreeMap<String, ObjectId>,
    table_names: BTreeMap<(Option<ObjectId>, String), ObjectId>,
}

impl CatalogState {
    pub fn principal_mut(&mut self, id: PrincipalId) -> Result<&mut Principal> {
        self.principals.get_mut(&id).ok_or_else(|| CatalogError::principal_not_found(id))
    }

    pub fn grant_ref(&self, id: GrantId) -> Result<&Grant> {
        self.grants.get(&id).ok_or_else(|| CatalogError::grant_not_found(id))
    }

    pub fn grant_mut(&mut self, id: GrantId) -> Result<&mut Grant> {
        self.grants.get_mut(&id).ok_or_else(|| CatalogError::grant_not_found(id))
    }

    pub fn principal_by_name(&self, name: &str) -> Option<PrincipalId> {
        self.principal_names.get(name).copied()
    }

    pub fn schema_by_name(&self, name: &str) -> Option<ObjectId> {
        self.schema_names.get(name).copied()
    }

    pub fn table_by_name(&self, schema: Option<ObjectId>, name: &str) -> Option<ObjectId> {
        self.table_names.get(&(schema, name.to_string())).copied()
    }

    pub(crate) fn insert_principal(&mut self, principal: Principal) -> Result<()> {
        if self.principal_names.contains_key(&principal.name) {
            return Err(CatalogError::AlreadyExists {
                kind: principal.kind_name(),
                name: principal.name,
            });
        }
        self.principal_names.insert(principal.name.clone(), principal.id);
        self.principals.insert(principal.id, principal);
        Ok(())
    }

    pub(crate) fn insert_object(&mut self, object: CatalogObject) -> Result<()> {
        match object.kind {
            ObjectKind::Schema => {
                if self.schema_names.contains_key(&object.name) {
                    return Err(CatalogError::AlreadyExists { kind: "schema", name: object.name });
                }
                self.schema_names.insert(object.name.clone(), object.id);
            }
            ObjectKind::Table { schema } => {
                if let Some(schema) = schema {
                    if !self.object(schema)?.is_schema() {
                        return Err(CatalogError::NotFound(format!("schema {schema}")));
                    }
                }
                let key = (schema, object.name.clone());
                if self.table_names.contains_key(&key) {
                    return Err(CatalogError::AlreadyExists { kind: "table", name: object.name });
                }
                self.table_names.insert(key, object.id);
            }
        }
        self.objects.insert(object.id, object);
        Ok(())
    }

    /// Link a new grant into its grantee's bookkeeping and the grant arena.
    ///
    /// Role grants are rejected when they duplicate an existing direct grant
    /// or would make a role a member of itself.
    pub(crate) fn insert_grant(&mut self, grant: Grant) -> Result<()> {
        let grantee = grant.grantee()?;
        self.principal(grantee)?;
        match grant.kind()? {
            GrantKind::Role(role) => {
                let granted = self.principal(role)?;
                if !granted.is_role() {
                    return Err(CatalogError::NotARole(granted.name.clone()));
                }
                if grantee == role || self.is_role_granted(role, grantee) {
                    return Err(CatalogError::CircularRole { grantee, role });
                }
                self.principal_mut(grantee)?.attach_role(role, grant.id())?;
            }
            GrantKind::Rights { object, .. } => {
                if let Some(object) = object {
                    self.object(object)?;
                }
                self.principal_mut(grantee)?.attach_right(object, grant.id())?;
            }
        }
        self.grants.insert(grant.id(), grant);
        Ok(())
    }

    pub(crate) fn remove_principal(&mut self, id: PrincipalId) -> Result<Principal> {
        let principal = self
            .principals
            .remove(&id)
            .ok_or_else(|| CatalogError::principal_not_found(id))?;
        self.principal_names.remove(&principal.name);
        Ok(principal)
    }

    pub(crate) fn remove_object(&mut self, id: ObjectId) -> Result<CatalogObject> {
        let object = self.objects.remove(&id).ok_or_else(|| CatalogError::object_not_found(id))?;
        match object.kind {
            ObjectKind::Schema => self.schema_names.remove(&object.name),
            ObjectKind::Table { schema } => self.table_names.remove(&(schema, object.name.clone())),
        };
        Ok(object)
    }

    /// True if `role` reaches `principal` directly or through nested roles
    pub fn is_role_granted(&self, principal: PrincipalId, role: PrincipalId) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![principal];
        while let Some(p) = stack.pop() {
            if !seen.insert(p) {
                continue;
            }
            let Some(entry) = self.principals.get(&p) else { continue };
            for granted in entry.granted_roles() {
                if granted == role {
                    return true;
                }
                stack.push(granted);
            }
        }
        false
    }

    /// Principals holding a direct grant of `role`
    pub fn role_members(&self, role: PrincipalId) -> Vec<PrincipalId> {
        self.principals
            .values()
            .filter(|p| p.role_grant(role).is_some())
            .map(|p| p.id)
            .collect()
    }

    /// Privilege grants scoped to `object`
    pub fn grants_on(&self, object: ObjectId) -> Vec<GrantId> {
        self.grants
            .values()
            .filter(|g| matches!(g.granted_object(), Ok(Some(o)) if o == object))
            .map(Grant::id)
            .collect()
    }

    /// Tables held by `schema`
    pub fn tables_in(&self, schema: ObjectId) -> Vec<ObjectId> {
        self.objects.values().filter(|o| o.parent() == Some(schema)).map(|o| o.id).collect()
    }

    /// Create SQL for the row with this id
    pub fn row_sql(&self, id: u64) -> Option<Result<String>> {
        if let Some(p) = self.principals.get(&PrincipalId(id)) {
            return Some(Ok(sql::principal_sql(p)));
        }
        if let Some(o) = self.objects.get(&ObjectId(id)) {
            return Some(sql::object_sql(o, self));
        }
        self.grants.get(&GrantId(id)).map(|g| g.to_sql(self))
    }

    /// Every row id in the catalog, ascending
    pub fn row_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .principals
            .keys()
            .map(|id| id.get())
            .chain(self.objects.keys().map(|id| id.get()))
            .chain(self.grants.keys().map(|id| id.get()))
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl SqlNames for CatalogState {
    fn principal(&self, id: PrincipalId) -> Result<&Principal> {
        self.principals.get(&id).ok_or_else(|| CatalogError::principal_not_found(id))
    }

    fn object(&self, id: ObjectId) -> Result<&CatalogObject> {
        self.objects.get(&id).ok_or_else(|| CatalogError::object_not_found(id))
    }
}

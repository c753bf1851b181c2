//! Write session: every catalog mutation runs inside one

use heed::RwTxn;

use crate::db::Dbs;
use crate::error::{CatalogError, Result};
use crate::grant::Grant;
use crate::ids::{GrantId, ObjectId, PrincipalId};
use crate::object::CatalogObject;
use crate::principal::Principal;
use crate::privilege::PrivilegeSet;
use crate::sql::{self, SqlNames};
use crate::state::CatalogState;

/// LMDB write transaction plus a working copy of the catalog state.
///
/// Obtained from [`crate::Catalog::transact`]; both halves commit together
/// or are discarded together.
pub struct Session<'a> {
    pub(crate) txn: RwTxn<'a>,
    pub(crate) dbs: Dbs,
    pub(crate) state: CatalogState,
}

impl<'a> Session<'a> {
    pub(crate) fn new(txn: RwTxn<'a>, dbs: Dbs, state: CatalogState) -> Self {
        Session { txn, dbs, state }
    }

    /// Catalog state as seen inside this session
    #[inline]
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    fn next_id(&mut self) -> Result<u64> {
        let id = self.dbs.next_id(&self.txn)?;
        self.dbs.set_next_id(&mut self.txn, id + 1)?;
        Ok(id)
    }

    pub(crate) fn add_meta(&mut self, id: u64, sql: &str) -> Result<()> {
        self.dbs.put_meta(&mut self.txn, id, sql)
    }

    /// Delete the persisted row for `id`
    pub fn remove_meta(&mut self, id: u64) -> Result<()> {
        self.dbs.del_meta(&mut self.txn, id)?;
        Ok(())
    }

    // Principals & objects

    pub fn create_user(&mut self, name: &str) -> Result<PrincipalId> {
        self.create_principal(|id| Principal::user(id, name))
    }

    pub fn create_role(&mut self, name: &str) -> Result<PrincipalId> {
        self.create_principal(|id| Principal::role(id, name))
    }

    fn create_principal(
        &mut self,
        make: impl FnOnce(PrincipalId) -> Principal,
    ) -> Result<PrincipalId> {
        let id = PrincipalId(self.next_id()?);
        let principal = make(id);
        let row = sql::principal_sql(&principal);
        self.state.insert_principal(principal)?;
        self.add_meta(id.get(), &row)?;
        tracing::debug!(principal = %id, "{row}");
        Ok(id)
    }

    pub fn create_schema(&mut self, name: &str) -> Result<ObjectId> {
        self.create_object(|id| CatalogObject::schema(id, name))
    }

    pub fn create_table(&mut self, schema: Option<ObjectId>, name: &str) -> Result<ObjectId> {
        self.create_object(|id| CatalogObject::table(id, schema, name))
    }

    fn create_object(&mut self, make: impl FnOnce(ObjectId) -> CatalogObject) -> Result<ObjectId> {
        let id = ObjectId(self.next_id()?);
        self.state.insert_object(make(id))?;
        let row = sql::object_sql(self.state.object(id)?, &self.state)?;
        self.add_meta(id.get(), &row)?;
        tracing::debug!(object = %id, "{row}");
        Ok(id)
    }

    /// Drop an object, revoking every grant on it. A schema takes its tables with it.
    #[tracing::instrument(skip(self))]
    pub fn drop_object(&mut self, object: ObjectId) -> Result<()> {
        if self.state.object(object)?.is_schema() {
            for table in self.state.tables_in(object) {
                self.drop_object(table)?;
            }
        }
        for grant in self.state.grants_on(object) {
            self.remove_grant(grant)?;
        }
        self.state.remove_object(object)?;
        self.remove_meta(object.get())
    }

    /// Drop a principal with the grants it holds and, for a role, every grant of it
    #[tracing::instrument(skip(self))]
    pub fn drop_principal(&mut self, principal: PrincipalId) -> Result<()> {
        let held: Vec<GrantId> = self.state.principal(principal)?.grant_ids().collect();
        for grant in held {
            self.remove_grant(grant)?;
        }
        for member in self.state.role_members(principal) {
            self.revoke_role(member, principal)?;
        }
        self.state.remove_principal(principal)?;
        self.remove_meta(principal.get())
    }

    // Grants

    /// Make `grantee` a member of `role`
    #[tracing::instrument(skip(self))]
    pub fn grant_role(&mut self, grantee: PrincipalId, role: PrincipalId) -> Result<GrantId> {
        let id = GrantId(self.next_id()?);
        self.state.insert_grant(Grant::for_role(id, grantee, role))?;
        self.persist_grant(id)?;
        Ok(id)
    }

    /// Grant `rights` on `object` (global when `None`).
    ///
    /// Merges into the grantee's existing grant for the same scope if there
    /// is one, and returns that grant's id.
    #[tracing::instrument(skip(self))]
    pub fn grant_rights(
        &mut self,
        grantee: PrincipalId,
        rights: PrivilegeSet,
        object: Option<ObjectId>,
    ) -> Result<GrantId> {
        if let Some(existing) = self.state.principal(grantee)?.right_grant(object) {
            if rights.is_empty() {
                return Err(CatalogError::EmptyPrivileges(existing));
            }
            let merged = self.state.grant_ref(existing)?.rights()? | rights;
            self.set_rights(existing, merged)?;
            return Ok(existing);
        }
        let id = GrantId(self.next_id()?);
        self.state.insert_grant(Grant::for_rights(id, grantee, rights, object)?)?;
        self.persist_grant(id)?;
        Ok(id)
    }

    /// Replace the privilege set of a grant and rewrite its row
    pub fn set_rights(&mut self, grant: GrantId, rights: PrivilegeSet) -> Result<()> {
        self.state.grant_mut(grant)?.set_rights(rights)?;
        self.persist_grant(grant)
    }

    #[tracing::instrument(skip(self))]
    pub fn revoke_role(&mut self, grantee: PrincipalId, role: PrincipalId) -> Result<()> {
        let grant = self
            .state
            .principal(grantee)?
            .role_grant(role)
            .ok_or_else(|| CatalogError::NotFound(format!("role {role} granted to {grantee}")))?;
        self.remove_grant(grant).map(|_| ())
    }

    /// Take `rights` away on `object`; the grant goes when nothing is left
    #[tracing::instrument(skip(self))]
    pub fn revoke_rights(
        &mut self,
        grantee: PrincipalId,
        rights: PrivilegeSet,
        object: Option<ObjectId>,
    ) -> Result<()> {
        let grant = self
            .state
            .principal(grantee)?
            .right_grant(object)
            .ok_or_else(|| CatalogError::NotFound(format!("rights of {grantee} on {object:?}")))?;
        let remaining = self.state.grant_ref(grant)?.rights()? - rights;
        if remaining.is_empty() {
            self.remove_grant(grant).map(|_| ())
        } else {
            self.set_rights(grant, remaining)
        }
    }

    /// Revoke a grant by id and hand back the cleared record
    pub fn remove_grant(&mut self, grant: GrantId) -> Result<Grant> {
        let mut record = self.state.grant_ref(grant)?.clone();
        record.remove(self)?;
        Ok(record)
    }

    fn persist_grant(&mut self, id: GrantId) -> Result<()> {
        let row = self.state.grant_ref(id)?.to_sql(&self.state)?;
        tracing::debug!(grant = %id, "{row}");
        self.add_meta(id.get(), &row)
    }
}

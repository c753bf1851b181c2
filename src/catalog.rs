//! Catalog handle: open, replay, transact, inspect

use std::path::Path;

use crate::config::CatalogConfig;
use crate::db::Store;
use crate::error::{CatalogError, Result};
use crate::grant::Grant;
use crate::ids::{GrantId, ObjectId, PrincipalId};
use crate::object::CatalogObject;
use crate::principal::Principal;
use crate::replay;
use crate::session::Session;
use crate::sql::SqlNames;
use crate::state::CatalogState;

/// An open authorization catalog.
///
/// Reads go straight to the in-memory state. Writes go through
/// [`Catalog::transact`], which needs `&mut self`, so at most one writer
/// exists per handle.
pub struct Catalog {
    store: Store,
    state: CatalogState,
}

impl Catalog {
    /// Open (or create) the catalog and replay its persisted rows
    #[tracing::instrument(skip_all, fields(path = %config.path.display()))]
    pub fn open(config: &CatalogConfig) -> Result<Self> {
        let store = Store::open(&config.path, config.map_size)?;
        let (rows, next_id) = store.read(|d, tx| Ok((d.rows(tx)?, d.next_id(tx)?)))?;
        let mut state = CatalogState::default();
        for (id, sql) in &rows {
            let stmt = replay::parse(sql)
                .map_err(|reason| CatalogError::Replay { id: *id, reason })?;
            state.restore(*id, stmt)?;
        }
        tracing::info!(rows = rows.len(), next_id, "catalog replayed");
        Ok(Catalog { store, state })
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(&CatalogConfig::with_path(path.as_ref()))
    }

    /// Run `f` in one write transaction.
    ///
    /// If `f` fails, neither the stored rows nor the in-memory state change.
    pub fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'_>) -> Result<T>,
    {
        let txn = self.store.env.write_txn()?;
        let mut session = Session::new(txn, self.store.dbs, self.state.clone());
        let r = match f(&mut session) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "catalog transaction aborted");
                return Err(e);
            }
        };
        let Session { txn, state, .. } = session;
        txn.commit()?;
        self.state = state;
        Ok(r)
    }

    #[inline]
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn principal(&self, id: PrincipalId) -> Option<&Principal> {
        self.state.principals.get(&id)
    }

    pub fn principal_by_name(&self, name: &str) -> Option<&Principal> {
        self.state.principal_by_name(name).and_then(|id| self.principal(id))
    }

    pub fn object(&self, id: ObjectId) -> Option<&CatalogObject> {
        self.state.objects.get(&id)
    }

    pub fn grant(&self, id: GrantId) -> Option<&Grant> {
        self.state.grants.get(&id)
    }

    pub fn grants(&self) -> impl Iterator<Item = &Grant> {
        self.state.grants.values()
    }

    /// Grants issued to `principal`, role grants first
    pub fn grants_to(&self, principal: PrincipalId) -> Vec<&Grant> {
        self.principal(principal)
            .map(|p| p.grant_ids().filter_map(|id| self.grant(id)).collect())
            .unwrap_or_default()
    }

    /// Principals `role` was granted to directly
    pub fn role_members(&self, role: PrincipalId) -> Vec<PrincipalId> {
        self.state.role_members(role)
    }

    /// True if `principal` holds `role` directly or through other roles
    pub fn is_role_granted(&self, principal: PrincipalId, role: PrincipalId) -> bool {
        self.state.is_role_granted(principal, role)
    }

    pub fn grant_sql(&self, id: GrantId) -> Result<String> {
        self.state.grant_ref(id)?.to_sql(&self.state)
    }

    /// Every catalog row's create SQL, in id order
    pub fn script(&self) -> Result<Vec<String>> {
        self.state
            .row_ids()
            .into_iter()
            .filter_map(|id| self.state.row_sql(id))
            .collect()
    }

    /// Rows as stored, in id order
    pub fn stored_rows(&self) -> Result<Vec<(u64, String)>> {
        self.store.read(|d, tx| d.rows(tx))
    }

    /// Quoted identifier of an object, schema-qualified for tables
    pub fn object_sql(&self, id: ObjectId) -> Result<String> {
        self.state.object_sql(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privilege::PrivilegeSet;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn open_logs_replayed_rows() {
        let dir = TempDir::new().unwrap();
        {
            let mut c = Catalog::open_path(dir.path()).unwrap();
            c.transact(|s| {
                let alice = s.create_user("ALICE")?;
                s.grant_rights(alice, PrivilegeSet::SELECT, None)
            })
            .unwrap();
        }
        let c = Catalog::open_path(dir.path()).unwrap();
        assert_eq!(c.grants().count(), 1);
        assert!(logs_contain("catalog replayed"));
        assert!(logs_contain("rows=2"));
        assert!(logs_contain("next_id=3"));
    }

    #[test]
    #[traced_test]
    fn aborted_transaction_is_logged() {
        let dir = TempDir::new().unwrap();
        let mut c = Catalog::open_path(dir.path()).unwrap();
        let r = c.transact(|s| s.create_role("R").and_then(|r| s.grant_role(r, r)));
        assert!(r.is_err());
        assert!(logs_contain("catalog transaction aborted"));
        assert!(c.principal_by_name("R").is_none());
    }
}

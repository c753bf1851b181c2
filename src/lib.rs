//! grantbook - access rights of a relational catalog
//!
//! A grant is either the delegation of a role to a principal or the
//! assignment of privileges on a schema, a table, or the whole database.
//! Every grant renders to the canonical `GRANT` statement that recreates it;
//! catalog rows are stored in LMDB as that text and replayed on open.
//!
//! ```no_run
//! use grantbook::{Catalog, PrivilegeSet};
//!
//! # fn main() -> grantbook::Result<()> {
//! let mut catalog = Catalog::open_path("catalog.mdb")?;
//! let grant = catalog.transact(|s| {
//!     let alice = s.create_user("ALICE")?;
//!     let accounts = s.create_table(None, "ACCOUNTS")?;
//!     s.grant_rights(alice, PrivilegeSet::SELECT | PrivilegeSet::INSERT, Some(accounts))
//! })?;
//! assert_eq!(catalog.grant_sql(grant)?, "GRANT SELECT, INSERT ON ACCOUNTS TO ALICE");
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod grant;
pub mod ident;
pub mod ids;
pub mod object;
pub mod principal;
pub mod privilege;
pub mod replay;
pub mod session;
pub mod sql;
pub mod state;

pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use grant::{Grant, GrantKind};
pub use ids::{GrantId, ObjectId, PrincipalId};
pub use object::{CatalogObject, ObjectKind};
pub use principal::{Principal, PrincipalKind, RightOwner};
pub use privilege::{Privilege, PrivilegeSet};
pub use session::Session;
pub use sql::SqlNames;
pub use state::CatalogState;

//! Canonical catalog DDL
//!
//! Every catalog row is stored as the SQL that recreates it. The text is
//! stable so catalog dumps diff cleanly, and [`crate::replay`] reads it back.

use crate::error::Result;
use crate::grant::{Grant, GrantKind};
use crate::ids::{ObjectId, PrincipalId};
use crate::object::{CatalogObject, ObjectKind};
use crate::principal::{Principal, PrincipalKind, RightOwner};

/// Name lookups needed to render a grant
pub trait SqlNames {
    fn principal(&self, id: PrincipalId) -> Result<&Principal>;
    fn object(&self, id: ObjectId) -> Result<&CatalogObject>;

    /// Quoted identifier of an object, schema-qualified for tables
    fn object_sql(&self, id: ObjectId) -> Result<String> {
        let object = self.object(id)?;
        match object.kind {
            ObjectKind::Table { schema: Some(schema) } => {
                Ok(format!("{}.{}", self.object(schema)?.quoted_name(), object.quoted_name()))
            }
            _ => Ok(object.quoted_name()),
        }
    }
}

/// `GRANT <role> | <privileges> [ON SCHEMA <schema> | ON <table>] TO <grantee>`
pub fn grant_sql<N: SqlNames + ?Sized>(grant: &Grant, names: &N) -> Result<String> {
    grant_sql_for(grant, names, grant.granted_object()?)
}

/// [`grant_sql`] with a privilege grant's scope replaced by `object`.
/// Role grants render unchanged.
pub fn grant_sql_for<N: SqlNames + ?Sized>(
    grant: &Grant,
    names: &N,
    object: Option<ObjectId>,
) -> Result<String> {
    let mut buf = String::from("GRANT ");
    match grant.kind()? {
        GrantKind::Role(role) => buf.push_str(&names.principal(role)?.sql()),
        GrantKind::Rights { rights, .. } => {
            buf.push_str(&rights.to_sql());
            if let Some(object) = object {
                let on = if names.object(object)?.is_schema() { " ON SCHEMA " } else { " ON " };
                buf.push_str(on);
                buf.push_str(&names.object_sql(object)?);
            }
        }
    }
    buf.push_str(" TO ");
    buf.push_str(&names.principal(grant.grantee()?)?.sql());
    Ok(buf)
}

pub fn principal_sql(principal: &Principal) -> String {
    match principal.kind {
        PrincipalKind::User => format!("CREATE USER {}", principal.sql()),
        PrincipalKind::Role => format!("CREATE ROLE {}", principal.sql()),
    }
}

pub fn object_sql<N: SqlNames + ?Sized>(object: &CatalogObject, names: &N) -> Result<String> {
    Ok(match object.kind {
        ObjectKind::Schema => format!("CREATE SCHEMA {}", object.quoted_name()),
        ObjectKind::Table { .. } => format!("CREATE TABLE {}()", names.object_sql(object.id)?),
    })
}

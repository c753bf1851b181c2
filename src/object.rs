//! Catalog objects a privilege grant can be scoped to

use crate::ident::quote;
use crate::ids::ObjectId;

/// Schema or table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Schema,
    /// Table, optionally qualified by the schema that holds it
    Table { schema: Option<ObjectId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
}

impl CatalogObject {
    pub fn schema(id: ObjectId, name: impl Into<String>) -> Self {
        CatalogObject { id, name: name.into(), kind: ObjectKind::Schema }
    }

    pub fn table(id: ObjectId, schema: Option<ObjectId>, name: impl Into<String>) -> Self {
        CatalogObject { id, name: name.into(), kind: ObjectKind::Table { schema } }
    }

    #[inline]
    pub fn is_schema(&self) -> bool {
        matches!(self.kind, ObjectKind::Schema)
    }

    /// Schema holding this table, if any
    pub fn parent(&self) -> Option<ObjectId> {
        match self.kind {
            ObjectKind::Table { schema } => schema,
            ObjectKind::Schema => None,
        }
    }

    /// Quoted own name, without schema qualification
    pub fn quoted_name(&self) -> String {
        quote(&self.name)
    }
}

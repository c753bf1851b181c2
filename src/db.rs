//! LMDB storage for catalog metadata rows

use std::path::Path;

use byteorder::BigEndian;
use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use crate::error::{CatalogError, Result};

/// id -> create SQL
pub type MetaDb = Database<U64<BigEndian>, Str>;
/// setting name -> value
pub type SettingsDb = Database<Str, Str>;

const NEXT_ID: &str = "next_id";

/// All database handles
#[derive(Clone, Copy)]
pub struct Dbs {
    pub meta: MetaDb,
    pub settings: SettingsDb,
}

impl Dbs {
    pub fn put_meta(&self, tx: &mut RwTxn, id: u64, sql: &str) -> Result<()> {
        Ok(self.meta.put(tx, &id, sql)?)
    }

    pub fn del_meta(&self, tx: &mut RwTxn, id: u64) -> Result<bool> {
        Ok(self.meta.delete(tx, &id)?)
    }

    /// All rows in id order
    pub fn rows(&self, tx: &RoTxn) -> Result<Vec<(u64, String)>> {
        let mut r = Vec::new();
        for item in self.meta.iter(tx)? {
            let (id, sql) = item?;
            r.push((id, sql.to_string()));
        }
        Ok(r)
    }

    /// Next free id; 1 on a fresh store
    pub fn next_id(&self, tx: &RoTxn) -> Result<u64> {
        match self.settings.get(tx, NEXT_ID)? {
            None => Ok(1),
            Some(s) => s.parse().map_err(|_| CatalogError::CorruptSetting {
                key: NEXT_ID,
                value: s.to_string(),
            }),
        }
    }

    pub fn set_next_id(&self, tx: &mut RwTxn, id: u64) -> Result<()> {
        Ok(self.settings.put(tx, NEXT_ID, &id.to_string())?)
    }
}

/// Open LMDB environment plus its tables
pub struct Store {
    pub env: Env,
    pub dbs: Dbs,
}

impl Store {
    pub fn open(path: &Path, map_size: usize) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        // SAFETY: LMDB requires no other process to open this path concurrently.
        let env = unsafe { EnvOpenOptions::new().map_size(map_size).max_dbs(2).open(path)? };
        let mut tx = env.write_txn()?;
        let dbs = Dbs {
            meta: env.create_database(&mut tx, Some("meta"))?,
            settings: env.create_database(&mut tx, Some("settings"))?,
        };
        tx.commit()?;
        Ok(Store { env, dbs })
    }

    /// Execute a read-only operation
    pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.dbs, &self.env.read_txn()?)
    }
}

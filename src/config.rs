//! Catalog configuration

use std::path::PathBuf;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable prefix, e.g. `GRANTBOOK_PATH`
pub const ENV_PREFIX: &str = "GRANTBOOK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding the LMDB environment
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// LMDB map size in bytes
    #[serde(default = "default_map_size")]
    pub map_size: usize,
}

fn default_path() -> PathBuf {
    PathBuf::from("grantbook.mdb")
}

fn default_map_size() -> usize {
    1 << 30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig { path: default_path(), map_size: default_map_size() }
    }
}

impl CatalogConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        CatalogConfig { path: path.into(), ..Default::default() }
    }

    /// Defaults overridden by `GRANTBOOK_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(CatalogConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        figment::Jail::expect_with(|_jail| {
            assert_eq!(CatalogConfig::from_env().unwrap(), CatalogConfig::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GRANTBOOK_PATH", "/var/lib/catalog");
            jail.set_env("GRANTBOOK_MAP_SIZE", "4096");
            let c = CatalogConfig::from_env().unwrap();
            assert_eq!(c.path, PathBuf::from("/var/lib/catalog"));
            assert_eq!(c.map_size, 4096);
            Ok(())
        });
    }

    #[test]
    fn bad_value_is_a_config_error() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GRANTBOOK_MAP_SIZE", "lots");
            let e = CatalogConfig::from_env().unwrap_err();
            assert!(matches!(e, crate::CatalogError::Config(_)));
            Ok(())
        });
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::PinHashParams;
use crate::errors::{Result, SecretShareError};

/// Which repository backend to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Process-local concurrent map; contents vanish on exit.
    Memory,
    /// Partitioned table persisted under `data_dir`.
    Table,
}

/// Project-level configuration, loaded from `.secretshare.toml`.
///
/// Every field has a sensible default so SecretShare works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Storage backend (default: table).
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// Directory (relative to project root) for the table backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Table holding message entities.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Argon2 memory cost in KiB for PIN hashes (default: 12 MiB).
    #[serde(default = "default_pin_hash_memory_kib")]
    pub pin_hash_memory_kib: u32,

    /// Argon2 iteration count for PIN hashes (default: 3).
    #[serde(default = "default_pin_hash_iterations")]
    pub pin_hash_iterations: u32,

    /// Argon2 parallelism for PIN hashes (default: 1).
    #[serde(default = "default_pin_hash_parallelism")]
    pub pin_hash_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_backend() -> Backend {
    Backend::Table
}

fn default_data_dir() -> String {
    ".secretshare".to_string()
}

fn default_table_name() -> String {
    "messages".to_string()
}

fn default_pin_hash_memory_kib() -> u32 {
    12_288 // 12 MiB
}

fn default_pin_hash_iterations() -> u32 {
    3
}

fn default_pin_hash_parallelism() -> u32 {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
            table_name: default_table_name(),
            pin_hash_memory_kib: default_pin_hash_memory_kib(),
            pin_hash_iterations: default_pin_hash_iterations(),
            pin_hash_parallelism: default_pin_hash_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".secretshare.toml";

    /// Load settings from `<project_dir>/.secretshare.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            SecretShareError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.pin_hash_params().validate()?;

        Ok(settings)
    }

    /// Directory the table backend writes into.
    ///
    /// Example: `project_dir/.secretshare`
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    /// Convert the PIN hashing settings into crypto-layer params.
    pub fn pin_hash_params(&self) -> PinHashParams {
        PinHashParams {
            memory_kib: self.pin_hash_memory_kib,
            iterations: self.pin_hash_iterations,
            parallelism: self.pin_hash_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.backend, Backend::Table);
        assert_eq!(s.data_dir, ".secretshare");
        assert_eq!(s.table_name, "messages");
        assert_eq!(s.pin_hash_params(), PinHashParams::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.backend, Backend::Table);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
backend = "memory"
data_dir = "store"
table_name = "secrets"
pin_hash_memory_kib = 19456
pin_hash_iterations = 2
pin_hash_parallelism = 1
"#;
        fs::write(tmp.path().join(Settings::FILE_NAME), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.backend, Backend::Memory);
        assert_eq!(settings.data_dir, "store");
        assert_eq!(settings.table_name, "secrets");
        assert_eq!(settings.pin_hash_memory_kib, 19_456);
        assert_eq!(settings.pin_hash_iterations, 2);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "backend = \"memory\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.backend, Backend::Memory);
        assert_eq!(settings.data_dir, ".secretshare");
        assert_eq!(settings.pin_hash_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "not valid {{toml").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_errors_on_unknown_backend() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "backend = \"cloud\"\n").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_rejects_weak_pin_hashing() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(Settings::FILE_NAME),
            "pin_hash_memory_kib = 16\n",
        )
        .unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn data_path_respects_custom_dir() {
        let s = Settings {
            data_dir: "store".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            s.data_path(Path::new("/home/user/project")),
            PathBuf::from("/home/user/project/store")
        );
    }
}

//! Operator salt: the fixed per-deployment HKDF salt.
//!
//! Read from `DB_SALT_KEY`.  When `SERVER_ENV=test` a fixed test salt is
//! used instead so local runs and test suites need no secrets.

use std::fmt;

use zeroize::Zeroizing;

use crate::crypto::SALT_LEN;
use crate::errors::{Result, SecretShareError};

/// Environment variable selecting the deployment mode.
pub const ENV_SERVER_ENV: &str = "SERVER_ENV";

/// Environment variable holding the operator salt.
pub const ENV_SALT_KEY: &str = "DB_SALT_KEY";

/// `SERVER_ENV` value that switches to the test salt.
const TEST_ENV: &str = "test";

const TEST_SALT: &str = "12345678123456781234567812345678";

/// The operator salt, validated to be exactly [`SALT_LEN`] bytes.
///
/// Read-only after construction; wiped from memory on drop.
#[derive(Clone)]
pub struct OperatorSalt(Zeroizing<String>);

impl OperatorSalt {
    /// Wrap a salt value, checking its length.
    pub fn new(value: String) -> Result<Self> {
        if value.len() != SALT_LEN {
            return Err(SecretShareError::ConfigError(format!(
                "{ENV_SALT_KEY} must be {SALT_LEN} characters in length"
            )));
        }
        Ok(Self(Zeroizing::new(value)))
    }

    /// The fixed salt used when `SERVER_ENV=test`.
    pub fn for_tests() -> Self {
        Self(Zeroizing::new(TEST_SALT.to_string()))
    }

    /// Resolve the salt from explicit environment values.
    pub fn resolve(server_env: Option<&str>, salt_value: Option<String>) -> Result<Self> {
        if server_env == Some(TEST_ENV) {
            return Ok(Self::for_tests());
        }
        match salt_value {
            Some(value) => Self::new(value),
            None => Err(SecretShareError::ConfigError(format!(
                "{ENV_SALT_KEY} is not set (or set {ENV_SERVER_ENV}={TEST_ENV} for local use)"
            ))),
        }
    }

    /// Resolve the salt from the process environment.
    pub fn from_env() -> Result<Self> {
        let server_env = std::env::var(ENV_SERVER_ENV).ok();
        Self::resolve(server_env.as_deref(), std::env::var(ENV_SALT_KEY).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OperatorSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperatorSalt(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_uses_fixed_salt() {
        let salt = OperatorSalt::resolve(Some("test"), None).unwrap();
        assert_eq!(salt.as_str(), TEST_SALT);
    }

    #[test]
    fn production_requires_salt() {
        assert!(OperatorSalt::resolve(None, None).is_err());
        assert!(OperatorSalt::resolve(Some("production"), None).is_err());
    }

    #[test]
    fn salt_length_is_enforced() {
        assert!(OperatorSalt::resolve(None, Some("short".into())).is_err());
        let ok = OperatorSalt::resolve(None, Some("a".repeat(32))).unwrap();
        assert_eq!(ok.as_str().len(), 32);
    }

    #[test]
    fn debug_is_redacted() {
        let salt = OperatorSalt::for_tests();
        assert!(!format!("{salt:?}").contains(TEST_SALT));
    }
}

//! PIN generation and one-way PIN hashing using Argon2id.
//!
//! PINs are deliberately short so a person can type them; the memory-hard
//! hash and the attempt limit on each message are what keep guessing
//! expensive.  Hashes are stored as self-describing PHC strings
//! (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so verification needs
//! nothing but the string itself.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, Version, ARGON2ID_IDENT};
use rand::Rng;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{Result, SecretShareError};

/// Length of the stored hash output in bytes.
const HASH_LEN: usize = 32;

/// Minimum memory cost in KiB accepted for PIN hashing.
const MIN_MEMORY_KIB: u32 = 1_024;

/// Never a valid candidate (not digits), so the dummy hash cannot match.
const DUMMY_PIN: &str = "unknown";

/// Configurable Argon2id parameters for PIN hashing.
///
/// Defaults follow the OWASP baseline: 12 MiB, 3 iterations, 1 lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinHashParams {
    /// Memory cost in KiB (default: 12 288 = 12 MiB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 1).
    pub parallelism: u32,
}

impl Default for PinHashParams {
    fn default() -> Self {
        Self {
            memory_kib: 12_288,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl PinHashParams {
    /// Reject settings too weak to be worth hashing with.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(SecretShareError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(SecretShareError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(SecretShareError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(HASH_LEN),
        )
        .map_err(|e| SecretShareError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Generate a random PIN: a `u16` in base 10, zero-padded to 4 digits.
pub fn generate_pin() -> String {
    let n: u16 = rand::rng().random();
    format!("{n:04}")
}

/// Returns `true` if `candidate` has the shape of a PIN (4 or 5 ASCII digits).
pub fn is_pin_shaped(candidate: &str) -> bool {
    (4..=5).contains(&candidate.len()) && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Hash `pin` with a fresh 16-byte random salt, returning a PHC string.
pub fn hash_pin(pin: &str, params: &PinHashParams) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .argon2()?
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| SecretShareError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify `candidate` against a PHC string produced by `hash_pin`.
///
/// The cost parameters and salt come from the encoded string.  The final
/// comparison is constant-time.  A string that cannot be decoded fails
/// with `CorruptHashFormat`; a mismatch fails with `InvalidCredential`.
pub fn verify_pin(encoded: &str, candidate: &str) -> Result<()> {
    let parsed = PasswordHash::new(encoded)
        .map_err(|e| SecretShareError::CorruptHashFormat(e.to_string()))?;

    if parsed.algorithm != ARGON2ID_IDENT {
        return Err(SecretShareError::CorruptHashFormat(format!(
            "unsupported algorithm {}",
            parsed.algorithm
        )));
    }

    let version = match parsed.version {
        Some(v) => Version::try_from(v)
            .map_err(|e| SecretShareError::CorruptHashFormat(format!("version: {e}")))?,
        None => Version::V0x13,
    };
    if version != Version::V0x13 {
        return Err(SecretShareError::CorruptHashFormat(
            "unsupported Argon2 version".into(),
        ));
    }

    let params = Params::try_from(&parsed)
        .map_err(|e| SecretShareError::CorruptHashFormat(format!("params: {e}")))?;

    let expected = parsed
        .hash
        .ok_or_else(|| SecretShareError::CorruptHashFormat("missing hash".into()))?;
    let salt = parsed
        .salt
        .ok_or_else(|| SecretShareError::CorruptHashFormat("missing salt".into()))?;

    let mut salt_buf = [0u8; 64];
    let salt_bytes = salt
        .decode_b64(&mut salt_buf)
        .map_err(|e| SecretShareError::CorruptHashFormat(format!("salt: {e}")))?;

    let mut recomputed = vec![0u8; expected.len()];
    Argon2::new(Algorithm::Argon2id, version, params)
        .hash_password_into(candidate.as_bytes(), salt_bytes, &mut recomputed)
        .map_err(|e| SecretShareError::CorruptHashFormat(format!("recompute: {e}")))?;

    let matches: bool = recomputed.ct_eq(expected.as_bytes()).into();
    recomputed.zeroize();

    if matches {
        Ok(())
    } else {
        Err(SecretShareError::InvalidCredential)
    }
}

/// PIN hashing bound to one set of parameters.
///
/// Also carries a dummy hash computed with the same parameters, so a
/// lookup that finds nothing can still pay for one full verification.
#[derive(Debug, Clone)]
pub struct PinHasher {
    params: PinHashParams,
    dummy_hash: String,
}

impl PinHasher {
    /// Validate `params` and precompute the dummy hash.
    pub fn new(params: PinHashParams) -> Result<Self> {
        params.validate()?;
        let dummy_hash = hash_pin(DUMMY_PIN, &params)?;
        Ok(Self { params, dummy_hash })
    }

    /// Hash a freshly generated PIN for storage.
    pub fn hash(&self, pin: &str) -> Result<String> {
        hash_pin(pin, &self.params)
    }

    /// Verify a candidate against a stored hash.
    pub fn verify(&self, encoded: &str, candidate: &str) -> Result<()> {
        verify_pin(encoded, candidate)
    }

    /// Spend the same work as `verify` against a hash that never matches.
    pub fn verify_dummy(&self, candidate: &str) {
        let _ = verify_pin(&self.dummy_hash, candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PinHashParams {
        PinHashParams {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn generated_pins_are_four_or_five_digits() {
        for _ in 0..200 {
            let pin = generate_pin();
            assert!(is_pin_shaped(&pin), "unexpected pin {pin}");
        }
    }

    #[test]
    fn pin_shape_rules() {
        assert!(is_pin_shaped("0000"));
        assert!(is_pin_shaped("65535"));
        assert!(!is_pin_shaped("123"));
        assert!(!is_pin_shaped("123456"));
        assert!(!is_pin_shaped("12a4"));
        assert!(!is_pin_shaped(""));
    }

    #[test]
    fn hash_is_self_describing() {
        let hashed = hash_pin("foobar", &PinHashParams::default()).unwrap();
        assert!(hashed.starts_with("$argon2id$v=19$m=12288,t=3,p=1$"));
        assert_eq!(hashed.split('$').count(), 6);
    }

    #[test]
    fn hash_then_verify() {
        let hashed = hash_pin("4321", &cheap()).unwrap();
        assert!(verify_pin(&hashed, "4321").is_ok());
        assert!(matches!(
            verify_pin(&hashed, "4322"),
            Err(SecretShareError::InvalidCredential)
        ));
    }

    #[test]
    fn same_pin_hashes_differently() {
        let h1 = hash_pin("4321", &cheap()).unwrap();
        let h2 = hash_pin("4321", &cheap()).unwrap();
        assert_ne!(h1, h2, "salts must be random");
    }

    #[test]
    fn malformed_hashes_are_corrupt_not_wrong() {
        for bad in [
            "",
            "plain-text",
            "$argon2id$v=19$m=1024,t=1,p=1$onlyfive",
            "$argon2id$v=19$m=abc,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
        ] {
            assert!(
                matches!(
                    verify_pin(bad, "1234"),
                    Err(SecretShareError::CorruptHashFormat(_))
                ),
                "expected corrupt format for {bad:?}"
            );
        }
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let hashed = hash_pin("1234", &cheap()).unwrap();
        let swapped = hashed.replacen("argon2id", "argon2i", 1);
        assert!(matches!(
            verify_pin(&swapped, "1234"),
            Err(SecretShareError::CorruptHashFormat(_))
        ));
    }

    #[test]
    fn weak_params_are_rejected() {
        let weak = PinHashParams {
            memory_kib: 64,
            ..PinHashParams::default()
        };
        assert!(PinHasher::new(weak).is_err());
    }

    #[test]
    fn dummy_hash_never_matches_a_pin() {
        let hasher = PinHasher::new(cheap()).unwrap();
        assert!(hasher.verify(&hasher.dummy_hash, "0000").is_err());
        hasher.verify_dummy("0000");
    }
}

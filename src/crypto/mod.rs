//! Cryptographic primitives for SecretShare.
//!
//! This module provides:
//! - HKDF-SHA256 message key derivation and content ids (`keys`)
//! - AES-128-GCM encryption and decryption into hex tokens (`encryption`)
//! - PIN generation and Argon2id PIN hashing (`pin`)

pub mod encryption;
pub mod keys;
pub mod pin;

pub use encryption::{decrypt, encrypt};
pub use keys::{content_id, derive_key, MessageKey, KEY_LEN, SALT_LEN};
pub use pin::{generate_pin, hash_pin, is_pin_shaped, verify_pin, PinHashParams, PinHasher};

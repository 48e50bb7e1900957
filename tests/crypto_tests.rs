//! Integration tests for the SecretShare crypto module.

use proptest::prelude::*;
use secretshare::crypto::{
    content_id, decrypt, derive_key, encrypt, generate_pin, hash_pin, is_pin_shaped, verify_pin,
    PinHashParams, PinHasher,
};
use secretshare::errors::SecretShareError;

const SALT: &str = "12345678123456781234567812345678";
const OTHER_SALT: &str = "abcdefghabcdefghabcdefghabcdefgh";

/// Cheap Argon2 settings so the suite stays fast.
fn cheap() -> PinHashParams {
    PinHashParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn same_pin_and_salt_give_same_key() {
    let a = derive_key("1234", SALT).expect("derive a");
    let b = derive_key("1234", SALT).expect("derive b");
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn salt_changes_the_key() {
    let a = derive_key("1234", SALT).expect("derive a");
    let b = derive_key("1234", OTHER_SALT).expect("derive b");
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn salt_must_be_exactly_32_bytes() {
    for salt in ["", "short", "123456781234567812345678123456789"] {
        match derive_key("1234", salt) {
            Err(SecretShareError::InvalidSaltLength { expected, got }) => {
                assert_eq!(expected, 32);
                assert_eq!(got, salt.len());
            }
            other => panic!("expected InvalidSaltLength for {salt:?}, got {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = derive_key("4821", SALT).unwrap();
    let token = encrypt(&key, "the launch code is 0000").expect("encrypt");

    // 12-byte nonce + ciphertext + 16-byte tag, hex encoded.
    assert_eq!(token.len(), 2 * (12 + "the launch code is 0000".len() + 16));

    let plain = decrypt(&key, &token).expect("decrypt");
    assert_eq!(plain, "the launch code is 0000");
}

#[test]
fn encryption_is_randomized() {
    let key = derive_key("4821", SALT).unwrap();
    let t1 = encrypt(&key, "same text").unwrap();
    let t2 = encrypt(&key, "same text").unwrap();
    assert_ne!(t1, t2);
    assert_ne!(content_id(&t1), content_id(&t2));
}

#[test]
fn wrong_pin_cannot_decrypt() {
    let right = derive_key("4821", SALT).unwrap();
    let wrong = derive_key("4822", SALT).unwrap();
    let token = encrypt(&right, "secret").unwrap();

    assert!(matches!(
        decrypt(&wrong, &token),
        Err(SecretShareError::DecryptionFailed)
    ));
}

#[test]
fn tampered_token_is_rejected() {
    let key = derive_key("4821", SALT).unwrap();
    let mut token = encrypt(&key, "secret").unwrap().into_bytes();

    // Flip a hex digit inside the ciphertext region.
    let i = token.len() - 1;
    token[i] = if token[i] == b'0' { b'1' } else { b'0' };
    let token = String::from_utf8(token).unwrap();

    assert!(matches!(
        decrypt(&key, &token),
        Err(SecretShareError::DecryptionFailed)
    ));
}

#[test]
fn content_id_is_64_hex_chars() {
    let id = content_id("00ff");
    assert_eq!(id.len(), 64);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

// ---------------------------------------------------------------------------
// PINs
// ---------------------------------------------------------------------------

#[test]
fn generated_pins_are_accepted_as_candidates() {
    for _ in 0..200 {
        let pin = generate_pin();
        assert!(is_pin_shaped(&pin), "bad pin {pin:?}");
    }
}

#[test]
fn pin_hash_verifies_only_the_right_pin() {
    let hash = hash_pin("0042", &cheap()).expect("hash");
    assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

    assert!(verify_pin(&hash, "0042").is_ok());
    assert!(matches!(
        verify_pin(&hash, "0043"),
        Err(SecretShareError::InvalidCredential)
    ));
}

#[test]
fn verification_uses_parameters_embedded_in_the_hash() {
    // A hasher configured differently still verifies an older hash.
    let hash = hash_pin("1111", &cheap()).unwrap();
    let hasher = PinHasher::new(PinHashParams {
        memory_kib: 2048,
        iterations: 2,
        parallelism: 1,
    })
    .unwrap();
    assert!(hasher.verify(&hash, "1111").is_ok());
}

#[test]
fn garbage_hash_is_corrupt() {
    assert!(matches!(
        verify_pin("definitely not a hash", "1234"),
        Err(SecretShareError::CorruptHashFormat(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_text_roundtrips(text in ".{1,256}", pin in 0u16..=u16::MAX) {
        let pin = format!("{pin:04}");
        let key = derive_key(&pin, SALT).unwrap();
        let token = encrypt(&key, &text).unwrap();
        prop_assert_eq!(decrypt(&key, &token).unwrap(), text);
    }
}

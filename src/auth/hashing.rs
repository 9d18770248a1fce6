//! Password hashing and verification.
//!
//! Credentials are derived with PBKDF2-HMAC-SHA256 over a per-user random
//! salt. The salt is generated once at registration and reused verbatim for
//! every later verification and password change, so the same `(password,
//! salt)` pair always derives the same hash. Hash and salt are stored
//! base64-encoded.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::errors::{Error, Result};

const SALT_SIZE: usize = 16;
const HASH_SIZE: usize = 32;
const ITERATIONS: u32 = 100_000;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// A derived credential: base64 hash plus the base64 salt it was derived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHash {
    pub hash: String,
    pub salt: String,
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(ITERATIONS).expect("iteration count is non-zero")
}

/// Derive a credential hash for `password`.
///
/// When `existing_salt` is `None` a fresh 16-byte salt is drawn from the
/// system CSPRNG; otherwise the given salt is decoded and reused, and the
/// returned salt string is byte-identical to the input.
pub fn hash_password(password: &str, existing_salt: Option<&str>) -> Result<CredentialHash> {
    if password.is_empty() {
        return Err(Error::validation_field("Password must not be empty", "password"));
    }

    let (salt_bytes, salt) = match existing_salt {
        Some(salt) if !salt.trim().is_empty() => {
            let bytes = BASE64
                .decode(salt)
                .map_err(|_| Error::internal("Stored password salt is not valid base64"))?;
            (bytes, salt.to_string())
        }
        _ => {
            let mut bytes = vec![0u8; SALT_SIZE];
            SystemRandom::new()
                .fill(&mut bytes)
                .map_err(|_| Error::internal("Failed to generate a random salt"))?;
            let encoded = BASE64.encode(&bytes);
            (bytes, encoded)
        }
    };

    let mut derived = [0u8; HASH_SIZE];
    pbkdf2::derive(ALGORITHM, iterations(), &salt_bytes, password.as_bytes(), &mut derived);

    Ok(CredentialHash { hash: BASE64.encode(derived), salt })
}

/// Verify `password` against a stored `(salt, hash)` pair.
///
/// Re-derives with the stored salt and compares in constant time; the stored
/// secret is never decrypted because it cannot be.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> Result<bool> {
    if password.is_empty() {
        return Err(Error::validation_field("Password must not be empty", "password"));
    }

    let salt_bytes = BASE64
        .decode(salt)
        .map_err(|_| Error::internal("Stored password salt is not valid base64"))?;
    let expected_bytes = BASE64
        .decode(expected_hash)
        .map_err(|_| Error::internal("Stored password hash is not valid base64"))?;

    Ok(pbkdf2::verify(
        ALGORITHM,
        iterations(),
        &salt_bytes,
        password.as_bytes(),
        &expected_bytes,
    )
    .is_ok())
}

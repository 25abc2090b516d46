// Password hashing behind the `PasswordHasher` seam.
//
// The shipped implementation is scrypt (N=16384, r=16, p=1, dkLen=64) with a
// random 16-byte salt, stored as "hex(salt):hex(key)". Comparison is
// constant-time.

use rand::RngCore;
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;

use passage_core::error::CryptoError;

/// One-way password hashing and verification.
///
/// A trait so stores migrated from another KDF can plug in their own scheme;
/// the core only ever calls `hash` and `verify`.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CryptoError>;

    fn verify(&self, hash: &str, password: &str) -> Result<bool, CryptoError>;
}

/// The default scrypt-based [`PasswordHasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScryptHasher;

impl ScryptHasher {
    pub fn new() -> Self {
        Self
    }

    // N=16384 → log2(N)=14, r=16, p=1, dkLen=64
    fn params() -> Result<Params, CryptoError> {
        Params::new(14, 16, 1, 64).map_err(|e| CryptoError::KeyDerivation(e.to_string()))
    }

    fn derive_key(password: &str, salt_hex: &str) -> Result<Vec<u8>, CryptoError> {
        let mut output = vec![0u8; 64];
        scrypt(
            password.as_bytes(),
            salt_hex.as_bytes(),
            &Self::params()?,
            &mut output,
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(output)
    }
}

impl PasswordHasher for ScryptHasher {
    fn hash(&self, password: &str) -> Result<String, CryptoError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt_hex = hex::encode(salt);

        let key = Self::derive_key(password, &salt_hex)?;
        Ok(format!("{}:{}", salt_hex, hex::encode(key)))
    }

    fn verify(&self, hash: &str, password: &str) -> Result<bool, CryptoError> {
        let (salt_hex, key_hex) = hash.split_once(':').ok_or(CryptoError::MalformedHash)?;
        let expected = hex::decode(key_hex).map_err(|_| CryptoError::MalformedHash)?;
        let derived = Self::derive_key(password, salt_hex)?;
        Ok(bool::from(derived.ct_eq(&expected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format_and_roundtrip() {
        let hasher = ScryptHasher::new();
        let hash = hasher.hash("my-secret-password").unwrap();

        let (salt, key) = hash.split_once(':').unwrap();
        // 16-byte salt, 64-byte key, both hex encoded.
        assert_eq!(salt.len(), 32);
        assert_eq!(key.len(), 128);

        assert!(hasher.verify(&hash, "my-secret-password").unwrap());
        assert!(!hasher.verify(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let hasher = ScryptHasher::new();
        assert!(matches!(
            hasher.verify("no-colon-here", "password"),
            Err(CryptoError::MalformedHash)
        ));
        assert!(matches!(
            hasher.verify("not-hex:zzzz", "password"),
            Err(CryptoError::MalformedHash)
        ));
    }
}

//! Password hashing for sheet and workbook protection.
//!
//! Two schemes exist side by side in the format. The legacy 16-bit
//! rotate/XOR hash goes into the `password` attribute of
//! `sheetProtection`/`workbookProtection`; it is not a secure hash, only a
//! deterrent, but Excel still reads and writes it. The salted, iterated
//! SHA-512 scheme is what current Excel versions emit for the
//! `algorithmName`/`hashValue`/`saltValue`/`spinCount` attribute set.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use rand::TryRng;
use rand::rngs::SysRng;
use sha2::{Digest, Sha512};

use crate::common::secure::{SecureBuffer, constant_time_eq};
use crate::ooxml::error::{OoxmlError, Result};

/// Spin count Excel uses for the SHA-512 scheme.
pub const DEFAULT_SPIN_COUNT: u32 = 100_000;

/// Legacy 16-bit password hash, rendered as four uppercase hex digits.
pub fn legacy_password_hash(password: &str) -> String {
    let mut hash: u16 = 0;
    for ch in password.chars().rev() {
        let char_code = ch as u16;
        hash = ((hash >> 14) & 0x01) | ((hash << 1) & 0x7FFF);
        hash ^= char_code;
    }
    hash ^= password.len() as u16;
    hash ^= 0xCE4B;
    format!("{hash:04X}")
}

/// A salted, iterated SHA-512 password hash.
#[derive(Debug, Clone)]
pub struct Sha512Hash {
    /// Base64 hash value
    pub hash: String,
    /// Base64 salt
    pub salt: String,
    pub spin_count: u32,
}

impl Sha512Hash {
    /// Hash a password with a fresh random 16-byte salt.
    pub fn new(password: &str) -> Result<Self> {
        let mut salt = [0u8; 16];
        let mut rng = SysRng;
        rng.try_fill_bytes(&mut salt)
            .map_err(|e| OoxmlError::Other(format!("failed to generate password salt: {e}")))?;
        let digest = hash_with_salt(password, &salt, DEFAULT_SPIN_COUNT);
        Ok(Self {
            hash: BASE64_ENGINE.encode(digest.as_bytes()),
            salt: BASE64_ENGINE.encode(salt),
            spin_count: DEFAULT_SPIN_COUNT,
        })
    }

    /// Check a candidate password against this hash in constant time.
    pub fn verify(&self, password: &str) -> Result<bool> {
        let salt = BASE64_ENGINE
            .decode(&self.salt)
            .map_err(|e| OoxmlError::Other(format!("malformed password salt: {e}")))?;
        let expected = BASE64_ENGINE
            .decode(&self.hash)
            .map_err(|e| OoxmlError::Other(format!("malformed password hash: {e}")))?;
        let expected = SecureBuffer::new(expected);
        let candidate = hash_with_salt(password, &salt, self.spin_count);
        Ok(constant_time_eq(expected.as_bytes(), candidate.as_bytes()))
    }
}

/// `H0 = H(salt || utf16le(password))`, then
/// `Hn = H(Hn-1 || n_le_u32)` for `spin_count` cycles. The intermediate
/// buffer is zeroed when dropped.
fn hash_with_salt(password: &str, salt: &[u8], spin_count: u32) -> SecureBuffer {
    let mut pw_bytes = Vec::with_capacity(password.len() * 2);
    for ch in password.encode_utf16() {
        pw_bytes.extend_from_slice(&ch.to_le_bytes());
    }
    let pw_bytes = SecureBuffer::new(pw_bytes);

    let mut hasher = Sha512::new();
    hasher.update(salt);
    hasher.update(pw_bytes.as_bytes());
    let mut hash = hasher.finalize().to_vec();

    for i in 0..spin_count {
        let mut hasher = Sha512::new();
        hasher.update(&hash);
        hasher.update(i.to_le_bytes());
        let next = hasher.finalize();
        hash.copy_from_slice(&next);
    }
    SecureBuffer::new(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_hash_format() {
        let hash = legacy_password_hash("secret");
        assert_eq!(hash.len(), 4);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // deterministic
        assert_eq!(hash, legacy_password_hash("secret"));
        assert_ne!(hash, legacy_password_hash("Secret"));
    }

    #[test]
    fn test_legacy_hash_empty_password() {
        assert_eq!(legacy_password_hash(""), "CE4B");
    }

    #[test]
    fn test_sha512_verify() {
        let hashed = Sha512Hash::new("hunter2").unwrap();
        assert!(hashed.verify("hunter2").unwrap());
        assert!(!hashed.verify("hunter3").unwrap());
    }

    #[test]
    fn test_sha512_salts_differ() {
        let a = Sha512Hash::new("pw").unwrap();
        let b = Sha512Hash::new("pw").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }
}

//! Secure memory zeroization utilities
//!
//! Key material recovered from a keystore only lives in these wrappers. Uses
//! the `zeroize` crate so the compiler can't elide the wipe, and `secrecy` for
//! the keystore password so every read of it is an explicit `expose_secret()`.

use secrecy::SecretString;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Keystore password, sanitized and held for the length of one conversion
pub type Password = SecretString;

pub fn new_password(s: String) -> Password {
    SecretString::new(s)
}

/// A wrapper for sensitive byte arrays that automatically zeros memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureBytes {
    inner: Vec<u8>,
}

impl SecureBytes {
    pub fn new(data: Vec<u8>) -> Self {
        Self { inner: data }
    }

    pub fn zeros(size: usize) -> Self {
        Self {
            inner: vec![0u8; size],
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    pub fn expose_mut(&mut self) -> &mut [u8] {
        &mut self.inner
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBytes([REDACTED; {}])", self.inner.len())
    }
}

/// UTF-16BE encoding of a password, the form both keystore digests consume
pub fn password_utf16_be(password: &str) -> SecureBytes {
    let mut out = Vec::with_capacity(password.len() * 2);
    for unit in password.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    SecureBytes::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secure_bytes_zeroize() {
        let mut secure = SecureBytes::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(secure.expose(), &[1, 2, 3, 4, 5]);

        secure.zeroize();
        // Vec::zeroize() clears the vector (sets len to 0) after zeroing memory
        assert!(secure.is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secure = SecureBytes::from(&b"private"[..]);
        assert_eq!(format!("{:?}", secure), "SecureBytes([REDACTED; 7])");

        let password = new_password("changeit".to_string());
        assert!(!format!("{:?}", password).contains("changeit"));
        assert_eq!(password.expose_secret(), "changeit");
    }

    #[test]
    fn test_password_utf16_be() {
        assert_eq!(password_utf16_be("ab").expose(), &[0x00, 0x61, 0x00, 0x62]);
        // U+00E9 stays a single unit, U+1F600 becomes a surrogate pair
        assert_eq!(password_utf16_be("é").expose(), &[0x00, 0xE9]);
        assert_eq!(
            password_utf16_be("\u{1F600}").expose(),
            &[0xD8, 0x3D, 0xDE, 0x00]
        );
    }
}

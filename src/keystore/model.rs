//! In-memory representation of a parsed keystore

use crate::security::SecureBytes;
use chrono::{DateTime, Utc};
use der::asn1::ObjectIdentifier;

/// Certificate type recorded by version 1 keystores, which store none
pub const DEFAULT_CERT_TYPE: &str = "X.509";

/// An encoded certificate. The bytes are carried as-is and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub cert_type: String,
    pub der: Vec<u8>,
}

/// A private key entry whose key is still protected by the keystore password
#[derive(Debug, Clone)]
pub struct PrivateKeyEntry {
    pub alias: String,
    pub created_at: DateTime<Utc>,
    /// DER `EncryptedPrivateKeyInfo`
    pub protected_key: Vec<u8>,
    /// Leaf first, each following certificate signs the previous one
    pub cert_chain: Vec<Certificate>,
}

#[derive(Debug, Clone)]
pub struct TrustedCertEntry {
    pub alias: String,
    pub created_at: DateTime<Utc>,
    pub certificate: Certificate,
}

#[derive(Debug, Clone)]
pub enum Entry {
    PrivateKey(PrivateKeyEntry),
    TrustedCert(TrustedCertEntry),
}

impl Entry {
    pub fn alias(&self) -> &str {
        match self {
            Entry::PrivateKey(e) => &e.alias,
            Entry::TrustedCert(e) => &e.alias,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Entry::PrivateKey(e) => e.created_at,
            Entry::TrustedCert(e) => e.created_at,
        }
    }
}

/// A parsed, integrity-checked keystore. Entries keep their on-disk order.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub(crate) entries: Vec<Entry>,
}

impl Container {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::alias).collect()
    }

    pub fn private_keys(&self) -> impl Iterator<Item = &PrivateKeyEntry> {
        self.entries.iter().filter_map(|e| match e {
            Entry::PrivateKey(pk) => Some(pk),
            Entry::TrustedCert(_) => None,
        })
    }

    pub fn trusted_certs(&self) -> impl Iterator<Item = &TrustedCertEntry> {
        self.entries.iter().filter_map(|e| match e {
            Entry::TrustedCert(tc) => Some(tc),
            Entry::PrivateKey(_) => None,
        })
    }
}

/// Algorithm of a recovered private key, which decides its PEM encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// `rsaEncryption`; the key bytes are a PKCS#1 `RSAPrivateKey`
    Rsa,
    /// Any other algorithm; the key bytes are the full PKCS#8 `PrivateKeyInfo`
    Other(ObjectIdentifier),
}

impl KeyAlgorithm {
    pub fn pem_label(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA PRIVATE KEY",
            KeyAlgorithm::Other(_) => "PRIVATE KEY",
        }
    }
}

/// Plaintext private key recovered from a protected entry
#[derive(Debug, Clone)]
pub struct DecryptedKey {
    pub algorithm: KeyAlgorithm,
    pub key: SecureBytes,
}

#[derive(Debug)]
pub struct DecryptedPrivateKeyEntry {
    pub alias: String,
    pub created_at: DateTime<Utc>,
    pub key: DecryptedKey,
    pub cert_chain: Vec<Certificate>,
}

#[derive(Debug)]
pub enum DecryptedEntry {
    PrivateKey(DecryptedPrivateKeyEntry),
    TrustedCert(TrustedCertEntry),
}

/// A container whose private keys have all been decrypted
#[derive(Debug, Default)]
pub struct DecryptedContainer {
    pub(crate) entries: Vec<DecryptedEntry>,
}

impl DecryptedContainer {
    pub fn entries(&self) -> &[DecryptedEntry] {
        &self.entries
    }

    pub fn private_keys(&self) -> impl Iterator<Item = &DecryptedPrivateKeyEntry> {
        self.entries.iter().filter_map(|e| match e {
            DecryptedEntry::PrivateKey(pk) => Some(pk),
            DecryptedEntry::TrustedCert(_) => None,
        })
    }

    pub fn trusted_certs(&self) -> impl Iterator<Item = &TrustedCertEntry> {
        self.entries.iter().filter_map(|e| match e {
            DecryptedEntry::TrustedCert(tc) => Some(tc),
            DecryptedEntry::PrivateKey(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(byte: u8) -> Certificate {
        Certificate {
            cert_type: DEFAULT_CERT_TYPE.to_string(),
            der: vec![byte; 4],
        }
    }

    #[test]
    fn test_iterators_keep_order_within_kind() {
        let now = Utc::now();
        let container = Container {
            entries: vec![
                Entry::TrustedCert(TrustedCertEntry {
                    alias: "ca".to_string(),
                    created_at: now,
                    certificate: cert(1),
                }),
                Entry::PrivateKey(PrivateKeyEntry {
                    alias: "client".to_string(),
                    created_at: now,
                    protected_key: vec![0; 8],
                    cert_chain: vec![cert(2)],
                }),
                Entry::TrustedCert(TrustedCertEntry {
                    alias: "another-ca".to_string(),
                    created_at: now,
                    certificate: cert(3),
                }),
            ],
        };

        assert_eq!(container.aliases(), vec!["ca", "client", "another-ca"]);
        let trusted: Vec<_> = container.trusted_certs().map(|t| t.alias.as_str()).collect();
        assert_eq!(trusted, vec!["ca", "another-ca"]);
        assert_eq!(container.private_keys().count(), 1);
        assert_eq!(container.entries()[1].created_at(), now);
    }

    #[test]
    fn test_pem_labels() {
        assert_eq!(KeyAlgorithm::Rsa.pem_label(), "RSA PRIVATE KEY");
        let ec = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
        assert_eq!(KeyAlgorithm::Other(ec).pem_label(), "PRIVATE KEY");
    }
}

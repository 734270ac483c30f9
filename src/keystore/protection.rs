//! Private key protection schemes
//!
//! A protected key is a DER `EncryptedPrivateKeyInfo`. The algorithm OID in it
//! selects a [`KeyProtectionAlgorithm`]; the recovered plaintext is a PKCS#8
//! `PrivateKeyInfo`.

use crate::errors::{CredentialError, Result};
use crate::keystore::model::{
    Container, DecryptedContainer, DecryptedEntry, DecryptedKey, DecryptedPrivateKeyEntry, Entry,
    KeyAlgorithm, PrivateKeyEntry,
};
use crate::security::{password_utf16_be, SecureBytes};
use der::asn1::{AnyRef, ObjectIdentifier, OctetStringRef};
use der::{Decode, Sequence};
use pkcs8::spki::AlgorithmIdentifierRef;
use pkcs8::PrivateKeyInfo;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use tracing::debug;

/// Sun's proprietary JKS key protector
pub const SUN_JKS_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.42.2.17.1.1");

/// Sun's JCE key protector (PBEWithMD5AndTripleDES), used by JCEKS stores
pub const SUN_JCE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.42.2.19.1");

pub const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

const SALT_LEN: usize = 20;
const CHECK_LEN: usize = 20;

/// ASN.1 `EncryptedPrivateKeyInfo`
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub(crate) struct EncryptedPrivateKeyInfo<'a> {
    pub encryption_algorithm: AlgorithmIdentifierRef<'a>,
    pub encrypted_data: OctetStringRef<'a>,
}

/// A password-based scheme that turns protected key bytes back into PKCS#8
pub trait KeyProtectionAlgorithm: Send + Sync {
    fn oid(&self) -> ObjectIdentifier;

    fn name(&self) -> &'static str;

    /// Recover the plaintext. `parameters` are the algorithm parameters from
    /// the `EncryptedPrivateKeyInfo`, if any.
    fn recover(
        &self,
        parameters: Option<AnyRef<'_>>,
        encrypted: &[u8],
        password: &str,
    ) -> Result<SecureBytes>;
}

/// Sun's JKS key protector.
///
/// `encrypted = salt[20] || ciphertext || check[20]`. The keystream is the
/// chain `d_i = SHA1(pw || d_{i-1})` starting from `d_0 = salt`, and `check`
/// is `SHA1(pw || plaintext)`, with `pw` the UTF-16BE password.
#[derive(Debug, Default, Clone, Copy)]
pub struct SunJksKeyProtector;

impl SunJksKeyProtector {
    /// XOR `input` with the keystream for `salt`. The operation is its own inverse.
    pub fn apply_keystream(password: &str, salt: &[u8], input: &[u8]) -> SecureBytes {
        let pw = password_utf16_be(password);
        let mut output = SecureBytes::zeros(input.len());
        let mut block = SecureBytes::from(salt);

        for (out_chunk, in_chunk) in output
            .expose_mut()
            .chunks_mut(20)
            .zip(input.chunks(20))
        {
            let mut hasher = Sha1::new();
            hasher.update(pw.expose());
            hasher.update(block.expose());
            block = SecureBytes::new(hasher.finalize().to_vec());

            for ((o, i), k) in out_chunk.iter_mut().zip(in_chunk).zip(block.expose()) {
                *o = i ^ k;
            }
        }

        output
    }

    pub fn check_digest(password: &str, plaintext: &[u8]) -> [u8; CHECK_LEN] {
        let mut hasher = Sha1::new();
        hasher.update(password_utf16_be(password).expose());
        hasher.update(plaintext);
        hasher.finalize().into()
    }
}

impl KeyProtectionAlgorithm for SunJksKeyProtector {
    fn oid(&self) -> ObjectIdentifier {
        SUN_JKS_OID
    }

    fn name(&self) -> &'static str {
        "sun-jks-key-protector"
    }

    fn recover(
        &self,
        _parameters: Option<AnyRef<'_>>,
        encrypted: &[u8],
        password: &str,
    ) -> Result<SecureBytes> {
        if encrypted.len() < SALT_LEN + CHECK_LEN {
            return Err(CredentialError::Format(format!(
                "protected key is {} bytes, shorter than salt and check digest",
                encrypted.len()
            )));
        }

        let (salt, rest) = encrypted.split_at(SALT_LEN);
        let (ciphertext, check) = rest.split_at(rest.len() - CHECK_LEN);

        let plaintext = Self::apply_keystream(password, salt, ciphertext);
        let computed = Self::check_digest(password, plaintext.expose());
        if !bool::from(computed[..].ct_eq(check)) {
            return Err(CredentialError::Integrity(
                "private key check digest mismatch, password was incorrect".to_string(),
            ));
        }

        Ok(plaintext)
    }
}

/// Key protection algorithms known to this build, looked up by OID
pub struct ProtectionRegistry {
    algorithms: Vec<Box<dyn KeyProtectionAlgorithm>>,
}

impl Default for ProtectionRegistry {
    fn default() -> Self {
        Self {
            algorithms: vec![Box::new(SunJksKeyProtector)],
        }
    }
}

impl ProtectionRegistry {
    pub fn empty() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Register an algorithm. A later registration for the same OID wins.
    pub fn register(&mut self, algorithm: Box<dyn KeyProtectionAlgorithm>) {
        self.algorithms.retain(|a| a.oid() != algorithm.oid());
        self.algorithms.push(algorithm);
    }

    pub fn find(&self, oid: &ObjectIdentifier) -> Result<&dyn KeyProtectionAlgorithm> {
        self.algorithms
            .iter()
            .find(|a| a.oid() == *oid)
            .map(|a| a.as_ref())
            .ok_or_else(|| {
                let hint = if *oid == SUN_JCE_OID {
                    " (JCEKS key protector)"
                } else {
                    ""
                };
                CredentialError::UnsupportedAlgorithm(format!(
                    "key protection algorithm {}{}",
                    oid, hint
                ))
            })
    }

    /// Decrypt one private key entry
    pub fn decrypt_private_key(
        &self,
        entry: &PrivateKeyEntry,
        password: &str,
    ) -> Result<DecryptedKey> {
        let info = EncryptedPrivateKeyInfo::from_der(&entry.protected_key)?;
        let algorithm = self.find(&info.encryption_algorithm.oid)?;

        debug!(alias = %entry.alias, algorithm = algorithm.name(), "Decrypting private key");
        let plaintext = algorithm.recover(
            info.encryption_algorithm.parameters,
            info.encrypted_data.as_bytes(),
            password,
        )?;

        classify(plaintext)
    }

    /// Decrypt every private key of `container`, stopping at the first failure
    pub fn decrypt_container(
        &self,
        container: Container,
        password: &str,
    ) -> Result<DecryptedContainer> {
        let mut entries = Vec::with_capacity(container.entries.len());

        for entry in container.entries {
            let decrypted = match entry {
                Entry::PrivateKey(pk) => {
                    let key = self.decrypt_private_key(&pk, password)?;
                    DecryptedEntry::PrivateKey(DecryptedPrivateKeyEntry {
                        alias: pk.alias,
                        created_at: pk.created_at,
                        key,
                        cert_chain: pk.cert_chain,
                    })
                }
                Entry::TrustedCert(tc) => DecryptedEntry::TrustedCert(tc),
            };
            entries.push(decrypted);
        }

        Ok(DecryptedContainer { entries })
    }
}

/// RSA keys are unwrapped to PKCS#1; everything else stays PKCS#8
fn classify(plaintext: SecureBytes) -> Result<DecryptedKey> {
    let info = PrivateKeyInfo::try_from(plaintext.expose()).map_err(|e| {
        CredentialError::Format(format!("decrypted key is not PKCS#8: {}", e))
    })?;

    if info.algorithm.oid == RSA_ENCRYPTION_OID {
        Ok(DecryptedKey {
            algorithm: KeyAlgorithm::Rsa,
            key: SecureBytes::from(info.private_key),
        })
    } else {
        let oid = info.algorithm.oid;
        Ok(DecryptedKey {
            algorithm: KeyAlgorithm::Other(oid),
            key: plaintext,
        })
    }
}

/// Decrypt one private key entry with the built-in algorithms
pub fn decrypt_private_key(entry: &PrivateKeyEntry, password: &str) -> Result<DecryptedKey> {
    ProtectionRegistry::default().decrypt_private_key(entry, password)
}

/// Decrypt every private key of `container` with the built-in algorithms
pub fn decrypt_container(container: Container, password: &str) -> Result<DecryptedContainer> {
    ProtectionRegistry::default().decrypt_container(container, password)
}

//! JKS container parser
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! magic u32 | version u32 | count u32 | entry * count | sha1 digest [20]
//!
//! entry:       tag u32 | alias utf | created_at i64 (ms)
//!   tag 1:     protected_key (u32 len) | chain_len u32 | cert * chain_len
//!   tag 2:     cert
//! cert:        [v2: type utf] | der (u32 len)
//! utf:         u16 len | modified UTF-8 bytes
//! ```
//!
//! Modified UTF-8 is what Java's `DataOutputStream::writeUTF` emits: NUL is
//! `C0 80` and a supplementary character is a surrogate pair with each half
//! encoded as three bytes.
//!
//! The digest is SHA-1 over the UTF-16BE password, the whitener string and
//! every byte before the digest.

use crate::errors::{CredentialError, Result};
use crate::keystore::model::{
    Certificate, Container, Entry, PrivateKeyEntry, TrustedCertEntry, DEFAULT_CERT_TYPE,
};
use crate::security::password_utf16_be;
use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use std::collections::HashSet;
use subtle::ConstantTimeEq;
use tracing::debug;

pub const MAGIC: u32 = 0xFEED_FEED;
pub const JCEKS_MAGIC: u32 = 0xCECE_CECE;
pub const VERSION_1: u32 = 1;
pub const VERSION_2: u32 = 2;
pub const TAG_PRIVATE_KEY: u32 = 1;
pub const TAG_TRUSTED_CERT: u32 = 2;
pub const DIGEST_LEN: usize = 20;
pub const WHITENER: &[u8] = b"Mighty Aphrodite";

/// Bounds-checked cursor; every read past the end is a format error
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CredentialError::Format(format!(
                "truncated {} at offset {}: need {} bytes, {} left",
                what,
                self.pos,
                len,
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, what)?);
        Ok(buf)
    }

    fn read_u16(&mut self, what: &str) -> Result<u16> {
        self.read_array(what).map(u16::from_be_bytes)
    }

    fn read_u32(&mut self, what: &str) -> Result<u32> {
        self.read_array(what).map(u32::from_be_bytes)
    }

    fn read_i64(&mut self, what: &str) -> Result<i64> {
        self.read_array(what).map(i64::from_be_bytes)
    }

    fn read_utf(&mut self, what: &str) -> Result<String> {
        let len = self.read_u16(what)? as usize;
        let bytes = self.take(len, what)?;
        decode_modified_utf8(bytes).ok_or_else(|| {
            CredentialError::Format(format!("{} is not valid modified UTF-8", what))
        })
    }

    fn read_bytes(&mut self, what: &str) -> Result<&'a [u8]> {
        let len = self.read_u32(what)? as usize;
        self.take(len, what)
    }

    fn read_timestamp(&mut self) -> Result<DateTime<Utc>> {
        let millis = self.read_i64("creation time")?;
        DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            CredentialError::Format(format!("creation time out of range: {}", millis))
        })
    }

    fn read_certificate(&mut self, version: u32) -> Result<Certificate> {
        let cert_type = if version == VERSION_2 {
            self.read_utf("certificate type")?
        } else {
            DEFAULT_CERT_TYPE.to_string()
        };
        let der = self.read_bytes("certificate")?.to_vec();
        Ok(Certificate { cert_type, der })
    }

    fn read_entry(&mut self, version: u32) -> Result<Entry> {
        let tag = self.read_u32("entry tag")?;
        match tag {
            TAG_PRIVATE_KEY => {
                let alias = self.read_utf("alias")?;
                let created_at = self.read_timestamp()?;
                let protected_key = self.read_bytes("protected key")?.to_vec();
                let chain_len = self.read_u32("certificate chain length")?;
                let mut cert_chain = Vec::new();
                for _ in 0..chain_len {
                    cert_chain.push(self.read_certificate(version)?);
                }
                Ok(Entry::PrivateKey(PrivateKeyEntry {
                    alias,
                    created_at,
                    protected_key,
                    cert_chain,
                }))
            }
            TAG_TRUSTED_CERT => {
                let alias = self.read_utf("alias")?;
                let created_at = self.read_timestamp()?;
                let certificate = self.read_certificate(version)?;
                Ok(Entry::TrustedCert(TrustedCertEntry {
                    alias,
                    created_at,
                    certificate,
                }))
            }
            other => Err(CredentialError::Format(format!(
                "unknown entry tag {} at offset {}",
                other,
                self.pos - 4
            ))),
        }
    }
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    match byte {
        Some(&b) if b & 0xC0 == 0x80 => Some(u16::from(b & 0x3F)),
        _ => None,
    }
}

/// Decode the modified UTF-8 written by `writeUTF`. Accepts what
/// `DataInputStream::readUTF` accepts; unpaired surrogates are rejected.
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let (unit, width) = match b {
            0x00..=0x7F => (u16::from(b), 1),
            0xC0..=0xDF => {
                let b1 = continuation(bytes.get(i + 1))?;
                ((u16::from(b & 0x1F) << 6) | b1, 2)
            }
            0xE0..=0xEF => {
                let b1 = continuation(bytes.get(i + 1))?;
                let b2 = continuation(bytes.get(i + 2))?;
                ((u16::from(b & 0x0F) << 12) | (b1 << 6) | b2, 3)
            }
            _ => return None,
        };
        units.push(unit);
        i += width;
    }

    String::from_utf16(&units).ok()
}

/// Computes the container digest over `data` for `password`
pub fn container_digest(password: &str, data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha1::new();
    hasher.update(password_utf16_be(password).expose());
    hasher.update(WHITENER);
    hasher.update(data);
    hasher.finalize().into()
}

/// Parse a keystore and verify its integrity digest against `password`.
///
/// Either every entry parses and the digest matches, or an error is returned;
/// there is no partially populated result.
pub fn parse(bytes: &[u8], password: &str) -> Result<Container> {
    let mut reader = Reader::new(bytes);

    let magic = reader.read_u32("magic")?;
    match magic {
        MAGIC => {}
        JCEKS_MAGIC => {
            return Err(CredentialError::Format(
                "JCEKS keystores are not supported".to_string(),
            ))
        }
        other => {
            return Err(CredentialError::Format(format!(
                "bad magic number {:#010x}",
                other
            )))
        }
    }

    let version = reader.read_u32("version")?;
    if version != VERSION_1 && version != VERSION_2 {
        return Err(CredentialError::Format(format!(
            "unsupported keystore version {}",
            version
        )));
    }

    let count = reader.read_u32("entry count")?;
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    for _ in 0..count {
        let entry = reader.read_entry(version)?;
        if !seen.insert(entry.alias().to_string()) {
            return Err(CredentialError::Format(format!(
                "duplicate alias: {}",
                entry.alias()
            )));
        }
        debug!(alias = entry.alias(), created_at = %entry.created_at(), "Read keystore entry");
        entries.push(entry);
    }

    let signed_len = reader.pos;
    let stored = reader.take(DIGEST_LEN, "integrity digest")?;
    if reader.remaining() != 0 {
        return Err(CredentialError::Format(format!(
            "{} trailing bytes after integrity digest",
            reader.remaining()
        )));
    }

    let computed = container_digest(password, &bytes[..signed_len]);
    if !bool::from(computed[..].ct_eq(stored)) {
        return Err(CredentialError::Integrity(
            "keystore was tampered with, or password was incorrect".to_string(),
        ));
    }

    debug!(version, entries = entries.len(), "Parsed keystore");
    Ok(Container { entries })
}

//! Keystore parsing and decryption
//!
//! This module provides:
//! - The in-memory model of a JKS container
//! - A strict parser that verifies the container's integrity digest
//! - Pluggable private key protection schemes

pub mod model;
pub mod parser;
pub mod protection;

pub use model::{
    Certificate, Container, DecryptedContainer, DecryptedEntry, DecryptedKey,
    DecryptedPrivateKeyEntry, Entry, KeyAlgorithm, PrivateKeyEntry, TrustedCertEntry,
};
pub use parser::parse;
pub use protection::{
    decrypt_container, decrypt_private_key, KeyProtectionAlgorithm, ProtectionRegistry,
    SunJksKeyProtector,
};

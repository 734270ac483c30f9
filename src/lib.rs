//! hops-tls - TLS credential materialization for Hopsworks clients
//!
//! The cluster drops a Java keystore pair and its password into the working
//! directory of every client container:
//! - `k_certificate`: identity keystore (private key + certificate chain)
//! - `t_certificate`: trust keystore (CA certificates)
//! - `material_passwd`: the shared keystore password
//!
//! This crate verifies and decrypts those keystores and writes them out as PEM
//! (`k_certificate.pem`, `t_certificate.pem`) for TLS stacks that cannot read
//! JKS.
//!
//! # Security
//!
//! - The container digest is checked before any entry is trusted
//! - Recovered keys live in zeroize-on-drop buffers
//! - Passwords are never logged
//!
//! # Usage
//!
//! ```no_run
//! use hops_tls::TlsMaterial;
//!
//! let material = TlsMaterial::from_current_dir()?;
//! material.write_all_pems()?;
//! # Ok::<(), hops_tls::CredentialError>(())
//! ```

pub mod config;
pub mod convert;
pub mod errors;
pub mod keystore;
pub mod logging;
pub mod material;
pub mod pem;
pub mod security;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, FilesConfig, LoggingConfig};
pub use convert::{convert, convert_and_write, write_identity_and_trust_pems};
pub use errors::{CredentialError, Result};
pub use material::TlsMaterial;
pub use pem::{container_to_pem, to_pem};

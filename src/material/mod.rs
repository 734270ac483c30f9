//! TLS credential material in the working directory
//!
//! [`TlsMaterial`] is what the rest of the client calls before opening any
//! mutually authenticated connection: it locates the keystores, reads their
//! password and materializes them as PEM files.

pub mod locator;
pub mod password;

pub use locator::KeystoreLocator;
pub use password::{read_password, read_password_file, sanitize};

use crate::config::{Config, FilesConfig};
use crate::convert::{self, read_credential_file};
use crate::errors::{CredentialError, Result};
use crate::security::Password;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::info;

/// Credential files of one working directory
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    locator: KeystoreLocator,
}

impl TlsMaterial {
    pub fn new(working_dir: impl Into<PathBuf>, files: FilesConfig) -> Self {
        Self {
            locator: KeystoreLocator::new(working_dir, files),
        }
    }

    /// Use the process working directory and the loaded configuration
    pub fn from_current_dir() -> Result<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| CredentialError::io(PathBuf::from("."), e))?;
        let config = Config::load(None)?;
        Ok(Self::new(working_dir, config.files))
    }

    pub fn locator(&self) -> &KeystoreLocator {
        &self.locator
    }

    /// File name of the identity keystore
    pub fn get_identity_keystore_path(&self) -> &str {
        self.locator.identity_keystore_name()
    }

    /// File name of the trust keystore
    pub fn get_trust_keystore_path(&self) -> &str {
        self.locator.trust_keystore_name()
    }

    /// Sanitized keystore password
    pub fn get_password(&self) -> Result<Password> {
        read_password_file(&self.locator.password_file())
    }

    /// Password of the identity keystore; both keystores share one password
    pub fn get_key_store_pwd(&self) -> Result<Password> {
        self.get_password()
    }

    /// Password of the trust keystore; both keystores share one password
    pub fn get_trust_store_pwd(&self) -> Result<Password> {
        self.get_password()
    }

    /// Raw identity keystore, base64-encoded, for forwarding as an opaque blob
    pub fn get_identity_certificate_base64(&self) -> Result<String> {
        let bytes = read_credential_file(&self.locator.identity_keystore(), "identity keystore")?;
        Ok(STANDARD.encode(bytes))
    }

    pub fn convert_container_to_pem(&self, path: &Path, password: &str) -> Result<String> {
        convert::convert(path, password)
    }

    pub fn write_pem(&self, path: &Path, password: &str, output_path: &Path) -> Result<()> {
        convert::convert_and_write(path, password, output_path)
    }

    /// Materialize both the identity and the trust PEM files
    pub fn write_all_pems(&self) -> Result<()> {
        info!(
            working_dir = %self.locator.working_dir().display(),
            "Materializing TLS credentials"
        );
        convert::write_identity_and_trust_pems(self.locator.working_dir(), self.locator.files())
    }
}

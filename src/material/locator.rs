//! Well-known credential file locations

use crate::config::FilesConfig;
use std::path::{Path, PathBuf};

/// Resolves credential file paths against a working directory. No I/O.
#[derive(Debug, Clone)]
pub struct KeystoreLocator {
    working_dir: PathBuf,
    files: FilesConfig,
}

impl KeystoreLocator {
    pub fn new(working_dir: impl Into<PathBuf>, files: FilesConfig) -> Self {
        Self {
            working_dir: working_dir.into(),
            files,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn files(&self) -> &FilesConfig {
        &self.files
    }

    pub fn identity_keystore_name(&self) -> &str {
        &self.files.identity_keystore
    }

    pub fn trust_keystore_name(&self) -> &str {
        &self.files.trust_keystore
    }

    pub fn identity_keystore(&self) -> PathBuf {
        self.working_dir.join(&self.files.identity_keystore)
    }

    pub fn trust_keystore(&self) -> PathBuf {
        self.working_dir.join(&self.files.trust_keystore)
    }

    pub fn identity_pem(&self) -> PathBuf {
        self.working_dir.join(&self.files.identity_pem)
    }

    pub fn trust_pem(&self) -> PathBuf {
        self.working_dir.join(&self.files.trust_pem)
    }

    pub fn password_file(&self) -> PathBuf {
        self.working_dir.join(&self.files.password_file)
    }
}

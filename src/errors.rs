//! Error types for hops-tls

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for credential materialization
#[derive(Error, Debug)]
pub enum CredentialError {
    /// An expected credential or password file is absent
    #[error("{what} is not present at: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// Malformed or truncated keystore, or a malformed DER structure inside it
    #[error("Invalid keystore format: {0}")]
    Format(String),

    /// Container or entry digest mismatch (wrong password or tampering)
    #[error("Keystore integrity check failed: {0}")]
    Integrity(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CredentialError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CredentialError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<der::Error> for CredentialError {
    fn from(err: der::Error) -> Self {
        CredentialError::Format(format!("DER decode error: {}", err))
    }
}

impl From<config::ConfigError> for CredentialError {
    fn from(err: config::ConfigError) -> Self {
        CredentialError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CredentialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_path() {
        let err = CredentialError::NotFound {
            what: "material_passwd",
            path: PathBuf::from("/work/material_passwd"),
        };
        assert_eq!(
            err.to_string(),
            "material_passwd is not present at: /work/material_passwd"
        );
    }

    #[test]
    fn test_io_keeps_os_error_as_source() {
        let os = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CredentialError::io("/out/k_certificate.pem", os);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "denied");
    }
}

//! Configuration management for hops-tls
//!
//! Supports loading configuration from:
//! - Built-in defaults (the file names materialized into every container)
//! - Config file (hops-tls.toml, or an explicit path)
//! - Environment variables (HOPS_TLS_*)

use crate::errors::{CredentialError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credential file names
    pub files: FilesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Names of the credential files, relative to the working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Identity keystore (private key + certificate chain)
    pub identity_keystore: String,

    /// Trust keystore (CA certificates)
    pub trust_keystore: String,

    /// Plaintext keystore password
    pub password_file: String,

    /// PEM output for the identity keystore
    pub identity_pem: String,

    /// PEM output for the trust keystore
    pub trust_pem: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            identity_keystore: "k_certificate".to_string(),
            trust_keystore: "t_certificate".to_string(),
            password_file: "material_passwd".to_string(),
            identity_pem: "k_certificate.pem".to_string(),
            trust_pem: "t_certificate.pem".to_string(),
        }
    }
}

impl FilesConfig {
    fn names(&self) -> [(&'static str, &str); 5] {
        [
            ("identity_keystore", &self.identity_keystore),
            ("trust_keystore", &self.trust_keystore),
            ("password_file", &self.password_file),
            ("identity_pem", &self.identity_pem),
            ("trust_pem", &self.trust_pem),
        ]
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Start with defaults
        builder = builder.add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        } else {
            builder = builder.add_source(config::File::with_name("hops-tls").required(false));
        }

        // HOPS_TLS_FILES__PASSWORD_FILE, HOPS_TLS_LOGGING__LEVEL, ...
        builder = builder.add_source(
            config::Environment::with_prefix("HOPS_TLS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(files = ?config.files, "Configuration loaded");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (key, name) in self.files.names() {
            if name.is_empty() {
                return Err(CredentialError::Config(format!("files.{} is empty", key)));
            }
            // Every name is joined onto the working directory
            if Path::new(name).components().count() != 1 || Path::new(name).is_absolute() {
                return Err(CredentialError::Config(format!(
                    "files.{} must be a plain file name, got {:?}",
                    key, name
                )));
            }
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(CredentialError::Config(format!(
                "Unknown log format: {}",
                other
            ))),
        }
    }
}

//! Keystore to PEM conversion
//!
//! Composes parsing, decryption and encoding. Every step fails fast and
//! nothing is written unless the whole conversion succeeded. Output goes to a
//! temporary file next to the target and is renamed over it, so a failed
//! write never leaves a partial PEM behind.

use crate::config::FilesConfig;
use crate::errors::{CredentialError, Result};
use crate::keystore::{self, ProtectionRegistry};
use crate::material::{read_password_file, KeystoreLocator};
use crate::pem::container_to_pem;
use secrecy::ExposeSecret;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Read a whole credential file, mapping a missing file to `NotFound`
pub(crate) fn read_credential_file(path: &Path, what: &'static str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CredentialError::NotFound {
            what,
            path: path.to_path_buf(),
        },
        _ => CredentialError::io(path, e),
    })
}

/// Convert the keystore at `path` to PEM text
pub fn convert(path: &Path, password: &str) -> Result<String> {
    convert_with(&ProtectionRegistry::default(), path, password)
}

/// Convert with a caller-supplied set of key protection algorithms
pub fn convert_with(registry: &ProtectionRegistry, path: &Path, password: &str) -> Result<String> {
    let bytes = read_credential_file(path, "keystore")?;
    let container = keystore::parse(&bytes, password)?;
    debug!(path = %path.display(), entries = container.len(), "Keystore verified");

    let decrypted = registry.decrypt_container(container, password)?;
    Ok(container_to_pem(&decrypted))
}

/// Replace `output_path` with `contents` in one rename. On failure the
/// previous file, if any, is left as it was.
fn write_atomically(output_path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CredentialError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CredentialError::io(output_path, e))?;
    tmp.persist(output_path)
        .map_err(|e| CredentialError::io(output_path, e.error))?;

    Ok(())
}

/// Convert the keystore at `path` and write the PEM text to `output_path`,
/// replacing any existing file
pub fn convert_and_write(path: &Path, password: &str, output_path: &Path) -> Result<()> {
    let pem = convert(path, password)?;
    write_atomically(output_path, pem.as_bytes())?;

    info!(
        keystore = %path.display(),
        output = %output_path.display(),
        "Wrote PEM"
    );
    Ok(())
}

/// Convert both the identity and the trust keystore under `working_dir`.
///
/// The password is read once and used for both stores. Stops at the first
/// failure: if the trust store fails, the identity PEM has already been
/// written and the trust PEM is left untouched.
pub fn write_identity_and_trust_pems(working_dir: &Path, files: &FilesConfig) -> Result<()> {
    let locator = KeystoreLocator::new(working_dir, files.clone());
    let password = read_password_file(&locator.password_file())?;

    convert_and_write(
        &locator.identity_keystore(),
        password.expose_secret(),
        &locator.identity_pem(),
    )?;
    convert_and_write(
        &locator.trust_keystore(),
        password.expose_secret(),
        &locator.trust_pem(),
    )?;

    Ok(())
}

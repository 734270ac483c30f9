//! Keystore password retrieval
//!
//! The password is materialized next to the keystores as a plaintext file.
//! The materializer is known to inject stray `@` and control characters, so
//! everything outside the printable ASCII set is dropped, as is every `@`.
//! Line endings are normalized first: `\r\n` and a lone `\r` both read as `\n`.

use crate::errors::{CredentialError, Result};
use crate::security::{new_password, Password, SecureBytes};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroize;

/// Printable ASCII, including the whitespace characters space, `\t`, `\n`,
/// `\r`, vertical tab and form feed
fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Strip characters the materializer may have corrupted the password with
pub fn sanitize(raw: &str) -> String {
    // Output never outgrows the input, so the buffer is never reallocated
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        let c = if c == '\r' {
            chars.next_if_eq(&'\n');
            '\n'
        } else {
            c
        };
        if is_printable(c) && c != '@' {
            out.push(c);
        }
    }

    out
}

/// Read and sanitize the password stored at `working_dir/file_name`
pub fn read_password(working_dir: &Path, file_name: &str) -> Result<Password> {
    read_password_file(&working_dir.join(file_name))
}

/// Read and sanitize the password stored at `path`
pub fn read_password_file(path: &Path) -> Result<Password> {
    let raw = match fs::read(path) {
        Ok(raw) => SecureBytes::new(raw),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CredentialError::NotFound {
                what: "keystore password file",
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(CredentialError::io(path, e)),
    };

    let password = match String::from_utf8_lossy(raw.expose()) {
        Cow::Borrowed(text) => sanitize(text),
        Cow::Owned(mut text) => {
            let password = sanitize(&text);
            text.zeroize();
            password
        }
    };

    debug!(path = %path.display(), "Read keystore password");
    Ok(new_password(password))
}

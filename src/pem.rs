//! PEM encoding of decrypted keystore contents
//!
//! Output layout is fixed: the begin marker, base64 body lines of 64
//! characters joined by `\r\n`, then the end marker, e.g.
//!
//! ```text
//! -----BEGIN CERTIFICATE-----\n
//! MIIB...(64)\r\n
//! ...(<= 64)\n
//! -----END CERTIFICATE-----\n
//! ```

use crate::keystore::{Certificate, DecryptedContainer};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

const LINE_WIDTH: usize = 64;

/// Encode `der` as one PEM block with the given label
pub fn to_pem(label: &str, der: &[u8]) -> String {
    let b64 = STANDARD.encode(der);
    // base64 output is ASCII, so every chunk is valid UTF-8
    let lines: Vec<&str> = b64
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect();

    let mut pem = String::with_capacity(b64.len() + 2 * lines.len() + 2 * label.len() + 32);
    pem.push_str("-----BEGIN ");
    pem.push_str(label);
    pem.push_str("-----\n");
    pem.push_str(&lines.join("\r\n"));
    pem.push_str("\n-----END ");
    pem.push_str(label);
    pem.push_str("-----\n");
    pem
}

fn certificate_pem(cert: &Certificate) -> String {
    to_pem(CERTIFICATE_LABEL, &cert.der)
}

/// Encode a whole container.
///
/// Every private key entry comes first, in keystore order, each as its key
/// block followed by its chain from leaf to root. Trusted certificates follow,
/// also in keystore order.
pub fn container_to_pem(container: &DecryptedContainer) -> String {
    let mut pem = String::new();

    for entry in container.private_keys() {
        pem.push_str(&to_pem(entry.key.algorithm.pem_label(), entry.key.key.expose()));
        for cert in &entry.cert_chain {
            pem.push_str(&certificate_pem(cert));
        }
    }

    for entry in container.trusted_certs() {
        pem.push_str(&certificate_pem(&entry.certificate));
    }

    pem
}

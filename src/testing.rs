//! Test fixtures: builds JKS containers with known keys and certificates

use crate::keystore::model::{Certificate, DEFAULT_CERT_TYPE};
use crate::keystore::parser::{
    container_digest, MAGIC, TAG_PRIVATE_KEY, TAG_TRUSTED_CERT, VERSION_1, VERSION_2,
};
use crate::keystore::protection::{
    EncryptedPrivateKeyInfo, SunJksKeyProtector, RSA_ENCRYPTION_OID, SUN_JKS_OID,
};
use der::asn1::{AnyRef, ObjectIdentifier, OctetStringRef};
use der::{Decode, Encode};
use pkcs8::spki::AlgorithmIdentifierRef;
use pkcs8::PrivateKeyInfo;
use rand::RngCore;

pub const CREATED_AT_MS: i64 = 1_577_836_800_000;

/// Identity keystore made by `keytool -genkeypair -keyalg RSA -keysize 512`,
/// alias `client`, store and key password `changeit`
pub const KEYTOOL_IDENTITY_JKS: &[u8] = include_bytes!("../testdata/keytool-identity.jks");

/// Trust keystore made by `keytool -importcert` of [`KEYTOOL_CLIENT_CERT`],
/// alias `root-ca-€😀`, password `changeit`
pub const KEYTOOL_TRUST_JKS: &[u8] = include_bytes!("../testdata/keytool-trust.jks");

/// `keytool -exportcert` of the `client` entry
pub const KEYTOOL_CLIENT_CERT: &[u8] = include_bytes!("../testdata/keytool-client-cert.der");

/// The `client` private key as PKCS#1, exported through PKCS#12 with openssl
pub const KEYTOOL_CLIENT_KEY: &[u8] = include_bytes!("../testdata/keytool-client-key.der");

const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// Stand-in certificate; the bytes are never interpreted
pub fn cert(fill: u8) -> Certificate {
    let mut der = vec![0x30, 0x82, 0x01, 0x00];
    der.extend((0..256u16).map(|i| fill.wrapping_add(i as u8)));
    Certificate {
        cert_type: DEFAULT_CERT_TYPE.to_string(),
        der,
    }
}

/// PKCS#1 body carried inside [`sample_pkcs8`]
pub fn sample_rsa_pkcs1() -> Vec<u8> {
    // SEQUENCE { INTEGER 0, INTEGER 0x00c5..., ... } shortened to a recognizable blob
    let mut key = vec![0x30, 0x81, 0x90, 0x02, 0x01, 0x00, 0x02, 0x81, 0x8a];
    key.extend((0..0x8au8).map(|i| i.wrapping_mul(31).wrapping_add(7)));
    key
}

fn wrap_pkcs8(oid: ObjectIdentifier, parameters: Option<AnyRef<'_>>, key: &[u8]) -> Vec<u8> {
    let info = PrivateKeyInfo::new(AlgorithmIdentifierRef { oid, parameters }, key);
    info.to_der().unwrap()
}

/// PKCS#8 `PrivateKeyInfo` for an `rsaEncryption` key
pub fn sample_pkcs8() -> Vec<u8> {
    wrap_pkcs8(RSA_ENCRYPTION_OID, Some(AnyRef::NULL), &sample_rsa_pkcs1())
}

/// PKCS#8 `PrivateKeyInfo` for an EC key (prime256v1)
pub fn sample_ec_pkcs8() -> Vec<u8> {
    let curve = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
    let curve_der = curve.to_der().unwrap();
    let params = AnyRef::from_der(&curve_der).unwrap();
    let mut sec1 = vec![0x30, 0x25, 0x02, 0x01, 0x01, 0x04, 0x20];
    sec1.extend([0x42u8; 32]);
    wrap_pkcs8(EC_PUBLIC_KEY_OID, Some(params), &sec1)
}

/// Protect a PKCS#8 key the way `keytool` does, labelled with `oid`
pub fn protect_with(oid: ObjectIdentifier, pkcs8: &[u8], password: &str) -> Vec<u8> {
    let mut salt = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut salt);

    let ciphertext = SunJksKeyProtector::apply_keystream(password, &salt, pkcs8);
    let check = SunJksKeyProtector::check_digest(password, pkcs8);

    let mut data = salt.to_vec();
    data.extend_from_slice(ciphertext.expose());
    data.extend_from_slice(&check);

    EncryptedPrivateKeyInfo {
        encryption_algorithm: AlgorithmIdentifierRef {
            oid,
            parameters: Some(AnyRef::NULL),
        },
        encrypted_data: OctetStringRef::new(&data).unwrap(),
    }
    .to_der()
    .unwrap()
}

/// Serializes entries into a keystore signed with the given password
pub struct KeystoreWriter {
    password: String,
    version: u32,
    count: u32,
    body: Vec<u8>,
}

impl KeystoreWriter {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            version: VERSION_2,
            count: 0,
            body: Vec::new(),
        }
    }

    /// Set before adding entries; version 1 omits certificate types
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    fn put_utf(&mut self, s: &str) {
        self.body.extend_from_slice(&(s.len() as u16).to_be_bytes());
        self.body.extend_from_slice(s.as_bytes());
    }

    fn put_bytes(&mut self, data: &[u8]) {
        self.body.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.body.extend_from_slice(data);
    }

    fn put_cert(&mut self, cert: &Certificate) {
        if self.version != VERSION_1 {
            self.put_utf(&cert.cert_type);
        }
        self.put_bytes(&cert.der);
    }

    fn put_header(&mut self, tag: u32, alias: &str) {
        self.count += 1;
        self.body.extend_from_slice(&tag.to_be_bytes());
        self.put_utf(alias);
        self.body.extend_from_slice(&CREATED_AT_MS.to_be_bytes());
    }

    /// Adds a private key entry protected with the writer's password
    pub fn private_key(self, alias: &str, pkcs8: &[u8], chain: Vec<Certificate>) -> Self {
        let protected = protect_with(SUN_JKS_OID, pkcs8, &self.password);
        self.protected_key(alias, &protected, chain)
    }

    /// Adds a private key entry with an already protected key blob
    pub fn protected_key(mut self, alias: &str, protected: &[u8], chain: Vec<Certificate>) -> Self {
        self.put_header(TAG_PRIVATE_KEY, alias);
        self.put_bytes(protected);
        self.body
            .extend_from_slice(&(chain.len() as u32).to_be_bytes());
        for cert in &chain {
            self.put_cert(cert);
        }
        self
    }

    pub fn trusted_cert(mut self, alias: &str, cert: Certificate) -> Self {
        self.put_header(TAG_TRUSTED_CERT, alias);
        self.put_cert(&cert);
        self
    }

    /// Adds an entry with an arbitrary tag followed by `body`
    pub fn raw_entry(mut self, tag: u32, body: &[u8]) -> Self {
        self.count += 1;
        self.body.extend_from_slice(&tag.to_be_bytes());
        self.body.extend_from_slice(body);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.count.to_be_bytes());
        out.extend_from_slice(&self.body);
        let digest = container_digest(&self.password, &out);
        out.extend_from_slice(&digest);
        out
    }
}

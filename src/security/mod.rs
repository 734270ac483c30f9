//! Secret handling for passwords and decrypted key material

pub mod zeroize;

pub use zeroize::{new_password, password_utf16_be, Password, SecureBytes};

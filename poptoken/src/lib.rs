//! Proof-of-Possession (PoP) tokens.
//!
//! The key ingestion functions turn PKCS#8 PEM text, plain or password
//! encrypted, into an [`rsa::RsaPrivateKey`]. [`PopTokenBuilder`] signs a
//! token with that key.
//!
//! Failures are reported with a fixed message per category; the detailed
//! cause is written to the [`log`] facade at `error` level.

pub mod builder;
pub mod error;
pub mod key;

pub use builder::{Claims, Header, PopTokenBuilder};
pub use error::{Error, KeyError, Result};
pub use key::{
    KeyFormat, encrypted_key_pem_string_to_private_key, key_pem_string_to_private_key,
};

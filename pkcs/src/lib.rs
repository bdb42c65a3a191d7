//! Private key containers: PKCS#1 RSA keys, PKCS#8 (plain and encrypted)
//! and the PKCS#5 / PKCS#12 password-based schemes that protect them.

pub mod algorithm;
pub mod error;
pub mod pkcs1;
pub mod pkcs5;
pub mod pkcs8;

pub use error::{Error, Result};

//! PKCS#8: Private-Key Information Syntax Specification
//!
//! This module implements [RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958) (Asymmetric Key Packages)
//! which obsoletes RFC 5208 (PKCS#8 v1.2).
//!
//! `PrivateKeyInfo` wraps an algorithm-specific key; `EncryptedPrivateKeyInfo`
//! wraps a `PrivateKeyInfo` encrypted under a password-based scheme from
//! [`crate::pkcs5`].

mod encrypted;

pub mod error;
pub mod types;

pub use encrypted::EncryptedPrivateKeyInfo;
pub use error::{Error, Result};
pub use types::{PrivateKeyInfo, Version};

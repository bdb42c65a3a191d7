//! PKCS#1: RSA private key syntax ([RFC 8017 Appendix A.1.2](https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1.2))

pub mod error;
mod types;

pub use error::{Error, Result};
pub use types::{OtherPrimeInfo, RSAPrivateKey, Version};

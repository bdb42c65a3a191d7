use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("Invalid DER: {0}")]
    InvalidDer(#[from] der::error::Error),

    #[error("expected SEQUENCE for {0}")]
    ExpectedSequence(&'static str),

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected INTEGER for {field}")]
    ExpectedInteger { field: &'static str },

    #[error("negative INTEGER for {field}")]
    NegativeInteger { field: &'static str },

    #[error("empty ASN1Object")]
    EmptyAsn1Object,

    #[error("Invalid version: {0} (must be 0 for two-prime or 1 for multi-prime)")]
    InvalidVersion(i64),

    #[error("version out of range for i64")]
    VersionOutOfRange,

    #[error("version must be multi when otherPrimeInfos is present")]
    VersionMismatch,

    #[error("stored CRT value does not match the key: {0}")]
    CrtMismatch(&'static str),

    #[error("inconsistent RSA key: {0}")]
    InconsistentKey(#[from] rsa::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

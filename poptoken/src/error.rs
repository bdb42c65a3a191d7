use pem::Label;
use thiserror::Error;

use crate::key::KeyFormat;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers.
///
/// Key ingestion failures carry a fixed message only. The underlying
/// [`KeyError`] is logged, never returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("{0}")]
    UnsupportedFormat(&'static str),

    #[error("failed to sign PoP token: {0}")]
    Signing(#[from] rsa::signature::Error),

    #[error("failed to serialize PoP token: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Diagnostic detail of a key ingestion failure.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("PEM text is empty")]
    Empty,

    #[error("unsupported PEM label: {0}")]
    UnsupportedLabel(Label),

    #[error("expected {expected} key, got {actual} key")]
    FormatMismatch {
        expected: KeyFormat,
        actual: KeyFormat,
    },

    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("PKCS#8 error: {0}")]
    Pkcs8(#[from] pkcs::pkcs8::Error),

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] pkcs::pkcs1::Error),
}

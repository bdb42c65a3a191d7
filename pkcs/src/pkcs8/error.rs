use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid version: {0}")]
    InvalidVersion(i64),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected OCTET STRING for {field}")]
    ExpectedOctetString { field: &'static str },

    #[error("expected INTEGER for version")]
    ExpectedVersionInteger,

    #[error("empty ASN1Object")]
    EmptyAsn1Object,

    #[error("trailing data after {0}")]
    TrailingData(&'static str),

    #[error("unexpected element in OneAsymmetricKey: {0}")]
    UnexpectedElement(String),

    #[error("publicKey requires version v2")]
    PublicKeyRequiresV2,

    #[error("unexpected key algorithm: {0}")]
    UnexpectedKeyAlgorithm(String),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),

    #[error("AlgorithmIdentifier error: {0}")]
    Algorithm(#[from] crate::error::Error),

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] crate::pkcs1::Error),

    #[error("PKCS#5 error: {0}")]
    Pkcs5(#[from] crate::pkcs5::Error),

    #[error("decryption failed")]
    DecryptionFailed,
}

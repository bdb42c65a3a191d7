use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported encryption algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported key derivation function: {0}")]
    UnsupportedKeyDerivation(String),

    #[error("unsupported PRF: {0}")]
    UnsupportedPrf(String),

    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    #[error("missing parameters for {0}")]
    MissingParameters(&'static str),

    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("iteration count must be between 1 and {max}")]
    InvalidIterationCount { max: u32 },

    #[error("salt must be {expected} bytes, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    #[error("IV must be {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("keyLength {actual} does not match cipher key size {expected}")]
    KeyLengthMismatch { expected: usize, actual: i64 },

    // Covers bad padding and malformed plaintext alike.
    #[error("decryption failed")]
    DecryptionFailed,
}

pub type Result<T> = std::result::Result<T, Error>;

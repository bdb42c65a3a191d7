use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected SEQUENCE for AlgorithmIdentifier")]
    ExpectedSequence,

    #[error("empty AlgorithmIdentifier")]
    EmptyAlgorithmIdentifier,

    #[error("expected OBJECT IDENTIFIER for algorithm")]
    ExpectedOidForAlgorithm,

    #[error("too many elements in AlgorithmIdentifier")]
    TooManyElements,
}

pub type Result<T> = std::result::Result<T, Error>;

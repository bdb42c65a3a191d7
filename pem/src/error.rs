use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when locating and decoding a PEM envelope.
///
/// The envelope must carry matching `BEGIN`/`END` boundaries with a known
/// label; whitespace inside the body is ignored, anything else that is not
/// base64 text is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No `-----BEGIN <LABEL>-----` boundary precedes the body
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// No `-----END <LABEL>-----` boundary follows the pre encapsulation boundary
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// Nothing but whitespace between the boundaries
    #[error("missing PEM data")]
    MissingData,

    /// The label in the boundary marker is not recognized
    #[error("invalid label")]
    InvalidLabel,

    /// The BEGIN and END labels do not match (e.g., BEGIN PRIVATE KEY, END PUBLIC KEY)
    #[error("label doesn't match")]
    LabelMissMatch,

    /// The boundary matcher could not be built
    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    /// A character outside the base64 alphabet appears in the body
    #[error("invalid base64line")]
    InvalidBase64Line,

    /// Padding appears before the end of the body or is longer than two characters
    #[error("invalid base64finl")]
    InvalidBase64Finl,

    /// Failed to decode base64 data
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}

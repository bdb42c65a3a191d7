//! Error types for ASN.1 element decoding.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("BOOLEAN: invalid encoding")]
    InvalidBoolean,

    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: non-minimal encoding")]
    IntegerNonMinimal,

    #[error("NULL: must not carry content")]
    InvalidNull,

    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: non-minimal sub-identifier")]
    ObjectIdentifierNonMinimal,
    #[error("OBJECT IDENTIFIER: sub-identifier overflows u64")]
    ObjectIdentifierOverflow,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("parse int error: {0}")]
    ParseInt(ParseIntError),

    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),

    #[error("invalid context-specific value: {slot}, {msg}")]
    InvalidContextSpecific { slot: u8, msg: String },

    #[error("invalid DER encoding: {0}")]
    FailedToDecodeDer(#[source] der::error::Error),
}

//! Decoder trait for type-safe conversions.
//!
//! A `Decoder<T, D>` is implemented on the source type `T` and produces the
//! destination type `D`. The destination opts in with the `DecodableFrom<T>`
//! marker, so a conversion only exists when both sides agree on it.
//!
//! # Implementation Guide
//!
//! ```no_run
//! use codec::decoder::{DecodableFrom, Decoder};
//!
//! struct Armored(String);
//! struct Payload(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct PayloadError;
//!
//! impl DecodableFrom<Armored> for Payload {}
//!
//! impl Decoder<Armored, Payload> for Armored {
//!     type Error = PayloadError;
//!
//!     fn decode(&self) -> Result<Payload, Self::Error> {
//!         Ok(Payload(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```
//!
//! When a source type has several destinations, callers pick one with a type
//! annotation or the fully-qualified form:
//!
//! ```ignore
//! use codec::decoder::Decoder;
//! use der::Der;
//! use pem::Pem;
//!
//! let pem: Pem = text.parse()?;
//! let der: Der = Decoder::<Pem, Der>::decode(&pem)?;
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// # Type Parameters
///
/// * `T` - The source type (usually `Self`)
/// * `D` - The destination type that can be decoded from `T`
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails. The specific error
    /// conditions depend on the implementing type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// It carries no methods. Implementing it for a destination type is what
/// allows a matching `Decoder` implementation to exist:
///
/// ```no_run
/// use codec::decoder::DecodableFrom;
///
/// struct Envelope;
/// struct Body;
///
/// impl DecodableFrom<Envelope> for Body {}
/// ```
pub trait DecodableFrom<T> {}

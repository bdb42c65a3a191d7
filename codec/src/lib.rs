//! # codec
//!
//! Core conversion trait for the poptoken key-ingestion pipeline.
//!
//! Every layer turns one representation of a private key into the next one
//! through the `Decoder` trait:
//! ```text
//! &str → Pem → Vec<u8> → Der → ASN1Object → PrivateKeyInfo → RSAPrivateKey
//! ```
//!
//! ## Type Safety
//!
//! `Decoder<T, D>` is guarded by the `DecodableFrom<T>` marker so that only
//! conversions a layer explicitly opts into exist at compile time.
//!
//! ## Example
//!
//! ```ignore
//! use codec::decoder::Decoder;
//! use der::Der;
//! use asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x00];
//! let der: Der = bytes.decode().unwrap();
//! let asn1: ASN1Object = der.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;

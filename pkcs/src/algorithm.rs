//! AlgorithmIdentifier type
//!
//! Defined in [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2)

use asn1::{Element, ObjectIdentifier};
use codec::decoder::{DecodableFrom, Decoder};

use crate::error::{Error, Result};

/// Parameters field in AlgorithmIdentifier
///
/// Wrapped in Option:
/// - None: Field not present
/// - Some(AlgorithmParameters::Null): Explicit NULL value (RSA, HMAC PRFs)
/// - Some(AlgorithmParameters::Other(Element)): anything else, interpreted by the algorithm
#[derive(Debug, Clone)]
pub enum AlgorithmParameters {
    Null,
    Other(Element),
}

/// Algorithm Identifier
///
/// ```asn1
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<AlgorithmParameters>,
}

impl AlgorithmIdentifier {
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";

    // PKCS#5 (RFC 8018)
    pub const OID_PBES1_MD5_DES: &'static str = "1.2.840.113549.1.5.3"; // pbeWithMD5AndDES-CBC
    pub const OID_PBES1_SHA1_DES: &'static str = "1.2.840.113549.1.5.10"; // pbeWithSHA1AndDES-CBC
    pub const OID_PBKDF2: &'static str = "1.2.840.113549.1.5.12";
    pub const OID_PBES2: &'static str = "1.2.840.113549.1.5.13";

    // PBKDF2 PRFs
    pub const OID_HMAC_WITH_SHA1: &'static str = "1.2.840.113549.2.7";
    pub const OID_HMAC_WITH_SHA224: &'static str = "1.2.840.113549.2.8";
    pub const OID_HMAC_WITH_SHA256: &'static str = "1.2.840.113549.2.9";
    pub const OID_HMAC_WITH_SHA384: &'static str = "1.2.840.113549.2.10";
    pub const OID_HMAC_WITH_SHA512: &'static str = "1.2.840.113549.2.11";

    // PBES2 encryption schemes
    pub const OID_DES_EDE3_CBC: &'static str = "1.2.840.113549.3.7";
    pub const OID_AES128_CBC: &'static str = "2.16.840.1.101.3.4.1.2";
    pub const OID_AES192_CBC: &'static str = "2.16.840.1.101.3.4.1.22";
    pub const OID_AES256_CBC: &'static str = "2.16.840.1.101.3.4.1.42";

    // PKCS#12 PBE (RFC 7292 Appendix C)
    pub const OID_PKCS12_PBE_SHA1_3DES: &'static str = "1.2.840.113549.1.12.1.3"; // pbeWithSHAAnd3-KeyTripleDES-CBC
    pub const OID_PKCS12_PBE_SHA1_2DES: &'static str = "1.2.840.113549.1.12.1.4"; // pbeWithSHAAnd2-KeyTripleDES-CBC

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    /// Parameters other than an explicit NULL.
    pub fn element(&self) -> Option<&Element> {
        match &self.parameters {
            Some(AlgorithmParameters::Other(element)) => Some(element),
            _ => None,
        }
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        match self {
            Element::Sequence(elements) => {
                let algorithm = match elements.first() {
                    Some(Element::ObjectIdentifier(oid)) => oid.clone(),
                    Some(_) => return Err(Error::ExpectedOidForAlgorithm),
                    None => return Err(Error::EmptyAlgorithmIdentifier),
                };

                if elements.len() > 2 {
                    return Err(Error::TooManyElements);
                }

                let parameters = match elements.get(1) {
                    Some(Element::Null) => Some(AlgorithmParameters::Null),
                    Some(other) => Some(AlgorithmParameters::Other(other.clone())),
                    None => None,
                };

                Ok(AlgorithmIdentifier {
                    algorithm,
                    parameters,
                })
            }
            _ => Err(Error::ExpectedSequence),
        }
    }
}

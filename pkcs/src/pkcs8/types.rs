use asn1::{ASN1Object, BitString, Element, OctetString};
use codec::decoder::{DecodableFrom, Decoder};
use der::Der;
use pem::Pem;

use super::Result;
use super::error::Error;
use crate::algorithm::AlgorithmIdentifier;
use crate::pkcs1::RSAPrivateKey;

/*
RFC 5958 - Asymmetric Key Packages

OneAsymmetricKey ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
    privateKey                PrivateKey,
    attributes            [0] Attributes OPTIONAL,
    ...,
    [[2: publicKey        [1] PublicKey OPTIONAL ]],
    ...
}

PrivateKeyInfo ::= OneAsymmetricKey

Version ::= INTEGER { v1(0), v2(1) } (v1, ..., v2)

PrivateKeyAlgorithmIdentifier ::= AlgorithmIdentifier

PrivateKey ::= OCTET STRING

PublicKey ::= BIT STRING

Attributes ::= SET OF Attribute
*/

/// PKCS#8 OneAsymmetricKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// Version 1 (no public key)
    V1 = 0,
    /// Version 2 (with public key)
    V2 = 1,
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::V1),
            1 => Ok(Version::V2),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

/// PrivateKeyInfo (OneAsymmetricKey)
///
/// Attributes are kept as the raw element and never interpreted.
#[derive(Debug, Clone)]
pub struct PrivateKeyInfo {
    pub version: Version,
    pub private_key_algorithm: AlgorithmIdentifier,
    pub private_key: OctetString,
    pub attributes: Option<Element>,
    pub public_key: Option<BitString>,
}

impl PrivateKeyInfo {
    /// Decodes the `privateKey` octets as a PKCS#1 RSAPrivateKey.
    ///
    /// Fails unless the algorithm is rsaEncryption.
    pub fn rsa_private_key(&self) -> Result<RSAPrivateKey> {
        let algorithm = self.private_key_algorithm.algorithm();
        if *algorithm != AlgorithmIdentifier::OID_RSA_ENCRYPTION {
            return Err(Error::UnexpectedKeyAlgorithm(algorithm.to_string()));
        }
        let inner = ASN1Object::try_from(&self.private_key)?;
        let key: RSAPrivateKey = inner.decode()?;
        Ok(key)
    }
}

impl DecodableFrom<Element> for PrivateKeyInfo {}

impl Decoder<Element, PrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };
        if !(3..=5).contains(&elements.len()) {
            return Err(Error::InvalidElementCount {
                expected: "3 to 5",
                actual: elements.len(),
            });
        }

        // 1. version (INTEGER)
        let Element::Integer(int) = &elements[0] else {
            return Err(Error::ExpectedVersionInteger);
        };
        let version_int = int.to_i64().ok_or(Error::InvalidVersion(-1))?;
        let version = Version::try_from(version_int)?;

        // 2. privateKeyAlgorithm (AlgorithmIdentifier)
        let private_key_algorithm: AlgorithmIdentifier = elements[1].decode()?;

        // 3. privateKey (OCTET STRING)
        let Element::OctetString(private_key) = &elements[2] else {
            return Err(Error::ExpectedOctetString {
                field: "privateKey",
            });
        };

        // Optional: attributes [0] and publicKey [1], in that order
        let mut attributes = None;
        let mut public_key = None;
        for element in &elements[3..] {
            match element {
                Element::ContextSpecific {
                    slot: 0,
                    constructed: true,
                    element,
                } if attributes.is_none() && public_key.is_none() => {
                    attributes = Some(element.as_ref().clone());
                }
                Element::ContextSpecific {
                    slot: 1,
                    constructed: false,
                    element,
                } if public_key.is_none() => {
                    if version != Version::V2 {
                        return Err(Error::PublicKeyRequiresV2);
                    }
                    let Element::OctetString(raw) = element.as_ref() else {
                        return Err(Error::UnexpectedElement(element.to_string()));
                    };
                    public_key = Some(BitString::try_from(raw.as_bytes())?);
                }
                other => return Err(Error::UnexpectedElement(other.to_string())),
            }
        }

        Ok(PrivateKeyInfo {
            version,
            private_key_algorithm,
            private_key: private_key.clone(),
            attributes,
            public_key,
        })
    }
}

impl DecodableFrom<ASN1Object> for PrivateKeyInfo {}

impl Decoder<ASN1Object, PrivateKeyInfo> for ASN1Object {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        match self.elements() {
            [element] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
            _ => Err(Error::TrailingData("PrivateKeyInfo")),
        }
    }
}

impl DecodableFrom<Pem> for PrivateKeyInfo {}

impl Decoder<Pem, PrivateKeyInfo> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        let der: Der = Decoder::<Pem, Der>::decode(self)?;
        let asn1_obj: ASN1Object = der.decode()?;
        Decoder::<ASN1Object, PrivateKeyInfo>::decode(&asn1_obj)
    }
}

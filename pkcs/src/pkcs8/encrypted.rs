//! RFC 5958 EncryptedPrivateKeyInfo
//!
//! Encrypted private key container. Decryption is delegated to the
//! password-based schemes in [`crate::pkcs5`].

use asn1::{ASN1Object, Element, OctetString};
use codec::decoder::{DecodableFrom, Decoder};
use der::Der;
use pem::Pem;

use super::Result;
use super::error::Error;
use super::types::PrivateKeyInfo;
use crate::algorithm::AlgorithmIdentifier;
use crate::pkcs5::{self, EncryptionScheme};

/// EncryptedPrivateKeyInfo
///
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///     encryptionAlgorithm  EncryptionAlgorithmIdentifier,
///     encryptedData        EncryptedData
/// }
///
/// EncryptedData ::= OCTET STRING
#[derive(Debug, Clone)]
pub struct EncryptedPrivateKeyInfo {
    /// Encryption algorithm identifier
    pub encryption_algorithm: AlgorithmIdentifier,
    /// Encrypted private key data
    pub encrypted_data: OctetString,
}

impl EncryptedPrivateKeyInfo {
    /// Resolves the password-based scheme named by `encryptionAlgorithm`.
    pub fn scheme(&self) -> Result<EncryptionScheme> {
        Ok(EncryptionScheme::try_from(&self.encryption_algorithm)?)
    }

    /// Decrypts `encryptedData` with `password` and parses the plaintext as a
    /// PrivateKeyInfo.
    ///
    /// Once the ciphertext has been decrypted, every failure is reported as
    /// [`Error::DecryptionFailed`] so a wrong password cannot be told apart
    /// from a corrupted key.
    pub fn decrypt(&self, password: &str) -> Result<PrivateKeyInfo> {
        let scheme = self.scheme()?;
        let plaintext = scheme
            .decrypt(password, self.encrypted_data.as_bytes())
            .map_err(|e| match e {
                pkcs5::Error::DecryptionFailed => Error::DecryptionFailed,
                other => Error::Pkcs5(other),
            })?;

        let der: Der = plaintext
            .as_slice()
            .decode()
            .map_err(|_| Error::DecryptionFailed)?;
        let asn1_obj: ASN1Object = der.decode().map_err(|_| Error::DecryptionFailed)?;
        Decoder::<ASN1Object, PrivateKeyInfo>::decode(&asn1_obj).map_err(|_| Error::DecryptionFailed)
    }
}

impl DecodableFrom<Element> for EncryptedPrivateKeyInfo {}

impl Decoder<Element, EncryptedPrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        match self {
            Element::Sequence(elements) => {
                if elements.len() != 2 {
                    return Err(Error::InvalidElementCount {
                        expected: "2",
                        actual: elements.len(),
                    });
                }

                // 1. encryptionAlgorithm (AlgorithmIdentifier)
                let encryption_algorithm: AlgorithmIdentifier = elements[0].decode()?;

                // 2. encryptedData (OCTET STRING)
                let Element::OctetString(encrypted_data) = &elements[1] else {
                    return Err(Error::ExpectedOctetString {
                        field: "encryptedData",
                    });
                };

                Ok(EncryptedPrivateKeyInfo {
                    encryption_algorithm,
                    encrypted_data: encrypted_data.clone(),
                })
            }
            _ => Err(Error::ExpectedSequence),
        }
    }
}

impl DecodableFrom<ASN1Object> for EncryptedPrivateKeyInfo {}

impl Decoder<ASN1Object, EncryptedPrivateKeyInfo> for ASN1Object {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        match self.elements() {
            [element] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
            _ => Err(Error::TrailingData("EncryptedPrivateKeyInfo")),
        }
    }
}

impl DecodableFrom<Pem> for EncryptedPrivateKeyInfo {}

impl Decoder<Pem, EncryptedPrivateKeyInfo> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        let der: Der = Decoder::<Pem, Der>::decode(self)?;
        let asn1_obj: ASN1Object = der.decode()?;
        Decoder::<ASN1Object, EncryptedPrivateKeyInfo>::decode(&asn1_obj)
    }
}

use asn1::Element;
use cbc::cipher::BlockSizeUser;
use codec::decoder::Decoder;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use super::{Error, Result, cbc_decrypt, iteration_count, octet_string};
use crate::algorithm::AlgorithmIdentifier;

/*
RFC 8018 - PKCS #5: Password-Based Cryptography Specification

PBES2-params ::= SEQUENCE {
    keyDerivationFunc AlgorithmIdentifier {{PBES2-KDFs}},
    encryptionScheme  AlgorithmIdentifier {{PBES2-Encs}}
}

PBKDF2-params ::= SEQUENCE {
    salt CHOICE {
        specified   OCTET STRING,
        otherSource AlgorithmIdentifier {{PBKDF2-SaltSources}}
    },
    iterationCount INTEGER (1..MAX),
    keyLength      INTEGER (1..MAX) OPTIONAL,
    prf            AlgorithmIdentifier {{PBKDF2-PRFs}} DEFAULT algid-hmacWithSHA1
}
*/

/// Pseudorandom function used by PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prf {
    #[default]
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl TryFrom<&AlgorithmIdentifier> for Prf {
    type Error = Error;

    fn try_from(alg: &AlgorithmIdentifier) -> Result<Self> {
        let oid = alg.algorithm().to_string();
        match oid.as_str() {
            AlgorithmIdentifier::OID_HMAC_WITH_SHA1 => Ok(Prf::HmacSha1),
            AlgorithmIdentifier::OID_HMAC_WITH_SHA224 => Ok(Prf::HmacSha224),
            AlgorithmIdentifier::OID_HMAC_WITH_SHA256 => Ok(Prf::HmacSha256),
            AlgorithmIdentifier::OID_HMAC_WITH_SHA384 => Ok(Prf::HmacSha384),
            AlgorithmIdentifier::OID_HMAC_WITH_SHA512 => Ok(Prf::HmacSha512),
            _ => Err(Error::UnsupportedPrf(oid)),
        }
    }
}

impl Prf {
    pub fn derive(self, password: &[u8], salt: &[u8], rounds: u32, key: &mut [u8]) {
        match self {
            Prf::HmacSha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, rounds, key),
            Prf::HmacSha224 => pbkdf2::pbkdf2_hmac::<Sha224>(password, salt, rounds, key),
            Prf::HmacSha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, key),
            Prf::HmacSha384 => pbkdf2::pbkdf2_hmac::<Sha384>(password, salt, rounds, key),
            Prf::HmacSha512 => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pbes2Cipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
}

impl Pbes2Cipher {
    fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            AlgorithmIdentifier::OID_AES128_CBC => Some(Pbes2Cipher::Aes128Cbc),
            AlgorithmIdentifier::OID_AES192_CBC => Some(Pbes2Cipher::Aes192Cbc),
            AlgorithmIdentifier::OID_AES256_CBC => Some(Pbes2Cipher::Aes256Cbc),
            AlgorithmIdentifier::OID_DES_EDE3_CBC => Some(Pbes2Cipher::DesEde3Cbc),
            _ => None,
        }
    }

    pub fn key_size(self) -> usize {
        match self {
            Pbes2Cipher::Aes128Cbc => 16,
            Pbes2Cipher::Aes192Cbc => 24,
            Pbes2Cipher::Aes256Cbc => 32,
            Pbes2Cipher::DesEde3Cbc => 24,
        }
    }

    pub fn block_size(self) -> usize {
        match self {
            Pbes2Cipher::Aes128Cbc | Pbes2Cipher::Aes192Cbc | Pbes2Cipher::Aes256Cbc => {
                aes::Aes128::block_size()
            }
            Pbes2Cipher::DesEde3Cbc => des::TdesEde3::block_size(),
        }
    }

    fn decrypt(self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Pbes2Cipher::Aes128Cbc => cbc_decrypt::<aes::Aes128>(key, iv, ciphertext),
            Pbes2Cipher::Aes192Cbc => cbc_decrypt::<aes::Aes192>(key, iv, ciphertext),
            Pbes2Cipher::Aes256Cbc => cbc_decrypt::<aes::Aes256>(key, iv, ciphertext),
            Pbes2Cipher::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(key, iv, ciphertext),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pbkdf2Params {
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub key_length: Option<i64>,
    pub prf: Prf,
}

impl TryFrom<&Element> for Pbkdf2Params {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        let Element::Sequence(elements) = element else {
            return Err(Error::InvalidParameters("PBKDF2-params must be a SEQUENCE"));
        };
        let mut fields = elements.iter();

        let salt = match fields.next() {
            Some(Element::OctetString(salt)) => salt.as_bytes().to_vec(),
            Some(Element::Sequence(_)) => {
                return Err(Error::InvalidParameters("PBKDF2 otherSource salt"));
            }
            _ => return Err(Error::InvalidParameters("PBKDF2 salt")),
        };
        let iterations = iteration_count(
            fields
                .next()
                .ok_or(Error::InvalidParameters("PBKDF2 iterationCount"))?,
        )?;

        let mut next = fields.next();
        let mut key_length = None;
        if let Some(Element::Integer(len)) = next {
            key_length = Some(
                len.to_i64()
                    .ok_or(Error::InvalidParameters("PBKDF2 keyLength"))?,
            );
            next = fields.next();
        }

        let prf = match next {
            Some(element) => {
                let alg: AlgorithmIdentifier = element
                    .decode()
                    .map_err(|_| Error::InvalidParameters("PBKDF2 prf"))?;
                Prf::try_from(&alg)?
            }
            None => Prf::default(),
        };

        if fields.next().is_some() {
            return Err(Error::InvalidParameters("trailing PBKDF2-params fields"));
        }

        Ok(Pbkdf2Params {
            salt,
            iterations,
            key_length,
            prf,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Pbes2Params {
    pub kdf: Pbkdf2Params,
    pub cipher: Pbes2Cipher,
    pub iv: Vec<u8>,
}

impl TryFrom<&Element> for Pbes2Params {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        let Element::Sequence(elements) = element else {
            return Err(Error::InvalidParameters("PBES2-params must be a SEQUENCE"));
        };
        let [kdf, scheme] = elements.as_slice() else {
            return Err(Error::InvalidParameters("PBES2-params must have 2 elements"));
        };

        let kdf: AlgorithmIdentifier = kdf
            .decode()
            .map_err(|_| Error::InvalidParameters("keyDerivationFunc"))?;
        if *kdf.algorithm() != AlgorithmIdentifier::OID_PBKDF2 {
            return Err(Error::UnsupportedKeyDerivation(kdf.algorithm().to_string()));
        }
        let kdf = Pbkdf2Params::try_from(kdf.element().ok_or(Error::MissingParameters("PBKDF2"))?)?;

        let scheme: AlgorithmIdentifier = scheme
            .decode()
            .map_err(|_| Error::InvalidParameters("encryptionScheme"))?;
        let oid = scheme.algorithm().to_string();
        let cipher = Pbes2Cipher::from_oid(&oid).ok_or(Error::UnsupportedCipher(oid))?;
        let iv = octet_string(
            scheme
                .element()
                .ok_or(Error::MissingParameters("encryptionScheme"))?,
            "IV must be OCTET STRING",
        )?
        .to_vec();

        if iv.len() != cipher.block_size() {
            return Err(Error::InvalidIvLength {
                expected: cipher.block_size(),
                actual: iv.len(),
            });
        }
        if let Some(len) = kdf.key_length {
            if len != cipher.key_size() as i64 {
                return Err(Error::KeyLengthMismatch {
                    expected: cipher.key_size(),
                    actual: len,
                });
            }
        }

        Ok(Pbes2Params { kdf, cipher, iv })
    }
}

impl Pbes2Params {
    pub fn decrypt(&self, password: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mut key = Zeroizing::new(vec![0u8; self.cipher.key_size()]);
        self.kdf.prf.derive(
            password,
            &self.kdf.salt,
            self.kdf.iterations,
            key.as_mut_slice(),
        );
        self.cipher.decrypt(&key, &self.iv, ciphertext)
    }
}

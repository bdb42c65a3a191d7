//! Password-based encryption of private keys.
//!
//! Covers the schemes found in `ENCRYPTED PRIVATE KEY` containers:
//!
//! - PBES2 with PBKDF2 ([RFC 8018 Section 6.2](https://datatracker.ietf.org/doc/html/rfc8018#section-6.2))
//! - PBES1 with PBKDF1 and DES-CBC ([RFC 8018 Section 6.1](https://datatracker.ietf.org/doc/html/rfc8018#section-6.1))
//! - PKCS#12 PBE with SHA-1 and Triple-DES ([RFC 7292 Appendix B](https://datatracker.ietf.org/doc/html/rfc7292#appendix-B))
//!
//! The scheme is chosen from the AlgorithmIdentifier OID. Every scheme ends in
//! CBC decryption with PKCS#7 padding.

use asn1::Element;
use cbc::cipher::{
    BlockCipher, BlockDecryptMut, BlockSizeUser, KeyInit, KeyIvInit, block_padding::Pkcs7,
};
use zeroize::Zeroizing;

use crate::algorithm::AlgorithmIdentifier;

pub mod error;
mod pbes1;
mod pbes2;
mod pkcs12;

pub use error::{Error, Result};
pub use pbes1::{Pbes1Digest, Pbes1Params};
pub use pbes2::{Pbes2Cipher, Pbes2Params, Pbkdf2Params, Prf};
pub use pkcs12::{Pkcs12Cipher, Pkcs12PbeParams};

/// Upper bound on the iteration count accepted from an encrypted key.
pub const MAX_ITERATIONS: u32 = 10_000_000;

#[derive(Debug, Clone)]
pub enum EncryptionScheme {
    Pbes2(Pbes2Params),
    Pbes1(Pbes1Params),
    Pkcs12(Pkcs12PbeParams),
}

impl TryFrom<&AlgorithmIdentifier> for EncryptionScheme {
    type Error = Error;

    fn try_from(alg: &AlgorithmIdentifier) -> Result<Self> {
        let oid = alg.algorithm().to_string();
        let params = alg.element();
        match oid.as_str() {
            AlgorithmIdentifier::OID_PBES2 => Ok(EncryptionScheme::Pbes2(
                Pbes2Params::try_from(params.ok_or(Error::MissingParameters("PBES2"))?)?,
            )),
            AlgorithmIdentifier::OID_PBES1_MD5_DES => Ok(EncryptionScheme::Pbes1(Pbes1Params::new(
                Pbes1Digest::Md5,
                params.ok_or(Error::MissingParameters("PBES1"))?,
            )?)),
            AlgorithmIdentifier::OID_PBES1_SHA1_DES => Ok(EncryptionScheme::Pbes1(Pbes1Params::new(
                Pbes1Digest::Sha1,
                params.ok_or(Error::MissingParameters("PBES1"))?,
            )?)),
            AlgorithmIdentifier::OID_PKCS12_PBE_SHA1_3DES => Ok(EncryptionScheme::Pkcs12(
                Pkcs12PbeParams::new(
                    Pkcs12Cipher::DesEde3Cbc,
                    params.ok_or(Error::MissingParameters("PKCS#12 PBE"))?,
                )?,
            )),
            AlgorithmIdentifier::OID_PKCS12_PBE_SHA1_2DES => Ok(EncryptionScheme::Pkcs12(
                Pkcs12PbeParams::new(
                    Pkcs12Cipher::DesEde2Cbc,
                    params.ok_or(Error::MissingParameters("PKCS#12 PBE"))?,
                )?,
            )),
            _ => Err(Error::UnsupportedAlgorithm(oid)),
        }
    }
}

impl EncryptionScheme {
    /// Short human-readable name, safe to log.
    pub fn name(&self) -> &'static str {
        match self {
            EncryptionScheme::Pbes2(_) => "PBES2",
            EncryptionScheme::Pbes1(params) => match params.digest {
                Pbes1Digest::Md5 => "pbeWithMD5AndDES-CBC",
                Pbes1Digest::Sha1 => "pbeWithSHA1AndDES-CBC",
            },
            EncryptionScheme::Pkcs12(params) => match params.cipher {
                Pkcs12Cipher::DesEde3Cbc => "pbeWithSHAAnd3-KeyTripleDES-CBC",
                Pkcs12Cipher::DesEde2Cbc => "pbeWithSHAAnd2-KeyTripleDES-CBC",
            },
        }
    }

    /// Derives the key from `password` and decrypts `ciphertext`.
    ///
    /// A wrong password, a wrong padding and a truncated ciphertext all end in
    /// [`Error::DecryptionFailed`].
    pub fn decrypt(&self, password: &str, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            EncryptionScheme::Pbes2(params) => params.decrypt(password.as_bytes(), ciphertext),
            EncryptionScheme::Pbes1(params) => params.decrypt(password.as_bytes(), ciphertext),
            EncryptionScheme::Pkcs12(params) => params.decrypt(password, ciphertext),
        }
    }
}

pub(crate) fn octet_string<'a>(element: &'a Element, what: &'static str) -> Result<&'a [u8]> {
    match element {
        Element::OctetString(os) => Ok(os.as_bytes()),
        _ => Err(Error::InvalidParameters(what)),
    }
}

pub(crate) fn iteration_count(element: &Element) -> Result<u32> {
    let Element::Integer(int) = element else {
        return Err(Error::InvalidParameters("iterationCount must be INTEGER"));
    };
    int.to_u32()
        .filter(|n| (1..=MAX_ITERATIONS).contains(n))
        .ok_or(Error::InvalidIterationCount {
            max: MAX_ITERATIONS,
        })
}

pub(crate) fn cbc_decrypt<C>(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let block_size = C::block_size();
    if iv.len() != block_size {
        return Err(Error::InvalidIvLength {
            expected: block_size,
            actual: iv.len(),
        });
    }
    if ciphertext.is_empty() || ciphertext.len() % block_size != 0 {
        return Err(Error::DecryptionFailed);
    }
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidParameters("key length"))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| Error::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use asn1::{Element, Integer, ObjectIdentifier, OctetString};
    use rstest::rstest;

    use super::{EncryptionScheme, Error, MAX_ITERATIONS, cbc_decrypt, iteration_count};
    use crate::algorithm::{AlgorithmIdentifier, AlgorithmParameters};

    fn alg(oid: &str, params: Option<Element>) -> AlgorithmIdentifier {
        AlgorithmIdentifier {
            algorithm: ObjectIdentifier::from_str(oid).unwrap(),
            parameters: params.map(AlgorithmParameters::Other),
        }
    }

    fn pbe_params(salt: Vec<u8>, iterations: i64) -> Element {
        Element::Sequence(vec![
            Element::OctetString(OctetString::from(salt)),
            Element::Integer(Integer::from(iterations)),
        ])
    }

    #[rstest]
    #[case(AlgorithmIdentifier::OID_PBES1_MD5_DES, "pbeWithMD5AndDES-CBC")]
    #[case(AlgorithmIdentifier::OID_PBES1_SHA1_DES, "pbeWithSHA1AndDES-CBC")]
    #[case(AlgorithmIdentifier::OID_PKCS12_PBE_SHA1_3DES, "pbeWithSHAAnd3-KeyTripleDES-CBC")]
    #[case(AlgorithmIdentifier::OID_PKCS12_PBE_SHA1_2DES, "pbeWithSHAAnd2-KeyTripleDES-CBC")]
    fn test_select_scheme(#[case] oid: &str, #[case] expected: &str) {
        let alg = alg(oid, Some(pbe_params(vec![0; 8], 2048)));
        let scheme = EncryptionScheme::try_from(&alg).unwrap();
        assert_eq!(expected, scheme.name());
    }

    #[rstest]
    // pbeWithMD2AndDES-CBC
    #[case(alg("1.2.840.113549.1.5.1", Some(pbe_params(vec![0; 8], 1))), Error::UnsupportedAlgorithm("1.2.840.113549.1.5.1".to_string()))]
    // pbeWithSHAAnd128BitRC4
    #[case(alg("1.2.840.113549.1.12.1.1", Some(pbe_params(vec![0; 8], 1))), Error::UnsupportedAlgorithm("1.2.840.113549.1.12.1.1".to_string()))]
    #[case(alg(AlgorithmIdentifier::OID_PBES2, None), Error::MissingParameters("PBES2"))]
    #[case(alg(AlgorithmIdentifier::OID_PBES1_MD5_DES, None), Error::MissingParameters("PBES1"))]
    #[case(alg(AlgorithmIdentifier::OID_PKCS12_PBE_SHA1_3DES, Some(pbe_params(vec![0; 8], 0))), Error::InvalidIterationCount { max: MAX_ITERATIONS })]
    fn test_select_scheme_error(#[case] input: AlgorithmIdentifier, #[case] expected: Error) {
        assert_eq!(expected, EncryptionScheme::try_from(&input).unwrap_err());
    }

    #[rstest]
    #[case(1, Ok(1))]
    #[case(2048, Ok(2048))]
    #[case(10_000_000, Ok(10_000_000))]
    #[case(10_000_001, Err(Error::InvalidIterationCount { max: MAX_ITERATIONS }))]
    #[case(0, Err(Error::InvalidIterationCount { max: MAX_ITERATIONS }))]
    #[case(-1, Err(Error::InvalidIterationCount { max: MAX_ITERATIONS }))]
    fn test_iteration_count(#[case] input: i64, #[case] expected: Result<u32, Error>) {
        assert_eq!(expected, iteration_count(&Element::Integer(Integer::from(input))));
    }

    #[rstest]
    #[case(vec![], Error::DecryptionFailed)]
    #[case(vec![0u8; 15], Error::DecryptionFailed)]
    fn test_cbc_decrypt_rejects_partial_blocks(#[case] input: Vec<u8>, #[case] expected: Error) {
        let result = cbc_decrypt::<aes::Aes128>(&[0u8; 16], &[0u8; 16], &input);
        assert_eq!(expected, result.unwrap_err());
    }

    #[test]
    fn test_cbc_decrypt_iv_length() {
        let result = cbc_decrypt::<aes::Aes128>(&[0u8; 16], &[0u8; 8], &[0u8; 16]);
        assert_eq!(
            Error::InvalidIvLength {
                expected: 16,
                actual: 8
            },
            result.unwrap_err()
        );
    }

    fn encrypt_block(plaintext: &[u8; 16]) -> Vec<u8> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
        cbc::Encryptor::<aes::Aes128>::new_from_slices(&[0x11; 16], &[0x22; 16])
            .unwrap()
            .encrypt_padded_vec_mut::<NoPadding>(plaintext)
    }

    #[rstest]
    // last byte 0 is never a valid pad length
    #[case([0u8; 16], None)]
    // pad length 3 but the preceding bytes disagree
    #[case([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 3, 3], None)]
    #[case([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 3, 3], Some(13))]
    fn test_cbc_decrypt_padding(#[case] plaintext: [u8; 16], #[case] expected_len: Option<usize>) {
        let ciphertext = encrypt_block(&plaintext);
        let result = cbc_decrypt::<aes::Aes128>(&[0x11; 16], &[0x22; 16], &ciphertext);
        match expected_len {
            Some(len) => assert_eq!(&plaintext[..len], result.unwrap().as_slice()),
            None => assert_eq!(Error::DecryptionFailed, result.unwrap_err()),
        }
    }
}

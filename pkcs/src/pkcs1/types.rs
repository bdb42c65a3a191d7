use asn1::{ASN1Object, Element, Integer};
use codec::decoder::{DecodableFrom, Decoder};
use rsa::BigUint;
use zeroize::Zeroizing;

use super::error::{Error, Result};

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}

Version ::= INTEGER { two-prime(0), multi(1) }
    (CONSTRAINED BY {-- version must be multi if otherPrimeInfos present --})

OtherPrimeInfos ::= SEQUENCE SIZE(1..MAX) OF OtherPrimeInfo

OtherPrimeInfo ::= SEQUENCE {
    prime             INTEGER,  -- ri
    exponent          INTEGER,  -- di
    coefficient       INTEGER   -- ti
}
*/

/// PKCS#1 RSAPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    TwoPrime = 0,
    Multi = 1,
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Version::TwoPrime),
            1 => Ok(Version::Multi),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        match self {
            Element::Integer(int) => {
                let value = int.to_i64().ok_or(Error::VersionOutOfRange)?;
                Version::try_from(value)
            }
            _ => Err(Error::ExpectedInteger { field: "version" }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherPrimeInfo {
    pub prime: Integer,       // ri
    pub exponent: Integer,    // di
    pub coefficient: Integer, // ti
}

impl DecodableFrom<Element> for OtherPrimeInfo {}

impl Decoder<Element, OtherPrimeInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<OtherPrimeInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("OtherPrimeInfo"));
        };
        if elements.len() != 3 {
            return Err(Error::InvalidElementCount {
                expected: "3",
                actual: elements.len(),
            });
        }
        Ok(OtherPrimeInfo {
            prime: integer(&elements[0], "prime")?,
            exponent: integer(&elements[1], "exponent")?,
            coefficient: integer(&elements[2], "coefficient")?,
        })
    }
}

/// PKCS#1 RSA Private Key structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPrivateKey {
    pub version: Version,
    pub modulus: Integer,          // n
    pub public_exponent: Integer,  // e
    pub private_exponent: Integer, // d
    pub prime1: Integer,           // p
    pub prime2: Integer,           // q
    pub exponent1: Integer,        // d mod (p-1)
    pub exponent2: Integer,        // d mod (q-1)
    pub coefficient: Integer,      // (inverse of q) mod p
    pub other_prime_infos: Vec<OtherPrimeInfo>,
}

fn integer(element: &Element, field: &'static str) -> Result<Integer> {
    match element {
        Element::Integer(int) => Ok(int.clone()),
        _ => Err(Error::ExpectedInteger { field }),
    }
}

impl DecodableFrom<Element> for RSAPrivateKey {}

impl Decoder<Element, RSAPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("RSAPrivateKey"));
        };
        if elements.len() != 9 && elements.len() != 10 {
            return Err(Error::InvalidElementCount {
                expected: "9 or 10",
                actual: elements.len(),
            });
        }

        let version: Version = elements[0].decode()?;

        let other_prime_infos = match elements.get(9) {
            Some(Element::Sequence(infos)) => infos
                .iter()
                .map(|info| info.decode())
                .collect::<Result<Vec<OtherPrimeInfo>>>()?,
            Some(_) => return Err(Error::ExpectedSequence("OtherPrimeInfos")),
            None => Vec::new(),
        };
        if !other_prime_infos.is_empty() && version != Version::Multi {
            return Err(Error::VersionMismatch);
        }

        Ok(RSAPrivateKey {
            version,
            modulus: integer(&elements[1], "modulus")?,
            public_exponent: integer(&elements[2], "publicExponent")?,
            private_exponent: integer(&elements[3], "privateExponent")?,
            prime1: integer(&elements[4], "prime1")?,
            prime2: integer(&elements[5], "prime2")?,
            exponent1: integer(&elements[6], "exponent1")?,
            exponent2: integer(&elements[7], "exponent2")?,
            coefficient: integer(&elements[8], "coefficient")?,
            other_prime_infos,
        })
    }
}

impl DecodableFrom<ASN1Object> for RSAPrivateKey {}

impl Decoder<ASN1Object, RSAPrivateKey> for ASN1Object {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        match self.elements() {
            [element] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
            elements => Err(Error::InvalidElementCount {
                expected: "1 top-level",
                actual: elements.len(),
            }),
        }
    }
}

fn biguint(int: &Integer, field: &'static str) -> Result<BigUint> {
    let bytes = int
        .to_unsigned_bytes_be()
        .map(Zeroizing::new)
        .ok_or(Error::NegativeInteger { field })?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// Builds a usable key from the decoded components.
///
/// The key is rejected unless `validate` holds for n, e, d and the primes and
/// every stored CRT exponent and coefficient agrees with them.
impl TryFrom<&RSAPrivateKey> for rsa::RsaPrivateKey {
    type Error = Error;

    fn try_from(key: &RSAPrivateKey) -> Result<Self> {
        let mut primes = vec![biguint(&key.prime1, "prime1")?, biguint(&key.prime2, "prime2")?];
        for info in &key.other_prime_infos {
            primes.push(biguint(&info.prime, "prime")?);
        }

        let private_exponent = biguint(&key.private_exponent, "privateExponent")?;
        check_crt_values(key, &private_exponent, &primes)?;

        let private_key = rsa::RsaPrivateKey::from_components(
            biguint(&key.modulus, "modulus")?,
            biguint(&key.public_exponent, "publicExponent")?,
            private_exponent,
            primes,
        )?;
        private_key.validate()?;
        Ok(private_key)
    }
}

/// d mod (r - 1) must equal the stored exponent, and coefficient * product
/// must be 1 mod r with the coefficient reduced below r.
fn check_crt_values(key: &RSAPrivateKey, d: &BigUint, primes: &[BigUint]) -> Result<()> {
    let one = BigUint::from(1u32);
    let [p, q, others @ ..] = primes else {
        return Err(Error::CrtMismatch("prime count"));
    };
    if primes.iter().any(|r| *r <= one) {
        return Err(Error::CrtMismatch("prime"));
    }

    let exponent_matches = |exponent: &BigUint, r: &BigUint| *exponent == d % (r - &one);
    let coefficient_matches = |coefficient: &BigUint, product: &BigUint, r: &BigUint| {
        coefficient < r && (coefficient * product) % r == one
    };

    if !exponent_matches(&biguint(&key.exponent1, "exponent1")?, p) {
        return Err(Error::CrtMismatch("exponent1"));
    }
    if !exponent_matches(&biguint(&key.exponent2, "exponent2")?, q) {
        return Err(Error::CrtMismatch("exponent2"));
    }
    // PKCS#1 stores q^-1 mod p
    if !coefficient_matches(&biguint(&key.coefficient, "coefficient")?, q, p) {
        return Err(Error::CrtMismatch("coefficient"));
    }

    let mut product = p * q;
    for (info, r) in key.other_prime_infos.iter().zip(others) {
        if !exponent_matches(&biguint(&info.exponent, "exponent")?, r) {
            return Err(Error::CrtMismatch("otherPrimeInfo exponent"));
        }
        if !coefficient_matches(&biguint(&info.coefficient, "coefficient")?, &product, r) {
            return Err(Error::CrtMismatch("otherPrimeInfo coefficient"));
        }
        product *= r;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use asn1::{ASN1Object, Element, Integer};
    use codec::decoder::Decoder;
    use der::Der;
    use pem::Pem;
    use rsa::traits::{PrivateKeyParts, PublicKeyParts};
    use rstest::rstest;

    use super::{RSAPrivateKey, Version};
    use crate::pkcs1::Error;

    const PKCS1_PEM: &str = include_str!("../../../poptoken/tests/testdata/pkcs1.pem");
    const PKCS1_THREE_PRIME_PEM: &str =
        include_str!("../../../poptoken/tests/testdata/pkcs1_three_prime.pem");

    fn decode_fixture() -> RSAPrivateKey {
        decode_pem(PKCS1_PEM)
    }

    fn decode_pem(pem_data: &str) -> RSAPrivateKey {
        let pem: Pem = pem_data.parse().unwrap();
        let der: Der = pem.decode().unwrap();
        let obj: ASN1Object = der.decode().unwrap();
        obj.decode().unwrap()
    }

    fn int(n: i64) -> Element {
        Element::Integer(Integer::from(n))
    }

    #[test]
    fn test_decode_rsa_private_key() {
        let key = decode_fixture();
        assert_eq!(Version::TwoPrime, key.version);
        assert_eq!(Some(65537), key.public_exponent.to_i64());
        assert!(key.other_prime_infos.is_empty());

        let private_key = rsa::RsaPrivateKey::try_from(&key).unwrap();
        assert_eq!(2048, private_key.n().bits());
    }

    #[test]
    fn test_convert_three_prime_key() {
        let key = decode_pem(PKCS1_THREE_PRIME_PEM);
        assert_eq!(Version::Multi, key.version);
        assert_eq!(1, key.other_prime_infos.len());

        let private_key = rsa::RsaPrivateKey::try_from(&key).unwrap();
        assert_eq!(3, private_key.primes().len());
    }

    #[rstest]
    #[case(|key: &mut RSAPrivateKey| key.exponent1 = key.exponent2.clone(), "exponent1")]
    #[case(|key: &mut RSAPrivateKey| key.exponent2 = Integer::from(3), "exponent2")]
    #[case(|key: &mut RSAPrivateKey| key.coefficient = Integer::from(1), "coefficient")]
    #[case(|key: &mut RSAPrivateKey| key.coefficient = key.prime1.clone(), "coefficient")]
    fn test_convert_corrupt_crt_values(#[case] corrupt: fn(&mut RSAPrivateKey), #[case] field: &str) {
        let mut key = decode_fixture();
        corrupt(&mut key);
        let result = rsa::RsaPrivateKey::try_from(&key);
        assert!(matches!(result, Err(Error::CrtMismatch(f)) if f == field));
    }

    #[rstest]
    #[case(|key: &mut RSAPrivateKey| key.other_prime_infos[0].exponent = Integer::from(3), "otherPrimeInfo exponent")]
    #[case(|key: &mut RSAPrivateKey| key.other_prime_infos[0].coefficient = key.coefficient.clone(), "otherPrimeInfo coefficient")]
    fn test_convert_corrupt_other_prime_info(
        #[case] corrupt: fn(&mut RSAPrivateKey),
        #[case] field: &str,
    ) {
        let mut key = decode_pem(PKCS1_THREE_PRIME_PEM);
        corrupt(&mut key);
        let result = rsa::RsaPrivateKey::try_from(&key);
        assert!(matches!(result, Err(Error::CrtMismatch(f)) if f == field));
    }

    #[test]
    fn test_convert_inconsistent_key() {
        let mut key = decode_fixture();
        key.modulus = Integer::from(3233);
        let result = rsa::RsaPrivateKey::try_from(&key);
        assert!(matches!(result, Err(Error::InconsistentKey(_))));
    }

    #[test]
    fn test_convert_negative_component() {
        let mut key = decode_fixture();
        key.private_exponent = Integer::from(-1);
        let result = rsa::RsaPrivateKey::try_from(&key);
        assert!(matches!(
            result,
            Err(Error::NegativeInteger {
                field: "privateExponent"
            })
        ));
    }

    #[rstest]
    #[case(int(0), "expected SEQUENCE for RSAPrivateKey")]
    #[case(Element::Sequence(vec![int(0), int(1)]), "expected 9 or 10 elements, got 2")]
    #[case(Element::Sequence(vec![int(2), int(1), int(1), int(1), int(1), int(1), int(1), int(1), int(1)]), "Invalid version: 2 (must be 0 for two-prime or 1 for multi-prime)")]
    #[case(Element::Sequence(vec![int(0), int(1), Element::Null, int(1), int(1), int(1), int(1), int(1), int(1)]), "expected INTEGER for publicExponent")]
    #[case(Element::Sequence(vec![int(0), int(1), int(1), int(1), int(1), int(1), int(1), int(1), int(1), Element::Sequence(vec![Element::Sequence(vec![int(1), int(1), int(1)])])]), "version must be multi when otherPrimeInfos is present")]
    #[case(Element::Sequence(vec![int(1), int(1), int(1), int(1), int(1), int(1), int(1), int(1), int(1), Element::Sequence(vec![Element::Sequence(vec![int(1), int(1)])])]), "expected 3 elements, got 2")]
    fn test_decode_rsa_private_key_error(#[case] input: Element, #[case] expected: &str) {
        let result: Result<RSAPrivateKey, Error> = input.decode();
        assert_eq!(expected, result.unwrap_err().to_string());
    }

    #[test]
    fn test_decode_multi_prime_structure() {
        let mut fields = vec![int(1)];
        fields.extend((0..8).map(|_| int(3)));
        fields.push(Element::Sequence(vec![Element::Sequence(vec![
            int(7),
            int(5),
            int(2),
        ])]));
        let key: RSAPrivateKey = Element::Sequence(fields).decode().unwrap();
        assert_eq!(Version::Multi, key.version);
        assert_eq!(1, key.other_prime_infos.len());
        assert_eq!(Some(7), key.other_prime_infos[0].prime.to_i64());
    }
}

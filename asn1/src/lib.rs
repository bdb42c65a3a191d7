use std::{fmt::Display, str::FromStr};

use codec::decoder::{DecodableFrom, Decoder};
use der::{Der, PrimitiveTag, Tlv};
use error::Error;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

pub mod error;

#[derive(Debug, Clone)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;
    fn decode(&self) -> Result<ASN1Object, Error> {
        let mut elements = Vec::new();
        for tlv in self.elements() {
            let element = Element::try_from(tlv)?;
            elements.push(element);
        }
        Ok(ASN1Object { elements })
    }
}

/// A decoded ASN.1 value.
///
/// Only the universal types that appear in key containers are decoded.
/// Anything else is kept as the raw TLV in `Unimplemented` so callers can
/// skip it without failing the whole structure.
#[derive(Debug, Clone)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    Unimplemented(Tlv),
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.tag() {
            der::Tag::Primitive(primitive_tag, _) => match primitive_tag {
                PrimitiveTag::Boolean => match tlv.data() {
                    Some([0x00]) => Ok(Element::Boolean(false)),
                    Some([0xff]) => Ok(Element::Boolean(true)),
                    _ => Err(Error::InvalidBoolean),
                },
                PrimitiveTag::Integer => match tlv.data() {
                    Some([]) | None => Err(Error::IntegerNoData),
                    // the first nine bits must not be all zeros or all ones
                    Some([0x00, next, ..]) if next & 0x80 == 0 => Err(Error::IntegerNonMinimal),
                    Some([0xff, next, ..]) if next & 0x80 != 0 => Err(Error::IntegerNonMinimal),
                    Some(data) => Ok(Element::Integer(Integer::from(data))),
                },
                PrimitiveTag::BitString => match tlv.data() {
                    Some(data) => Ok(Element::BitString(BitString::try_from(data)?)),
                    None => Err(Error::BitStringNoData),
                },
                PrimitiveTag::OctetString => Ok(Element::OctetString(OctetString::from(
                    tlv.data().unwrap_or_default(),
                ))),
                PrimitiveTag::Null => match tlv.data() {
                    Some([]) => Ok(Element::Null),
                    _ => Err(Error::InvalidNull),
                },
                PrimitiveTag::ObjectIdentifier => match tlv.data() {
                    Some(data) => Ok(Element::ObjectIdentifier(ObjectIdentifier::try_from(
                        data,
                    )?)),
                    None => Err(Error::ObjectIdentifierNoData),
                },
                PrimitiveTag::Sequence => Ok(Element::Sequence(children(tlv)?)),
                PrimitiveTag::Set => Ok(Element::Set(children(tlv)?)),
                _ => Ok(Element::Unimplemented(tlv.clone())),
            },
            der::Tag::ContextSpecific { slot, constructed } => {
                if *constructed {
                    // EXPLICIT tagging wraps exactly one value. Implicitly tagged
                    // constructed types (e.g. [0] IMPLICIT SET OF) may hold any
                    // number, so those are kept as a sequence of the children.
                    let mut elements = children(tlv)?;
                    let element = if elements.len() == 1 {
                        elements.remove(0)
                    } else {
                        Element::Sequence(elements)
                    };
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: true,
                        element: Box::new(element),
                    })
                } else {
                    // IMPLICIT primitive: the upper layer interprets the raw bytes.
                    match tlv.data() {
                        Some(data) => Ok(Element::ContextSpecific {
                            slot: *slot,
                            constructed: false,
                            element: Box::new(Element::OctetString(OctetString::from(data))),
                        }),
                        None => Err(Error::InvalidContextSpecific {
                            slot: *slot,
                            msg: "context-specific primitive has no data".to_string(),
                        }),
                    }
                }
            }
        }
    }
}

fn children(tlv: &Tlv) -> Result<Vec<Element>, Error> {
    tlv.tlvs()
        .unwrap_or_default()
        .iter()
        .map(Element::try_from)
        .collect()
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::BitString(bs) => write!(f, "BitString({} bits)", bs.bit_len()),
            Element::OctetString(os) => write!(f, "OctetString({} bytes)", os.as_bytes().len()),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::Sequence(seq) => write!(f, "Sequence({} elements)", seq.len()),
            Element::Set(set) => write!(f, "Set({} elements)", set.len()),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => write!(
                f,
                "ContextSpecific(slot: {}, constructed: {}, element: {})",
                slot, constructed, element
            ),
            Element::Unimplemented(tlv) => write!(f, "Unimplemented({:?})", tlv.tag()),
        }
    }
}

// ASN.1 INTEGER is a signed, arbitrary sized value in two's complement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    /// Big-endian magnitude without the sign octet, or `None` when negative.
    /// Zero yields a single `0x00` byte.
    pub fn to_unsigned_bytes_be(&self) -> Option<Vec<u8>> {
        self.inner.to_biguint().map(|n| n.to_bytes_be())
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut subidentifiers = Vec::new();
        let mut val = 0u64;
        let mut continued = false;
        for &b in value {
            if !continued && b == 0x80 {
                // leading 0x80 pads a sub-identifier, which DER forbids
                return Err(Error::ObjectIdentifierNonMinimal);
            }
            if val > u64::MAX >> 7 {
                return Err(Error::ObjectIdentifierOverflow);
            }
            val = (val << 7) | u64::from(b & 0x7f);
            continued = b & 0x80 == 0x80;
            if !continued {
                subidentifiers.push(val);
                val = 0;
            }
        }
        if continued {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // The first sub-identifier packs two arcs as X * 40 + Y, and X is
        // capped at 2 so Y is unbounded under joint-iso-itu-t.
        let (&first, rest) = subidentifiers
            .split_first()
            .ok_or(Error::ObjectIdentifierNoData)?;
        let mut inner = match first {
            f if f < 40 => vec![0, f],
            f if f < 80 => vec![1, f - 40],
            f => vec![2, f - 80],
        };
        inner.extend_from_slice(rest);

        Ok(ObjectIdentifier { inner })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('.')
            .map(|s| s.parse::<u64>().map_err(Error::ParseInt))
            .collect::<Result<Vec<u64>, Error>>()?;
        if values.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner: values })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        *self == other.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.split_first() {
            Some((&unused, _)) if unused > 7 => Err(Error::BitStringUnusedBitsOutOfRange(unused)),
            Some((&unused, data)) => Ok(BitString {
                unused,
                data: data.to_vec(),
            }),
            None => Err(Error::BitStringNoData),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

/// Parses the contents of an OCTET STRING that itself carries DER, as the
/// `privateKey` field of a PKCS#8 structure does.
impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self, Self::Error> {
        let der: Der = value.as_bytes().decode().map_err(Error::FailedToDecodeDer)?;
        der.decode()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use codec::decoder::Decoder;
    use der::Der;
    use num_bigint::BigInt;
    use pem::Pem;
    use rstest::rstest;

    use crate::error::Error;
    use crate::{ASN1Object, BitString, Element, Integer, ObjectIdentifier, OctetString};

    fn decode(input: &[u8]) -> Result<ASN1Object, Error> {
        let der: Der = input.decode().map_err(Error::FailedToDecodeDer)?;
        der.decode()
    }

    #[rstest(input, expected,
        case(vec![0x01], "1"),
        case(vec![0x00], "0"),
        case(vec![0xff], "-1"),
        case(vec![0x00, 0x80], "128"),
        case(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09], "333504890676592408951587385614406537514249"),
    )]
    fn test_parse_integer(input: Vec<u8>, expected: &str) {
        let expected = Integer {
            inner: BigInt::from_str(expected).unwrap(),
        };
        assert_eq!(expected, Integer::from(input.as_slice()));
    }

    #[rstest(input, expected,
        case(vec![0x00, 0x80], Some(vec![0x80])),
        case(vec![0x01, 0x00, 0x01], Some(vec![0x01, 0x00, 0x01])),
        case(vec![0x00], Some(vec![0x00])),
        case(vec![0x80], None),
    )]
    fn test_integer_to_unsigned_bytes(input: Vec<u8>, expected: Option<Vec<u8>>) {
        assert_eq!(expected, Integer::from(input.as_slice()).to_unsigned_bytes_be());
    }

    #[rstest(input, expected,
        case(vec![0x2A], vec![1, 2]),
        case(vec![0x2B, 0x06, 0x01, 0x04, 0x01], vec![1, 3, 6, 1, 4, 1]),
        case(vec![0x09, 0x92, 0x26, 0x89, 0x93, 0xf2, 0x2c, 0x64, 0x01, 0x01], vec![0, 9, 2342, 19200300, 100, 1, 1]),
        case(vec![0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x05, 0x0D], vec![1, 2, 840, 113549, 1, 5, 13]),
        case(vec![0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x01, 0x2A], vec![2, 16, 840, 1, 101, 3, 4, 1, 42]),
        // 2.999.3 puts a multi-byte value in the first sub-identifier
        case(vec![0x88, 0x37, 0x03], vec![2, 999, 3]),
    )]
    fn test_object_identifier_from_bytes(input: Vec<u8>, expected: Vec<u64>) {
        let actual = ObjectIdentifier::try_from(input.as_slice()).unwrap();
        assert_eq!(expected, actual.arcs());
    }

    #[rstest(input, expected,
        case(vec![], Error::ObjectIdentifierNoData),
        case(vec![0x2A, 0x86], Error::ObjectIdentifierIncompleteEncoding),
        case(vec![0x2A, 0x80, 0x01], Error::ObjectIdentifierNonMinimal),
        case(vec![0x2A, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f], Error::ObjectIdentifierOverflow),
    )]
    fn test_object_identifier_from_bytes_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), ObjectIdentifier::try_from(input.as_slice()));
    }

    #[rstest(input,
        case("1.2.840.113549.1.5.13"),
        case("2.16.840.1.101.3.4.1.2"),
    )]
    fn test_object_identifier_string(input: &str) {
        let oid = ObjectIdentifier::from_str(input).unwrap();
        assert_eq!(input, oid.to_string());
        assert!(oid == input);
        assert!(input == oid);
    }

    #[rstest(input, expected,
        case("1", Error::ObjectIdentifierTooFewComponents),
        case("1.x.3", Error::ParseInt("x".parse::<u64>().unwrap_err())),
    )]
    fn test_object_identifier_from_string_error(input: &str, expected: Error) {
        assert_eq!(Err(expected), ObjectIdentifier::from_str(input));
    }

    #[rstest(input, expected,
        case(vec![0x00, 0xaa], Ok(BitString { unused: 0, data: vec![0xaa] })),
        case(vec![0x04, 0xa0], Ok(BitString { unused: 4, data: vec![0xa0] })),
        case(vec![0x08, 0xa0], Err(Error::BitStringUnusedBitsOutOfRange(8))),
        case(vec![], Err(Error::BitStringNoData)),
    )]
    fn test_bitstring_from_bytes(input: Vec<u8>, expected: Result<BitString, Error>) {
        assert_eq!(expected, BitString::try_from(input.as_slice()));
    }

    #[test]
    fn test_decode_sequence() {
        // SEQUENCE { INTEGER 0, SEQUENCE { OID 1.2.840.113549.1.1.1, NULL }, OCTET STRING 0x0102 }
        let input = vec![
            0x30, 0x16, 0x02, 0x01, 0x00, 0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7,
            0x0d, 0x01, 0x01, 0x01, 0x05, 0x00, 0x04, 0x02, 0x01, 0x02,
        ];
        let obj = decode(&input).unwrap();
        let Some(Element::Sequence(seq)) = obj.elements().first() else {
            panic!("expected sequence");
        };
        assert_eq!(3, seq.len());
        assert!(matches!(&seq[0], Element::Integer(i) if i.to_u32() == Some(0)));
        let Element::Sequence(alg) = &seq[1] else {
            panic!("expected algorithm identifier");
        };
        assert!(
            matches!(&alg[0], Element::ObjectIdentifier(oid) if *oid == "1.2.840.113549.1.1.1")
        );
        assert!(matches!(&alg[1], Element::Null));
        assert!(matches!(&seq[2], Element::OctetString(os) if os.as_bytes() == [0x01, 0x02]));
    }

    #[rstest(input, expected_slot, expected_constructed,
        // [0] EXPLICIT INTEGER 5
        case(vec![0xa0, 0x03, 0x02, 0x01, 0x05], 0, true),
        // [1] IMPLICIT primitive
        case(vec![0x81, 0x02, 0x00, 0xff], 1, false),
        // [0] IMPLICIT SET OF with no members
        case(vec![0xa0, 0x00], 0, true),
    )]
    fn test_decode_context_specific(input: Vec<u8>, expected_slot: u8, expected_constructed: bool) {
        let obj = decode(&input).unwrap();
        let Some(Element::ContextSpecific {
            slot, constructed, ..
        }) = obj.elements().first()
        else {
            panic!("expected context-specific element");
        };
        assert_eq!(expected_slot, *slot);
        assert_eq!(expected_constructed, *constructed);
    }

    #[rstest(input, expected,
        case(vec![0x01, 0x01, 0x01], Error::InvalidBoolean),
        case(vec![0x01, 0x02, 0xff, 0xff], Error::InvalidBoolean),
        case(vec![0x02, 0x00], Error::IntegerNoData),
        case(vec![0x02, 0x02, 0x00, 0x7f], Error::IntegerNonMinimal),
        case(vec![0x02, 0x02, 0x00, 0x00], Error::IntegerNonMinimal),
        case(vec![0x02, 0x02, 0xff, 0x80], Error::IntegerNonMinimal),
        case(vec![0x02, 0x03, 0xff, 0xff, 0x01], Error::IntegerNonMinimal),
        case(vec![0x05, 0x01, 0x00], Error::InvalidNull),
        case(vec![0x06, 0x00], Error::ObjectIdentifierNoData),
        case(vec![0x30, 0x02, 0x02, 0x00], Error::IntegerNoData),
    )]
    fn test_decode_element_error(input: Vec<u8>, expected: Error) {
        let err = decode(&input).unwrap_err();
        assert_eq!(expected, err);
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x00], 0),
        case(vec![0x02, 0x01, 0xff], -1),
        case(vec![0x02, 0x02, 0x00, 0x80], 128),
        case(vec![0x02, 0x02, 0xff, 0x7f], -129),
    )]
    fn test_decode_minimal_integer(input: Vec<u8>, expected: i64) {
        let obj = decode(&input).unwrap();
        assert!(matches!(&obj.elements()[0], Element::Integer(i) if i.to_i64() == Some(expected)));
    }

    #[test]
    fn test_decode_unimplemented_tag_is_kept() {
        // SEQUENCE { UTF8String "a" }
        let obj = decode(&[0x30, 0x03, 0x0c, 0x01, 0x61]).unwrap();
        let Some(Element::Sequence(seq)) = obj.elements().first() else {
            panic!("expected sequence");
        };
        assert!(matches!(&seq[0], Element::Unimplemented(_)));
    }

    #[test]
    fn test_octet_string_into_object() {
        let os = OctetString::from(vec![0x02, 0x01, 0x07]);
        let obj = ASN1Object::try_from(&os).unwrap();
        assert!(matches!(&obj.elements()[0], Element::Integer(i) if i.to_i64() == Some(7)));

        let broken = OctetString::from(vec![0x02, 0x05, 0x07]);
        assert!(matches!(
            ASN1Object::try_from(&broken),
            Err(Error::FailedToDecodeDer(_))
        ));
    }

    #[test]
    fn test_decode_private_key_pem() {
        let input = include_str!("../../poptoken/tests/testdata/plain.pem");
        let pem: Pem = input.parse().unwrap();
        let der: Der = pem.decode().unwrap();
        let obj: ASN1Object = der.decode().unwrap();
        let Some(Element::Sequence(seq)) = obj.elements().first() else {
            panic!("expected sequence");
        };
        let Element::OctetString(key) = &seq[2] else {
            panic!("expected private key octets");
        };
        let inner = ASN1Object::try_from(key).unwrap();
        assert!(matches!(&inner.elements()[0], Element::Sequence(fields) if fields.len() == 9));
    }
}

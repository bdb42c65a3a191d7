use codec::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser, error::ErrorKind};
use pem::Pem;

pub mod error;

use error::Error;

pub const TAG_CONSTRUCTED: u8 = 0x20;
const TAG_CLASS_MASK: u8 = 0xc0;
const TAG_CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
const TAG_NUMBER_MASK: u8 = 0x1f;

// Eight length octets already cover every length a u64 can hold.
const MAX_LENGTH_OCTETS: u8 = 8;

/// Maximum nesting of constructed values accepted by the parser.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Sequence,
    Set,
    Unimplemented(u8),
}

impl From<u8> for PrimitiveTag {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x30 => Self::Sequence,
            0x31 => Self::Set,
            _ => Self::Unimplemented(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Universal, application and private class tags, with the raw identifier octet.
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        if value & TAG_CLASS_MASK == TAG_CLASS_CONTEXT_SPECIFIC {
            return Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed: value & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            };
        }
        Tag::Primitive(PrimitiveTag::from(value), value)
    }
}

impl Tag {
    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            Tag::ContextSpecific { constructed, .. } => *constructed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tlv {
    tag: Tag,
    length: u64,
    value: Value,
}

#[derive(Debug, Clone)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    fn parse(input: &[u8]) -> IResult<&[u8], Tlv> {
        Self::parse_nested(input, 0)
    }

    fn parse_nested(input: &[u8], depth: usize) -> IResult<&[u8], Tlv> {
        if depth > MAX_DEPTH {
            return Err(failure(input, ErrorKind::TooLarge));
        }
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let size = usize::try_from(length).map_err(|_| failure(input, ErrorKind::TooLarge))?;
        let (input, data) = nom::bytes::complete::take(size).parse(input)?;

        if tag.is_constructed() {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (rest, v) = Self::parse_nested(data, depth + 1)?;
                data = rest;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    length,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                length,
                value: Value::Data(data.to_vec()),
            },
        ))
    }
}

fn failure(input: &[u8], kind: ErrorKind) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Failure(nom::error::Error::new(input, kind))
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (rest, n) = nom::number::complete::be_u8(input)?;
    if n & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        // high-tag-number form never appears in key containers
        return Err(failure(input, ErrorKind::Tag));
    }
    Ok((rest, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], u64> {
    let (rest, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let octets = n & 0x7f;
        if octets == 0 {
            // indefinite length is BER only
            return Err(failure(input, ErrorKind::LengthValue));
        }
        if octets > MAX_LENGTH_OCTETS {
            return Err(failure(input, ErrorKind::TooLarge));
        }
        let (rest, bs) = nom::bytes::complete::take(octets).parse(rest)?;
        if bs.first() == Some(&0) {
            // DER lengths use the fewest octets possible
            return Err(failure(input, ErrorKind::LengthValue));
        }
        let n = bs.iter().fold(0u64, |n, &b| (n << 8) | b as u64);
        if n < 0x80 {
            return Err(failure(input, ErrorKind::LengthValue));
        }
        return Ok((rest, n));
    }
    // short form: 0-127
    Ok((rest, n as u64))
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let mut input: &[u8] = self;
        let mut elements = Vec::new();
        while !input.is_empty() {
            let (rest, tlv) = Tlv::parse(input)?;
            input = rest;
            elements.push(tlv);
        }
        Ok(Der { elements })
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        self.as_slice().decode()
    }
}

impl DecodableFrom<Pem> for Der {}

impl Decoder<Pem, Der> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        let bytes = Decoder::<Pem, Vec<u8>>::decode(self).map_err(Error::Pem)?;
        bytes.decode()
    }
}

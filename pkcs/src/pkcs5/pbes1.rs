use asn1::Element;
use md5::Md5;
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use super::{Error, Result, cbc_decrypt, iteration_count, octet_string};

/*
RFC 8018 Appendix A.3

PBEParameter ::= SEQUENCE {
    salt           OCTET STRING (SIZE(8)),
    iterationCount INTEGER
}
*/

const SALT_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pbes1Digest {
    Md5,
    Sha1,
}

#[derive(Debug, Clone)]
pub struct Pbes1Params {
    pub digest: Pbes1Digest,
    pub salt: [u8; SALT_LENGTH],
    pub iterations: u32,
}

impl Pbes1Params {
    pub fn new(digest: Pbes1Digest, element: &Element) -> Result<Self> {
        let Element::Sequence(elements) = element else {
            return Err(Error::InvalidParameters("PBEParameter must be a SEQUENCE"));
        };
        let [salt, iterations] = elements.as_slice() else {
            return Err(Error::InvalidParameters("PBEParameter must have 2 elements"));
        };
        let salt = octet_string(salt, "PBEParameter salt")?;
        let salt: [u8; SALT_LENGTH] = salt.try_into().map_err(|_| Error::InvalidSaltLength {
            expected: SALT_LENGTH,
            actual: salt.len(),
        })?;
        let iterations = iteration_count(iterations)?;

        Ok(Pbes1Params {
            digest,
            salt,
            iterations,
        })
    }

    pub fn decrypt(&self, password: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let derived = match self.digest {
            Pbes1Digest::Md5 => pbkdf1::<Md5>(password, &self.salt, self.iterations),
            Pbes1Digest::Sha1 => pbkdf1::<Sha1>(password, &self.salt, self.iterations),
        };
        // DK = key (8 octets) || IV (8 octets)
        let (key, iv) = derived.split_at(8);
        cbc_decrypt::<des::Des>(key, iv, ciphertext)
    }
}

/// PBKDF1 ([RFC 8018 Section 5.1](https://datatracker.ietf.org/doc/html/rfc8018#section-5.1))
/// with the 16-octet output PBES1 needs.
fn pbkdf1<D: Digest>(password: &[u8], salt: &[u8], iterations: u32) -> Zeroizing<Vec<u8>> {
    let mut t = D::new().chain_update(password).chain_update(salt).finalize();
    for _ in 1..iterations {
        t = D::digest(&t);
    }
    Zeroizing::new(t[..16].to_vec())
}

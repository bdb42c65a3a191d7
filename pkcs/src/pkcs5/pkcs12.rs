use asn1::Element;
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use super::{Error, Result, cbc_decrypt, iteration_count, octet_string};

/*
RFC 7292 Appendix C

pkcs-12PbeParams ::= SEQUENCE {
    salt        OCTET STRING,
    iterations  INTEGER
}
*/

// SHA-1 output and block sizes in bytes.
const U: usize = 20;
const V: usize = 64;

const KEY_MATERIAL: u8 = 1;
const IV_MATERIAL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pkcs12Cipher {
    /// pbeWithSHAAnd3-KeyTripleDES-CBC
    DesEde3Cbc,
    /// pbeWithSHAAnd2-KeyTripleDES-CBC
    DesEde2Cbc,
}

impl Pkcs12Cipher {
    fn key_size(self) -> usize {
        match self {
            Pkcs12Cipher::DesEde3Cbc => 24,
            Pkcs12Cipher::DesEde2Cbc => 16,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pkcs12PbeParams {
    pub cipher: Pkcs12Cipher,
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl Pkcs12PbeParams {
    pub fn new(cipher: Pkcs12Cipher, element: &Element) -> Result<Self> {
        let Element::Sequence(elements) = element else {
            return Err(Error::InvalidParameters("pkcs-12PbeParams must be a SEQUENCE"));
        };
        let [salt, iterations] = elements.as_slice() else {
            return Err(Error::InvalidParameters("pkcs-12PbeParams must have 2 elements"));
        };

        Ok(Pkcs12PbeParams {
            cipher,
            salt: octet_string(salt, "pkcs-12PbeParams salt")?.to_vec(),
            iterations: iteration_count(iterations)?,
        })
    }

    pub fn decrypt(&self, password: &str, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let password = bmp_password(password);
        let key = derive(
            &password,
            &self.salt,
            KEY_MATERIAL,
            self.iterations,
            self.cipher.key_size(),
        );
        let iv = derive(&password, &self.salt, IV_MATERIAL, self.iterations, 8);
        match self.cipher {
            Pkcs12Cipher::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(&key, &iv, ciphertext),
            Pkcs12Cipher::DesEde2Cbc => cbc_decrypt::<des::TdesEde2>(&key, &iv, ciphertext),
        }
    }
}

/// BMPString encoding with the two-byte NUL terminator.
fn bmp_password(password: &str) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::with_capacity(password.len() * 2 + 2));
    for unit in password.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Concatenates copies of `data` up to the next multiple of `V` bytes.
fn fill_blocks(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }
    let len = V * data.len().div_ceil(V);
    data.iter().cycle().take(len).copied().collect()
}

/// Key derivation from [RFC 7292 Appendix B.2](https://datatracker.ietf.org/doc/html/rfc7292#appendix-B.2).
fn derive(password: &[u8], salt: &[u8], id: u8, iterations: u32, n: usize) -> Zeroizing<Vec<u8>> {
    let diversifier = [id; V];
    let mut input = Zeroizing::new(fill_blocks(salt));
    input.extend_from_slice(&Zeroizing::new(fill_blocks(password)));

    let mut out = Zeroizing::new(Vec::with_capacity(n));
    loop {
        let mut a = Sha1::new()
            .chain_update(diversifier)
            .chain_update(input.as_slice())
            .finalize();
        for _ in 1..iterations {
            a = Sha1::digest(a);
        }
        let take = U.min(n - out.len());
        out.extend_from_slice(&a[..take]);
        if out.len() == n {
            return out;
        }

        // I_j = (I_j + B + 1) mod 2^(8v), with B = A repeated to v bytes
        let b: Vec<u8> = a.iter().cycle().take(V).copied().collect();
        for block in input.chunks_mut(V) {
            let mut carry = 1u16;
            for (x, y) in block.iter_mut().rev().zip(b.iter().rev()) {
                let sum = u16::from(*x) + u16::from(*y) + carry;
                *x = sum as u8;
                carry = sum >> 8;
            }
        }
    }
}

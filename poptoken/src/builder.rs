//! PoP token assembly.
//!
//! A PoP token is a compact RS256 JWS whose claims bind a set of request
//! values (EHTS) to the signer:
//!
//! ```text
//! header  {"alg":"RS256","typ":"JWT"}
//! claims  {"iat":..,"exp":..,"ehts":"k1;k2","edts":"<sha256(v1 v2)>","jti":"<uuid>","v":"1"}
//! token   base64url(header) "." base64url(claims) "." base64url(signature)
//! ```

use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use log::debug;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::key::{encrypted_key_pem_string_to_private_key, key_pem_string_to_private_key};

/// Maximum number of EHTS entries in one token.
pub const MAX_EHTS_ENTRIES: usize = 100;

/// Token lifetime when none is configured.
pub const DEFAULT_LIFETIME_SECONDS: i64 = 120;

const EHTS_DELIMITER: &str = ";";
const POP_TOKEN_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub alg: String,
    pub typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Header {
            alg: "RS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// PoP token claims
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    /// EHTS keys joined by `;`
    pub ehts: String,
    /// base64url SHA-256 of the EHTS values, concatenated in key order
    pub edts: String,
    pub jti: String,
    pub v: String,
}

enum KeySource {
    Key(RsaPrivateKey),
    Pem(String),
    EncryptedPem {
        pem: String,
        password: Zeroizing<String>,
    },
}

/// Builds PoP tokens.
///
/// ```no_run
/// use poptoken::PopTokenBuilder;
///
/// # fn run(pem: &str) -> poptoken::Result<()> {
/// let token = PopTokenBuilder::new()
///     .ehts("Content-Type", "application/json")
///     .ehts("uri", "/commerce/v1/orders")
///     .ehts("http-method", "POST")
///     .private_key_pem(pem)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PopTokenBuilder {
    ehts: Vec<(String, String)>,
    key: Option<KeySource>,
    lifetime_seconds: i64,
    issued_at: Option<DateTime<Utc>>,
}

impl Default for PopTokenBuilder {
    fn default() -> Self {
        PopTokenBuilder {
            ehts: Vec::new(),
            key: None,
            lifetime_seconds: DEFAULT_LIFETIME_SECONDS,
            issued_at: None,
        }
    }
}

impl PopTokenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one EHTS entry. Entries keep insertion order.
    pub fn ehts(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ehts.push((key.into(), value.into()));
        self
    }

    pub fn ehts_entries<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.ehts
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn signing_key(mut self, key: RsaPrivateKey) -> Self {
        self.key = Some(KeySource::Key(key));
        self
    }

    /// Plain PKCS#8 PEM, resolved at [`build`](Self::build) time.
    pub fn private_key_pem(mut self, pem: &str) -> Self {
        self.key = Some(KeySource::Pem(pem.to_string()));
        self
    }

    /// Encrypted PKCS#8 PEM and its password, resolved at [`build`](Self::build) time.
    pub fn encrypted_private_key_pem(mut self, pem: &str, password: &str) -> Self {
        self.key = Some(KeySource::EncryptedPem {
            pem: pem.to_string(),
            password: Zeroizing::new(password.to_string()),
        });
        self
    }

    pub fn lifetime_seconds(mut self, seconds: i64) -> Self {
        self.lifetime_seconds = seconds;
        self
    }

    /// Fixes `iat` instead of reading the clock.
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.ehts.is_empty() {
            return Err(Error::InvalidArgument(
                "The ehtsKeyValueMap should not be null or empty",
            ));
        }
        if self.ehts.len() > MAX_EHTS_ENTRIES {
            return Err(Error::InvalidArgument(
                "The ehtsKeyValueMap should not contain more than 100 entries",
            ));
        }
        let mut seen = HashSet::with_capacity(self.ehts.len());
        for (key, _) in &self.ehts {
            if key.trim().is_empty() {
                return Err(Error::InvalidArgument(
                    "The ehtsKeyValueMap should not contain any null or empty ehts keys",
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(Error::InvalidArgument(
                    "The ehtsKeyValueMap should not contain duplicate ehts keys",
                ));
            }
        }
        if self.lifetime_seconds <= 0 {
            return Err(Error::InvalidArgument(
                "The popTokenLifetime should be a positive number of seconds",
            ));
        }
        Ok(())
    }

    fn claims(&self) -> Result<Claims> {
        let iat = self.issued_at.unwrap_or_else(Utc::now).timestamp();
        let exp = iat
            .checked_add(self.lifetime_seconds)
            .ok_or(Error::InvalidArgument(
                "The popTokenLifetime should not overflow the token expiration time",
            ))?;
        let ehts = self
            .ehts
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(EHTS_DELIMITER);
        let edts = self
            .ehts
            .iter()
            .fold(Sha256::new(), |hasher, (_, v)| hasher.chain_update(v.as_bytes()))
            .finalize();

        Ok(Claims {
            iat,
            exp,
            ehts,
            edts: URL_SAFE_NO_PAD.encode(edts),
            jti: Uuid::new_v4().to_string(),
            v: POP_TOKEN_VERSION.to_string(),
        })
    }

    fn resolve_key(self) -> Result<RsaPrivateKey> {
        match self.key {
            Some(KeySource::Key(key)) => Ok(key),
            Some(KeySource::Pem(pem)) => key_pem_string_to_private_key(&pem),
            Some(KeySource::EncryptedPem { pem, password }) => {
                encrypted_key_pem_string_to_private_key(&pem, &password)
            }
            None => Err(Error::InvalidArgument(
                "Either rsaPrivateKey or privateKeyPemString should be provided to sign the PoP token",
            )),
        }
    }

    /// Validates the inputs, resolves the signing key and returns the
    /// serialized token.
    pub fn build(self) -> Result<String> {
        self.validate()?;
        let claims = self.claims()?;
        let key = self.resolve_key()?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::default())?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signing_key = SigningKey::<Sha256>::new(key);
        let signature = signing_key.try_sign(signing_input.as_bytes())?;
        debug!("built PoP token jti={} ehts={}", claims.jti, claims.ehts);

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }
}

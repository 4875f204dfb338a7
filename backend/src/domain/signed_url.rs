//! Time-limited links to uploaded files.
//!
//! A link carries `expires` (unix seconds) and a hex SHA-256 digest of the
//! server secret, the file path and the expiry. Anyone holding the link can
//! fetch the file until it expires; changing any part invalidates it.

use std::time::Duration;

use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    Expired,
    Mismatch,
}

#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    public_url: String,
    ttl: Duration,
}

impl UrlSigner {
    pub fn new(secret: impl Into<Vec<u8>>, public_url: &str, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
            ttl,
        }
    }

    pub fn signature(&self, path: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update([0u8]);
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update(expires.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Absolute URL for `path`, valid for the signer's ttl from `now` (unix seconds)
    pub fn signed_url(&self, path: &str, now: i64) -> String {
        let expires = now + self.ttl.as_secs() as i64;
        format!(
            "{}/api/files/{}?expires={}&signature={}",
            self.public_url,
            path,
            expires,
            self.signature(path, expires)
        )
    }

    pub fn verify(&self, path: &str, expires: i64, signature: &str, now: i64) -> Result<(), SignatureError> {
        let expected = self.signature(path, expires);
        if !constant_time_eq(expected.as_bytes(), signature.to_ascii_lowercase().as_bytes()) {
            return Err(SignatureError::Mismatch);
        }
        if now > expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

pub const PROXY_KEY_HEADER: &str = "x-proxy-key";

// Shared client secret. Only its SHA-256 digest is kept in memory, so the
// comparison always runs over two fixed-length values.
#[derive(Clone)]
pub struct SharedSecret {
    digest: Option<[u8; 32]>,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl SharedSecret {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            digest: secret.map(digest),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    // A missing or empty key never matches, nor does anything when no
    // secret is configured.
    pub fn verify(&self, supplied: Option<&str>) -> bool {
        let (Some(expected), Some(supplied)) = (self.digest.as_ref(), supplied) else {
            return false;
        };
        if supplied.is_empty() {
            return false;
        }

        let actual = digest(supplied);
        expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        let supplied = headers
            .get(PROXY_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        self.verify(supplied)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("configured", &self.is_configured())
            .finish()
    }
}

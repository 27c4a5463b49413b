//! PKCE (RFC 7636) code verifiers and challenges.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceMethod {
    S256,
    Plain,
}

impl PkceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PkceMethod::S256 => "S256",
            PkceMethod::Plain => "plain",
        }
    }
}

/// PKCE code challenge and verifier
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    pub method: PkceMethod,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge
    pub fn new(method: PkceMethod) -> Self {
        let code_verifier = Self::generate_code_verifier();
        let code_challenge = Self::challenge_for(&code_verifier, method);

        Self {
            code_verifier,
            code_challenge,
            method,
        }
    }

    fn generate_code_verifier() -> String {
        let mut rng = thread_rng();
        let bytes: Vec<u8> = (0..64).map(|_| rng.r#gen::<u8>()).collect();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn challenge_for(verifier: &str, method: PkceMethod) -> String {
        match method {
            PkceMethod::Plain => verifier.to_string(),
            PkceMethod::S256 => {
                let mut hasher = Sha256::new();
                hasher.update(verifier.as_bytes());
                URL_SAFE_NO_PAD.encode(hasher.finalize())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s256_challenge() {
        let pkce1 = PkceChallenge::new(PkceMethod::S256);
        let pkce2 = PkceChallenge::new(PkceMethod::S256);

        assert_ne!(pkce1.code_verifier, pkce2.code_verifier);
        assert_ne!(pkce1.code_challenge, pkce2.code_challenge);
        assert_eq!(pkce1.method.as_str(), "S256");

        let mut hasher = Sha256::new();
        hasher.update(pkce1.code_verifier.as_bytes());
        assert_eq!(pkce1.code_challenge, URL_SAFE_NO_PAD.encode(hasher.finalize()));

        // Verifier length must stay within 43-128 chars
        assert!(pkce1.code_verifier.len() >= 43);
        assert!(pkce1.code_verifier.len() <= 128);
    }

    #[test]
    fn test_plain_challenge_echoes_verifier() {
        let pkce = PkceChallenge::new(PkceMethod::Plain);
        assert_eq!(pkce.code_challenge, pkce.code_verifier);
        assert_eq!(pkce.method.as_str(), "plain");
    }
}

//! PKCE (RFC 7636) verifier/challenge pairs and the OAuth `state` value

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

const VERIFIER_LEN: usize = 64;
const STATE_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct PkceParams {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl PkceParams {
    /// Random verifier with its S256 challenge: BASE64URL(SHA256(verifier))
    pub fn generate() -> Self {
        Self::from_verifier(random_alphanumeric(VERIFIER_LEN))
    }

    pub fn from_verifier(code_verifier: String) -> Self {
        let hash = Sha256::digest(code_verifier.as_bytes());
        let code_challenge = URL_SAFE_NO_PAD.encode(hash);

        PkceParams {
            code_verifier,
            code_challenge,
        }
    }
}

/// Random `state` parameter for CSRF protection
pub fn generate_state() -> String {
    random_alphanumeric(STATE_LEN)
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

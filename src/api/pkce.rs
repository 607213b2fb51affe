// Minimal PKCE helper for S256 challenge
use base64::{engine::general_purpose, Engine as _};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 64-character code verifier (letters + digits) from the thread CSPRNG.
pub fn generate_code_verifier() -> String {
    random_alphanumeric(64)
}

/// 16-character state nonce guarding the redirect against CSRF.
pub fn generate_state() -> String {
    random_alphanumeric(16)
}

pub fn code_challenge_s256(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

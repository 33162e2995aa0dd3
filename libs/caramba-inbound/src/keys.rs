//! Credential and key material generation.
//!
//! Everything takes the RNG as a parameter so a caller can pin the output
//! (tests, reproducible exports). The facade passes `rand::rng()`.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::Rng;
use rand::distr::Alphanumeric;
use x25519_dalek::{PublicKey, StaticSecret};

pub const GENERATED_PASSWORD_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealityKeypair {
    pub private_key: String,
    pub public_key: String,
}

pub fn generate_uuid<R: Rng>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.random::<[u8; 16]>())
        .into_uuid()
        .to_string()
}

pub fn generate_password<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

pub fn generate_short_id<R: Rng>(rng: &mut R) -> String {
    hex::encode(rng.random::<[u8; 8]>())
}

pub fn generate_reality_keypair<R: Rng>(rng: &mut R) -> RealityKeypair {
    reality_keypair_from_private(rng.random::<[u8; 32]>())
}

/// Encodes with URL_SAFE_NO_PAD, which is what sing-box 1.12+ and Xray
/// both accept.
pub fn reality_keypair_from_private(bytes: [u8; 32]) -> RealityKeypair {
    let secret = StaticSecret::from(bytes);
    let public = PublicKey::from(&secret);
    RealityKeypair {
        private_key: URL_SAFE_NO_PAD.encode(secret.to_bytes()),
        public_key: URL_SAFE_NO_PAD.encode(public.as_bytes()),
    }
}

/// Decodes a 32-byte x25519 key written in either base64 alphabet, padded
/// or not.
pub fn decode_key(raw: &str) -> Option<[u8; 32]> {
    let normalized = raw
        .trim()
        .replace('+', "-")
        .replace('/', "_")
        .replace('=', "");
    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
    bytes.try_into().ok()
}

pub fn encode_key(bytes: &[u8; 32]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn generate_psk<R: Rng>(rng: &mut R, len: usize) -> String {
    let bytes: Vec<u8> = (0..len).map(|_| rng.random::<u8>()).collect();
    STANDARD.encode(bytes)
}

pub fn decode_psk(raw: &str) -> Option<Vec<u8>> {
    STANDARD.decode(raw.trim()).ok()
}

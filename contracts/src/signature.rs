//! Detached signature checks for privileged lifecycle requests.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Ed25519 public key length in bytes
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// Ed25519 signature length in bytes
pub const SIGNATURE_LENGTH: usize = 64;

/// Pure signature check capability
pub trait SignatureVerifier {
    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

/// Ed25519 over the raw payload bytes
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(key_bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(public_key) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        key.verify(payload, &Signature::from_bytes(&sig_bytes)).is_ok()
    }
}

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Digest a room key for at-rest storage. Only the digest is ever kept;
/// the plaintext lives on the caller's stack and is dropped with it.
pub fn digest_key(key: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(key.as_bytes()));
    digest
}

/// Compare a submitted key against a stored digest in constant time.
pub fn verify_key(submitted: &str, stored: &[u8; 32]) -> bool {
    digest_key(submitted)[..].ct_eq(&stored[..]).into()
}

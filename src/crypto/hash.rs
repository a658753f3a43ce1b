// Cryptographic Hashing Wrappers
use sha2::{Digest, Sha256};

/// SHA-256: used for Proof of Work over the 224-byte block header
pub fn hash_sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

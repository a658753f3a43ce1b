// Mining loop: fill the candidate header → iterate nonces from zero until
// the hash satisfies the difficulty predicate.

use crate::config::{HASH_BYTES, PAYLOAD_BYTES};
use crate::crypto::hash::hash_sha256;
use crate::primitives::block::{BlockHeader, MinedBlock};

/// Fixed difficulty: the hash must begin with a zero byte.
pub fn meets_difficulty(hash: &[u8; HASH_BYTES]) -> bool {
    hash[0] == 0
}

/// SHA-256 over the 224-byte header.
pub fn block_hash(header: &BlockHeader) -> [u8; HASH_BYTES] {
    hash_sha256(&header.header_bytes())
}

/// Iterate nonces starting at zero; the first satisfying hash wins.
/// Expected ~256 attempts per block at this difficulty.
pub fn mine(mut header: BlockHeader) -> MinedBlock {
    header.nonce = 0;
    loop {
        let hash = block_hash(&header);
        if meets_difficulty(&hash) {
            return MinedBlock { header, hash };
        }
        header.nonce = header.nonce.wrapping_add(1);
    }
}

/// Block 1: zeroed previous hash, caller-supplied payload.
pub fn create_genesis(payload: [u8; PAYLOAD_BYTES]) -> MinedBlock {
    mine(BlockHeader {
        number: 1,
        nonce: 0,
        payload,
        prev_hash: [0u8; HASH_BYTES],
    })
}

/// Successor of `prev`, chained by hash.
pub fn create_next(prev: &MinedBlock, payload: [u8; PAYLOAD_BYTES]) -> MinedBlock {
    mine(BlockHeader {
        number: prev.header.number + 1,
        nonce: 0,
        payload,
        prev_hash: prev.hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MINER_BYTE;

    fn payload_with_miner(miner: u8) -> [u8; PAYLOAD_BYTES] {
        let mut p = [0u8; PAYLOAD_BYTES];
        p[MINER_BYTE] = miner;
        p
    }

    #[test]
    fn test_mined_genesis_meets_difficulty() {
        let genesis = create_genesis(payload_with_miner(7));
        assert_eq!(genesis.header.number, 1);
        assert_eq!(genesis.header.prev_hash, [0u8; HASH_BYTES]);
        assert!(meets_difficulty(&genesis.hash));
        assert_eq!(genesis.hash, block_hash(&genesis.header));
    }

    #[test]
    fn test_blocks_chain_by_hash() {
        let genesis = create_genesis(payload_with_miner(7));
        let next = create_next(&genesis, payload_with_miner(9));
        assert_eq!(next.header.number, 2);
        assert_eq!(next.header.prev_hash, genesis.hash);
        assert!(meets_difficulty(&next.hash));
    }

    #[test]
    fn test_mining_is_deterministic() {
        // nonce search starts at zero, so identical headers mine identically
        let a = create_genesis(payload_with_miner(3));
        let b = create_genesis(payload_with_miner(3));
        assert_eq!(a, b);
    }
}

// Data Structures: Block
use crate::config::{HASH_BYTES, MINER_BYTE, PAYLOAD_BYTES, RECORD_BYTES};

/// Bytes hashed by the miner: number | nonce | payload | prev_hash
pub const HEADER_BYTES: usize = 224;

/// A candidate block before mining: exactly the bytes the difficulty
/// predicate is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u32,
    pub nonce: u32,
    pub payload: [u8; PAYLOAD_BYTES],
    pub prev_hash: [u8; HASH_BYTES],
}

impl BlockHeader {
    pub fn header_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut buf = [0u8; HEADER_BYTES];
        buf[0..4].copy_from_slice(&self.number.to_le_bytes());
        buf[4..8].copy_from_slice(&self.nonce.to_le_bytes());
        buf[8..192].copy_from_slice(&self.payload);
        buf[192..224].copy_from_slice(&self.prev_hash);
        buf
    }

    /// Byte 183 of the payload names the miner, genesis included.
    pub fn miner_address(&self) -> u8 {
        self.payload[MINER_BYTE]
    }
}

/// A block whose nonce satisfied the difficulty predicate, plus the hash
/// that satisfied it. Never mutated after mining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedBlock {
    pub header: BlockHeader,
    pub hash: [u8; HASH_BYTES],
}

impl MinedBlock {
    /// Fixed 256-byte on-disk record, little-endian scalars:
    ///   [0..4]     number
    ///   [4..8]     nonce
    ///   [8..192]   payload
    ///   [192..224] prev_hash
    ///   [224..256] hash
    /// This layout is byte-stable: the log file is read back by `open`.
    pub fn to_bytes(&self) -> [u8; RECORD_BYTES] {
        let mut b = [0u8; RECORD_BYTES];
        b[0..4].copy_from_slice(&self.header.number.to_le_bytes());
        b[4..8].copy_from_slice(&self.header.nonce.to_le_bytes());
        b[8..192].copy_from_slice(&self.header.payload);
        b[192..224].copy_from_slice(&self.header.prev_hash);
        b[224..256].copy_from_slice(&self.hash);
        b
    }

    pub fn from_bytes(d: &[u8; RECORD_BYTES]) -> Self {
        let mut payload = [0u8; PAYLOAD_BYTES];
        payload.copy_from_slice(&d[8..192]);
        let mut prev_hash = [0u8; HASH_BYTES];
        prev_hash.copy_from_slice(&d[192..224]);
        let mut hash = [0u8; HASH_BYTES];
        hash.copy_from_slice(&d[224..256]);

        MinedBlock {
            header: BlockHeader {
                number: u32::from_le_bytes(d[0..4].try_into().unwrap()),
                nonce: u32::from_le_bytes(d[4..8].try_into().unwrap()),
                payload,
                prev_hash,
            },
            hash,
        }
    }
}

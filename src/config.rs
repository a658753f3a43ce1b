/// On-disk record geometry, bytes
pub const PAYLOAD_BYTES: usize = 184;
pub const HASH_BYTES: usize = 32;
pub const RECORD_BYTES: usize = 256;

/// Offset of the miner address inside the payload (every block, genesis included)
pub const MINER_BYTE: usize = 183;

/// Packed 3-byte transactions fit at start offsets 0, 3, …, 180
pub const MAX_TXS_PER_BLOCK: usize = 61;

/// Reward credited to the miner address of every appended block
pub const BLOCK_REWARD: u32 = 50;

/// One-byte addresses: 256 wallets
pub const ADDRESS_COUNT: usize = 256;

/// Records staged in RAM before one bulk write to the log
pub const WRITE_BUFFER_BLOCKS: usize = 16;

/// Records per read while replaying the log on open (64 KiB batches)
pub const REPLAY_BATCH_BLOCKS: usize = 256;

/// Nonce index bucket count: 2^19, sized so ~30k insertions keep chains short
pub const NONCE_BUCKET_BITS: u32 = 19;
pub const NONCE_BUCKETS: usize = 1 << NONCE_BUCKET_BITS;

/// Canonical simulation run
pub const SIMULATION_BLOCKS: u32 = 30_000;
pub const SIMULATION_SEED: u64 = 1_234_567;

/// Default file names
pub const CHAIN_FILE: &str = "blockchain.bin";
pub const DUMP_FILE: &str = "blockchain.txt";

/// Text carried by block 1, null-padded into the payload
pub const GENESIS_MESSAGE: &str = "chainstore genesis block";

// Storage engine modules
pub mod engine;  // lifecycle: open → append/query → close
pub mod index;   // nonce hash table + per-miner FIFO lists
pub mod ledger;  // running financial aggregates + tx-count cache
pub mod log;     // flat record file + 16-record append buffer
pub mod queries; // analytical queries A–I and the text dump

pub use engine::ChainStore;

/// Errors surfaced by the engine's public functions. Queries never fail on
/// empty results; only bad ids and I/O reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("block {id} out of range (chain has {total})")]
    OutOfRange { id: u32, total: u32 },
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

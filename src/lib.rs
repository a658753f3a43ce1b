// chainstore — append-only proof-of-work block log with in-memory
// secondary indices and constant-time chain analytics.
//
// One engine value owns the whole state (log file, append buffer, nonce
// and miner indices, running aggregates). Lifecycle: open → append/query
// → close. Opening a non-empty log replays every persisted record through
// the same update path as append, so cold-start state is bit-identical to
// an uninterrupted run.

pub mod config;
pub mod crypto;
pub mod miner;
pub mod primitives;
pub mod sim;
pub mod store;

pub use store::{ChainStore, StoreError};

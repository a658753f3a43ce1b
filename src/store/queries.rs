// Analytical queries over the indices and running aggregates. A–E are
// O(256) or better against cached state; F–I resolve records through the
// buffer-aware reader. Empty results are values, not errors.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::primitives::block::MinedBlock;
use crate::primitives::transaction::{genesis_text, payload_txs};
use crate::store::engine::ChainStore;
use crate::store::index::IndexStats;
use crate::store::StoreError;
use crate::config::MAX_TXS_PER_BLOCK;

impl ChainStore {
    /// Highest balance and every address holding it.
    pub fn richest_addresses(&self) -> (u32, Vec<u8>) {
        if self.block_count() == 0 {
            return (0, Vec::new());
        }
        let max = self.ledger.max_balance();
        let addrs = (0..=255u8)
            .filter(|&a| self.ledger.balance(a) == max)
            .collect();
        (max, addrs)
    }

    /// Highest mined-block count and every address holding it.
    pub fn top_miners(&self) -> (u32, Vec<u8>) {
        if self.block_count() == 0 {
            return (0, Vec::new());
        }
        let max = self.ledger.max_mined();
        let addrs = (0..=255u8)
            .filter(|&a| self.ledger.mined_count(a) == max)
            .collect();
        (max, addrs)
    }

    /// Running maximum applied-tx count and the blocks tied at it.
    pub fn max_tx_blocks(&self) -> (u32, &[u32]) {
        self.ledger.max_tx()
    }

    /// Running minimum applied-tx count over blocks ≥ 2; the slice is
    /// empty while the chain holds only the genesis block.
    pub fn min_tx_blocks(&self) -> (u32, &[u32]) {
        self.ledger.min_tx()
    }

    /// Mean transferred value per block, in BTC.
    pub fn mean_value_per_block(&self) -> f64 {
        if self.block_count() == 0 {
            return 0.0;
        }
        self.ledger.total_value() as f64 / self.block_count() as f64
    }

    /// Up to `limit` block ids mined by `miner`, chronological.
    pub fn blocks_by_miner(&self, miner: u8, limit: usize) -> Vec<u32> {
        self.miner_index.first_blocks(miner, limit)
    }

    /// Block ids 1..=n ordered by applied-tx count, ascending and stable:
    /// a 62-bucket sort over the count cache, chained through a `next`
    /// column so equal counts keep id order. O(n).
    pub fn blocks_by_tx_count(&self, n: u32) -> Vec<u32> {
        const NONE: u32 = u32::MAX;
        let n = n.min(self.block_count());
        let len = n as usize;

        let mut heads = [NONE; MAX_TXS_PER_BLOCK + 1];
        let mut tails = [NONE; MAX_TXS_PER_BLOCK + 1];
        let mut next = vec![NONE; len];

        for id in 1..=n {
            let count = self.ledger.tx_count(id).unwrap_or(0) as usize;
            let slot = id - 1;
            if tails[count] == NONE {
                heads[count] = slot;
            } else {
                next[tails[count] as usize] = slot;
            }
            tails[count] = slot;
        }

        let mut ordered = Vec::with_capacity(len);
        for count in 0..=MAX_TXS_PER_BLOCK {
            let mut cur = heads[count];
            while cur != NONE {
                ordered.push(cur + 1);
                cur = next[cur as usize];
            }
        }
        ordered
    }

    /// Every block id mined with `nonce`, ascending; empty when absent.
    pub fn find_by_nonce(&self, nonce: u32) -> Vec<u32> {
        self.nonce_index.lookup(nonce)
    }

    /// Nonce-table occupancy for the histogram report.
    pub fn nonce_index_stats(&self) -> IndexStats {
        self.nonce_index.stats()
    }

    /// Write a human-readable rendering of every block to `path`. Debug
    /// artifact only; the engine never reads it back.
    pub fn dump_text<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let mut out = BufWriter::new(File::create(path)?);
        for id in 1..=self.block_count() {
            let block = self.read_block(id)?;
            let count = self.tx_count(id)?;
            out.write_all(render_block(&block, count).as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Multi-line block rendering shared by the menu and the text dump:
/// decimal fields, lowercase hex hashes, then either the genesis message
/// or the payload's transfers up to the sentinel.
pub fn render_block(block: &MinedBlock, tx_count: u8) -> String {
    let header = &block.header;
    let mut out = String::new();
    let _ = writeln!(out, "--- block {} ---", header.number);
    let _ = writeln!(out, "nonce:       {}", header.nonce);
    let _ = writeln!(out, "miner:       {}", header.miner_address());
    let _ = writeln!(out, "prev hash:   {}", hex::encode(header.prev_hash));
    let _ = writeln!(out, "hash:        {}", hex::encode(block.hash));
    if header.number == 1 {
        let _ = writeln!(out, "genesis:     {}", genesis_text(&header.payload));
    } else {
        let _ = writeln!(out, "applied txs: {}", tx_count);
        for tx in payload_txs(&header.payload) {
            let _ = writeln!(out, "  {} -> {} ({} BTC)", tx.from, tx.to, tx.value);
        }
    }
    out
}

// Running financial aggregates, updated once per block from the record
// alone. Append and replay share this path, so a cold start reconstructs
// bit-identical state.

use colored::Colorize;

use crate::config::{ADDRESS_COUNT, BLOCK_REWARD, MAX_TXS_PER_BLOCK};
use crate::primitives::block::MinedBlock;
use crate::primitives::transaction::payload_txs;

/// Above any reachable count (≤ 61), so the first non-genesis block
/// always seeds the min-tx tie-set.
const MIN_TX_SENTINEL: u32 = 1000;

/// Initial tx-count cache capacity; Vec doubling takes it from there.
const TX_CACHE_INITIAL: usize = 1000;

pub struct Ledger {
    balances: [u32; ADDRESS_COUNT],
    mined: [u32; ADDRESS_COUNT],
    /// Sum of every applied transfer value across the chain.
    total_value: u64,
    max_balance: u32,
    max_mined: u32,
    max_tx: u32,
    max_tx_blocks: Vec<u32>,
    min_tx: u32,
    min_tx_blocks: Vec<u32>,
    /// tx_counts[id - 1] = applied transactions of block `id`.
    tx_counts: Vec<u8>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            balances: [0; ADDRESS_COUNT],
            mined: [0; ADDRESS_COUNT],
            total_value: 0,
            max_balance: 0,
            max_mined: 0,
            max_tx: 0,
            max_tx_blocks: Vec::new(),
            min_tx: MIN_TX_SENTINEL,
            min_tx_blocks: Vec::new(),
            tx_counts: Vec::with_capacity(TX_CACHE_INITIAL),
        }
    }

    /// Apply block `id`: scan its transactions, credit the reward, refresh
    /// every running aggregate. Reads nothing but the record and current
    /// state; ids must arrive dense and in order.
    pub fn apply(&mut self, id: u32, block: &MinedBlock) {
        let mut applied: u32 = 0;
        // a debit can only lower the true maximum when it hits the address
        // currently holding it; rescan at the end iff that happened
        let mut max_holder_debited = false;

        // block 1 carries the genesis text, not transactions
        if id != 1 {
            for tx in payload_txs(&block.header.payload) {
                let from = tx.from as usize;
                let to = tx.to as usize;
                let value = tx.value as u32;

                if self.balances[from] < value {
                    eprintln!(
                        "{} block {}: transfer {} -> {} ({} BTC) exceeds balance {}, skipped",
                        "warning:".yellow().bold(),
                        id,
                        tx.from,
                        tx.to,
                        tx.value,
                        self.balances[from],
                    );
                    continue;
                }

                if self.balances[from] == self.max_balance {
                    max_holder_debited = true;
                }
                self.balances[from] -= value;
                self.balances[to] += value;
                self.max_balance = self.max_balance.max(self.balances[to]);
                self.total_value += value as u64;
                applied += 1;
            }
        }

        let miner = block.header.miner_address() as usize;
        self.balances[miner] += BLOCK_REWARD;
        self.mined[miner] += 1;
        self.max_balance = self.max_balance.max(self.balances[miner]);
        self.max_mined = self.max_mined.max(self.mined[miner]);
        if max_holder_debited {
            self.max_balance = self.balances.iter().copied().max().unwrap_or(0);
        }

        // the clamp only matters if a parser change ever disagrees with
        // the 61-slot payload writer
        self.tx_counts.push(applied.min(MAX_TXS_PER_BLOCK as u32) as u8);

        if applied > self.max_tx {
            self.max_tx = applied;
            self.max_tx_blocks.clear();
            self.max_tx_blocks.push(id);
        } else if applied == self.max_tx {
            self.max_tx_blocks.push(id);
        }

        // genesis never competes for the minimum
        if id >= 2 {
            if applied < self.min_tx {
                self.min_tx = applied;
                self.min_tx_blocks.clear();
                self.min_tx_blocks.push(id);
            } else if applied == self.min_tx {
                self.min_tx_blocks.push(id);
            }
        }
    }

    pub fn balance(&self, addr: u8) -> u32 {
        self.balances[addr as usize]
    }

    pub fn mined_count(&self, addr: u8) -> u32 {
        self.mined[addr as usize]
    }

    pub fn total_value(&self) -> u64 {
        self.total_value
    }

    pub fn max_balance(&self) -> u32 {
        self.max_balance
    }

    pub fn max_mined(&self) -> u32 {
        self.max_mined
    }

    /// Running maximum applied-tx count and the blocks tied at it.
    pub fn max_tx(&self) -> (u32, &[u32]) {
        (self.max_tx, &self.max_tx_blocks)
    }

    /// Running minimum over blocks ≥ 2; empty until one exists.
    pub fn min_tx(&self) -> (u32, &[u32]) {
        if self.min_tx_blocks.is_empty() {
            (0, &[])
        } else {
            (self.min_tx, &self.min_tx_blocks)
        }
    }

    /// O(1) applied-count lookup, 1-based id.
    pub fn tx_count(&self, id: u32) -> Option<u8> {
        self.tx_counts.get(id.checked_sub(1)? as usize).copied()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

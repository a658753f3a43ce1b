// Engine lifecycle: open → append/query → close. One context value owns
// the log, both indices and the ledger; nothing global. Append and replay
// run the same update path, which is what makes cold-start reconstruction
// exact: after open, state is bit-identical to an uninterrupted run over
// the same records.

use std::path::Path;

use crate::primitives::block::MinedBlock;
use crate::store::index::{MinerIndex, NonceIndex};
use crate::store::ledger::Ledger;
use crate::store::log::BlockLog;
use crate::store::StoreError;

pub struct ChainStore {
    pub(crate) log: BlockLog,
    pub(crate) nonce_index: NonceIndex,
    pub(crate) miner_index: MinerIndex,
    pub(crate) ledger: Ledger,
}

impl ChainStore {
    /// Open the chain at `path`, replaying any persisted records to rebuild
    /// indices and aggregates. Records are neither re-written nor buffered
    /// during replay.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut log = BlockLog::open(path.as_ref())?;
        let mut nonce_index = NonceIndex::new();
        let mut miner_index = MinerIndex::new();
        let mut ledger = Ledger::new();

        log.replay(|id, block| {
            index_record(&mut nonce_index, &mut miner_index, &mut ledger, id, &block);
        })?;

        Ok(ChainStore {
            log,
            nonce_index,
            miner_index,
            ledger,
        })
    }

    /// Append the next block; returns its 1-based id. The record is
    /// readable immediately and reaches disk with the next 16-record
    /// flush. Index and aggregate updates never touch the disk.
    pub fn append(&mut self, block: MinedBlock) -> Result<u32, StoreError> {
        let id = self.log.total() + 1;
        index_record(
            &mut self.nonce_index,
            &mut self.miner_index,
            &mut self.ledger,
            id,
            &block,
        );
        self.log.append(block)?;
        Ok(id)
    }

    /// Resolve a 1-based id from buffer or disk. Side-effect free.
    pub fn read_block(&self, id: u32) -> Result<MinedBlock, StoreError> {
        self.log.read(id)
    }

    pub fn block_count(&self) -> u32 {
        self.log.total()
    }

    /// Records staged in RAM ahead of the next bulk write.
    pub fn buffered(&self) -> usize {
        self.log.buffered()
    }

    /// Current funds of `addr`; the transaction generator's view of state.
    pub fn balance(&self, addr: u8) -> u32 {
        self.ledger.balance(addr)
    }

    pub fn mined_count(&self, addr: u8) -> u32 {
        self.ledger.mined_count(addr)
    }

    /// Applied-transaction count of a block, from the dense cache.
    pub fn tx_count(&self, id: u32) -> Result<u8, StoreError> {
        self.ledger.tx_count(id).ok_or(StoreError::OutOfRange {
            id,
            total: self.block_count(),
        })
    }

    /// Force staged records to disk without waiting for the 16th append.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.log.flush()
    }

    /// Flush, then best-effort sync. Indices and aggregates are released
    /// with the engine value; reopening never sees prior state.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.log.flush()?;
        self.log.sync()
    }
}

/// The single update path: every record, appended or replayed, passes
/// through here exactly once, in id order.
fn index_record(
    nonce_index: &mut NonceIndex,
    miner_index: &mut MinerIndex,
    ledger: &mut Ledger,
    id: u32,
    block: &MinedBlock,
) {
    nonce_index.insert(block.header.nonce, id);
    miner_index.push(block.header.miner_address(), id);
    ledger.apply(id, block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HASH_BYTES, MINER_BYTE, PAYLOAD_BYTES};
    use crate::primitives::block::BlockHeader;

    fn raw_block(number: u32, nonce: u32, miner: u8) -> MinedBlock {
        let mut payload = [0u8; PAYLOAD_BYTES];
        payload[MINER_BYTE] = miner;
        MinedBlock {
            header: BlockHeader {
                number,
                nonce,
                payload,
                prev_hash: [0u8; HASH_BYTES],
            },
            hash: [number as u8; HASH_BYTES],
        }
    }

    #[test]
    fn test_append_assigns_dense_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChainStore::open(dir.path().join("chain.bin")).unwrap();
        assert_eq!(store.append(raw_block(1, 10, 7)).unwrap(), 1);
        assert_eq!(store.append(raw_block(2, 20, 7)).unwrap(), 2);
        assert_eq!(store.block_count(), 2);
        assert_eq!(store.read_block(2).unwrap().header.nonce, 20);
    }

    #[test]
    fn test_append_updates_every_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChainStore::open(dir.path().join("chain.bin")).unwrap();
        store.append(raw_block(1, 10, 7)).unwrap();
        store.append(raw_block(2, 10, 9)).unwrap();

        assert_eq!(store.find_by_nonce(10), vec![1, 2]);
        assert_eq!(store.blocks_by_miner(9, usize::MAX), vec![2]);
        assert_eq!(store.balance(7), 50);
        assert_eq!(store.mined_count(9), 1);
        assert_eq!(store.tx_count(1).unwrap(), 0);
    }

    #[test]
    fn test_reopen_rebuilds_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.bin");
        {
            let mut store = ChainStore::open(&path).unwrap();
            for n in 1..=20 {
                store.append(raw_block(n, n % 3, (n % 5) as u8)).unwrap();
            }
            store.close().unwrap();
        }

        let store = ChainStore::open(&path).unwrap();
        assert_eq!(store.block_count(), 20);
        assert_eq!(store.buffered(), 0);
        assert_eq!(store.read_block(20).unwrap().header.number, 20);
        let mined: u32 = (0..=255u8).map(|a| store.mined_count(a)).sum();
        assert_eq!(mined, 20);
    }

    #[test]
    fn test_tx_count_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChainStore::open(dir.path().join("chain.bin")).unwrap();
        assert!(matches!(
            store.tx_count(1),
            Err(StoreError::OutOfRange { id: 1, total: 0 })
        ));
    }
}

// Flat block log: 256-byte records concatenated in append order, the i-th
// record at byte (i-1)*256. No header, no framing. The 16-record write
// buffer is the virtual tail of the chain; the reader serves from it
// transparently until the next bulk flush.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use colored::Colorize;

use crate::config::{RECORD_BYTES, REPLAY_BATCH_BLOCKS, WRITE_BUFFER_BLOCKS};
use crate::primitives::block::MinedBlock;
use crate::store::StoreError;

pub struct BlockLog {
    file: File,
    buffer: Vec<MinedBlock>,
    total: u32,
}

impl BlockLog {
    /// Open or create the log. A trailing fragment shorter than one record
    /// is dropped immediately (warn + truncate) so the next flush lands on
    /// a record boundary.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let len = file.metadata()?.len();
        let record = RECORD_BYTES as u64;
        let whole = len / record;
        if len % record != 0 {
            eprintln!(
                "{} {}: dropping {}-byte partial record at end of log",
                "warning:".yellow().bold(),
                path.display(),
                len % record,
            );
            file.set_len(whole * record)?;
        }

        Ok(BlockLog {
            file,
            buffer: Vec::with_capacity(WRITE_BUFFER_BLOCKS),
            total: whole as u32,
        })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn persisted(&self) -> u32 {
        self.total - self.buffer.len() as u32
    }

    /// Stage a record; every 16th append flushes the ring in one write.
    pub fn append(&mut self, block: MinedBlock) -> Result<(), StoreError> {
        self.buffer.push(block);
        self.total += 1;
        if self.buffer.len() == WRITE_BUFFER_BLOCKS {
            self.flush()?;
        }
        Ok(())
    }

    /// Write every buffered record to the end of the file in a single
    /// call, then clear the ring.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let mut batch = Vec::with_capacity(self.buffer.len() * RECORD_BYTES);
        for block in &self.buffer {
            batch.extend_from_slice(&block.to_bytes());
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&batch)?;
        self.file.flush()?;
        self.buffer.clear();
        Ok(())
    }

    /// Resolve a 1-based id, serving unflushed tail records from the ring.
    /// No side effects; safe to call between any two appends.
    pub fn read(&self, id: u32) -> Result<MinedBlock, StoreError> {
        if id == 0 || id > self.total {
            return Err(StoreError::OutOfRange {
                id,
                total: self.total,
            });
        }

        let persisted = self.persisted();
        if id > persisted {
            return Ok(self.buffer[(id - persisted - 1) as usize].clone());
        }

        let mut f = &self.file;
        f.seek(SeekFrom::Start((id as u64 - 1) * RECORD_BYTES as u64))?;
        let mut buf = [0u8; RECORD_BYTES];
        f.read_exact(&mut buf)?;
        Ok(MinedBlock::from_bytes(&buf))
    }

    /// Stream every persisted record through `f` in id order, reading in
    /// 64 KiB batches to amortise I/O. Used once, by `open`.
    pub fn replay<F>(&mut self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(u32, MinedBlock),
    {
        self.file.seek(SeekFrom::Start(0))?;
        let mut batch = vec![0u8; REPLAY_BATCH_BLOCKS * RECORD_BYTES];
        let mut next_id: u32 = 1;
        while next_id <= self.total {
            let want = ((self.total - next_id + 1) as usize).min(REPLAY_BATCH_BLOCKS);
            let bytes = want * RECORD_BYTES;
            self.file.read_exact(&mut batch[..bytes])?;
            for chunk in batch[..bytes].chunks_exact(RECORD_BYTES) {
                let record: &[u8; RECORD_BYTES] = chunk.try_into().unwrap();
                f(next_id, MinedBlock::from_bytes(record));
                next_id += 1;
            }
        }
        Ok(())
    }

    /// Best-effort durability before close.
    pub fn sync(&self) -> Result<(), StoreError> {
        self.file.sync_all()?;
        Ok(())
    }
}

impl Drop for BlockLog {
    fn drop(&mut self) {
        // an engine dropped without close() still lands its staged tail
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HASH_BYTES, PAYLOAD_BYTES};
    use crate::primitives::block::BlockHeader;

    fn raw_block(number: u32, nonce: u32) -> MinedBlock {
        MinedBlock {
            header: BlockHeader {
                number,
                nonce,
                payload: [0u8; PAYLOAD_BYTES],
                prev_hash: [0u8; HASH_BYTES],
            },
            hash: [number as u8; HASH_BYTES],
        }
    }

    fn tmp_log(dir: &tempfile::TempDir) -> BlockLog {
        BlockLog::open(&dir.path().join("blockchain.bin")).unwrap()
    }

    #[test]
    fn test_read_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = tmp_log(&dir);
        log.append(raw_block(1, 10)).unwrap();

        assert!(matches!(
            log.read(0),
            Err(StoreError::OutOfRange { id: 0, total: 1 })
        ));
        assert!(matches!(
            log.read(2),
            Err(StoreError::OutOfRange { id: 2, total: 1 })
        ));
    }

    #[test]
    fn test_reads_served_from_buffer_before_flush() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = tmp_log(&dir);
        for n in 1..=5 {
            log.append(raw_block(n, n * 100)).unwrap();
        }
        // nothing on disk yet
        let len = std::fs::metadata(dir.path().join("blockchain.bin"))
            .unwrap()
            .len();
        assert_eq!(len, 0);
        assert_eq!(log.read(3).unwrap(), raw_block(3, 300));
    }

    #[test]
    fn test_sixteenth_append_flushes_in_bulk() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = tmp_log(&dir);
        for n in 1..=WRITE_BUFFER_BLOCKS as u32 {
            log.append(raw_block(n, n)).unwrap();
        }
        assert_eq!(log.buffered(), 0);
        let len = std::fs::metadata(dir.path().join("blockchain.bin"))
            .unwrap()
            .len();
        assert_eq!(len, (WRITE_BUFFER_BLOCKS * RECORD_BYTES) as u64);
        // records readable from disk now
        assert_eq!(log.read(1).unwrap(), raw_block(1, 1));
        assert_eq!(log.read(16).unwrap(), raw_block(16, 16));
    }

    #[test]
    fn test_partial_tail_truncated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockchain.bin");
        {
            let mut log = BlockLog::open(&path).unwrap();
            log.append(raw_block(1, 1)).unwrap();
            log.append(raw_block(2, 2)).unwrap();
            log.flush().unwrap();
        }
        // garbage fragment after two whole records
        {
            use std::io::Write as _;
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(&[0xEE; 100]).unwrap();
        }

        let log = BlockLog::open(&path).unwrap();
        assert_eq!(log.total(), 2);
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            2 * RECORD_BYTES as u64
        );
    }

    #[test]
    fn test_replay_visits_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockchain.bin");
        {
            let mut log = BlockLog::open(&path).unwrap();
            for n in 1..=40 {
                log.append(raw_block(n, n * 7)).unwrap();
            }
            log.flush().unwrap();
        }

        let mut log = BlockLog::open(&path).unwrap();
        let mut seen = Vec::new();
        log.replay(|id, block| {
            assert_eq!(block.header.number, id);
            seen.push(id);
        })
        .unwrap();
        assert_eq!(seen, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn test_drop_flushes_staged_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockchain.bin");
        {
            let mut log = BlockLog::open(&path).unwrap();
            log.append(raw_block(1, 1)).unwrap();
        }
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            RECORD_BYTES as u64
        );
    }
}

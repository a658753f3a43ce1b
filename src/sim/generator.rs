// Deterministic payload generation for the simulation driver. The stream
// is a pure function of the seed and the engine's balances, so two runs
// from an empty log produce byte-identical chains.

use rand::Rng;

use crate::config::{
    ADDRESS_COUNT, GENESIS_MESSAGE, MAX_TXS_PER_BLOCK, MINER_BYTE, PAYLOAD_BYTES,
};
use crate::primitives::transaction::{write_tx, Transaction};
use crate::store::ChainStore;

/// Genesis payload: the message, null padding, miner byte from the PRNG.
pub fn genesis_payload<R: Rng>(rng: &mut R) -> [u8; PAYLOAD_BYTES] {
    let mut payload = [0u8; PAYLOAD_BYTES];
    let message = GENESIS_MESSAGE.as_bytes();
    payload[..message.len()].copy_from_slice(message);
    payload[MINER_BYTE] = rng.r#gen::<u8>();
    payload
}

/// Fill a transaction payload, querying live balances through the engine.
/// Debits and credits of slots already written constrain later slots, so
/// a generated block never overdraws an address. Remaining slots stay
/// zero; the (0,0,0) sentinel terminates short lists naturally.
pub fn transactions_payload<R: Rng>(store: &ChainStore, rng: &mut R) -> [u8; PAYLOAD_BYTES] {
    let mut payload = [0u8; PAYLOAD_BYTES];
    payload[MINER_BYTE] = rng.r#gen::<u8>();

    // in-block view of balances, plus the set of spendable addresses
    let mut remaining = [0u32; ADDRESS_COUNT];
    let mut candidates: Vec<u8> = Vec::new();
    for addr in 0..ADDRESS_COUNT {
        remaining[addr] = store.balance(addr as u8);
        if remaining[addr] > 0 {
            candidates.push(addr as u8);
        }
    }

    let target = rng.gen_range(0..=MAX_TXS_PER_BLOCK);
    let mut written = 0usize;
    while written < target && !candidates.is_empty() {
        let pick = rng.gen_range(0..candidates.len());
        let from = candidates[pick];
        let to = rng.r#gen::<u8>();
        let cap = remaining[from as usize].min(255);
        let value = rng.gen_range(1..=cap) as u8;

        remaining[from as usize] -= value as u32;
        if remaining[to as usize] == 0 && to != from {
            candidates.push(to);
        }
        remaining[to as usize] += value as u32;
        if remaining[from as usize] == 0 {
            candidates.swap_remove(pick);
        }

        write_tx(&mut payload, written, Transaction { from, to, value });
        written += 1;
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SIMULATION_SEED, MINER_BYTE};
    use crate::primitives::transaction::payload_txs;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn empty_store(dir: &tempfile::TempDir) -> ChainStore {
        ChainStore::open(dir.path().join("chain.bin")).unwrap()
    }

    #[test]
    fn test_genesis_payload_carries_message_and_miner() {
        let mut rng = ChaCha8Rng::seed_from_u64(SIMULATION_SEED);
        let payload = genesis_payload(&mut rng);
        assert!(payload.starts_with(GENESIS_MESSAGE.as_bytes()));
        // padding up to the miner byte stays zero
        assert!(payload[GENESIS_MESSAGE.len()..MINER_BYTE].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_no_transactions_without_funded_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let store = empty_store(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(SIMULATION_SEED);
        let payload = transactions_payload(&store, &mut rng);
        assert_eq!(payload_txs(&payload).count(), 0);
    }

    #[test]
    fn test_generated_transfers_never_overdraw() {
        use crate::miner::miner::{create_genesis, create_next};

        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(SIMULATION_SEED);

        let mut prev = create_genesis(genesis_payload(&mut rng));
        store.append(prev.clone()).unwrap();
        for _ in 0..30 {
            let payload = transactions_payload(&store, &mut rng);
            let block = create_next(&prev, payload);
            let id = store.append(block.clone()).unwrap();
            // every written transfer applied; none skipped for overspend
            let written = payload_txs(&block.header.payload).count();
            assert_eq!(store.tx_count(id).unwrap() as usize, written);
            prev = block;
        }
    }

    #[test]
    fn test_stream_is_deterministic() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let store_a = empty_store(&dir_a);
        let store_b = empty_store(&dir_b);

        let mut rng_a = ChaCha8Rng::seed_from_u64(SIMULATION_SEED);
        let mut rng_b = ChaCha8Rng::seed_from_u64(SIMULATION_SEED);
        assert_eq!(genesis_payload(&mut rng_a), genesis_payload(&mut rng_b));
        assert_eq!(
            transactions_payload(&store_a, &mut rng_a),
            transactions_payload(&store_b, &mut rng_b)
        );
    }
}

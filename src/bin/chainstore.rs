// chainstore — proof-of-work block log simulator and query console.
//
// Mines the configured chain (resuming from whatever the log already
// holds), then serves the analytics menu.
// Usage: chainstore [--file PATH] [--blocks N] [--seed S]

use std::env;
use std::io::{self, BufRead, Write};

use colored::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use chainstore::config::{CHAIN_FILE, DUMP_FILE, SIMULATION_BLOCKS, SIMULATION_SEED};
use chainstore::miner::miner::{create_genesis, create_next};
use chainstore::sim::generator::{genesis_payload, transactions_payload};
use chainstore::store::queries::render_block;
use chainstore::store::ChainStore;

struct Options {
    file: String,
    blocks: u32,
    seed: u64,
}

fn print_usage() {
    println!(
        "{}",
        "  Usage: chainstore [--file PATH] [--blocks N] [--seed S]"
            .bright_yellow()
            .bold()
    );
    println!();
    println!("{}", "  Options:".bright_white().bold());
    println!(
        "  {} {:<22} {}",
        "❯".bright_black(),
        "--file PATH".bright_green(),
        format!("block log file (default {CHAIN_FILE})").white()
    );
    println!(
        "  {} {:<22} {}",
        "❯".bright_black(),
        "--blocks N".bright_green(),
        format!("chain length to mine (default {SIMULATION_BLOCKS})").white()
    );
    println!(
        "  {} {:<22} {}",
        "❯".bright_black(),
        "--seed S".bright_green(),
        format!("PRNG seed (default {SIMULATION_SEED})").white()
    );
}

fn parse_args() -> Options {
    let mut opts = Options {
        file: CHAIN_FILE.to_string(),
        blocks: SIMULATION_BLOCKS,
        seed: SIMULATION_SEED,
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--file", Some(v)) => opts.file = v.clone(),
            ("--blocks", Some(v)) => match v.parse() {
                Ok(n) => opts.blocks = n,
                Err(_) => {
                    eprintln!("{} bad block count: {v}", "error:".bright_red().bold());
                    std::process::exit(1);
                }
            },
            ("--seed", Some(v)) => match v.parse() {
                Ok(n) => opts.seed = n,
                Err(_) => {
                    eprintln!("{} bad seed: {v}", "error:".bright_red().bold());
                    std::process::exit(1);
                }
            },
            ("--help" | "-h", _) => {
                print_usage();
                std::process::exit(0);
            }
            (flag, _) => {
                eprintln!("{} bad argument: {flag}", "error:".bright_red().bold());
                print_usage();
                std::process::exit(1);
            }
        }
        i += 2;
    }
    opts
}

fn simulate(store: &mut ChainStore, opts: &Options) {
    let have = store.block_count();
    if have >= opts.blocks {
        println!(
            "{} chain already holds {} blocks",
            "chainstore:".bright_cyan().bold(),
            have
        );
        return;
    }

    println!(
        "{} mining {} blocks to {} ...",
        "chainstore:".bright_cyan().bold(),
        opts.blocks - have,
        opts.file
    );

    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
    let mut prev = if have == 0 {
        let genesis = create_genesis(genesis_payload(&mut rng));
        if let Err(e) = store.append(genesis.clone()) {
            eprintln!("{} append failed: {e}", "error:".bright_red().bold());
            return;
        }
        genesis
    } else {
        match store.read_block(have) {
            Ok(block) => block,
            Err(e) => {
                eprintln!("{} cannot read chain tip: {e}", "error:".bright_red().bold());
                return;
            }
        }
    };

    while store.block_count() < opts.blocks {
        let payload = transactions_payload(store, &mut rng);
        let block = create_next(&prev, payload);
        match store.append(block.clone()) {
            Ok(id) => {
                if id % 5000 == 0 {
                    println!("  mined block {id}");
                }
            }
            Err(e) => {
                eprintln!("{} append failed: {e}", "error:".bright_red().bold());
                break;
            }
        }
        prev = block;
    }

    if let Err(e) = store.flush() {
        eprintln!("{} flush failed: {e}", "error:".bright_red().bold());
    }
    println!(
        "{} done: {} blocks",
        "chainstore:".bright_cyan().bold(),
        store.block_count()
    );
}

fn print_menu() {
    println!();
    println!("{}", "  chainstore analytics".bright_cyan().bold());
    let entries = [
        ("A", "richest address(es)".to_string()),
        ("B", "address(es) with most mined blocks".to_string()),
        ("C", "block(s) with most transactions".to_string()),
        ("D", "block(s) with fewest transactions".to_string()),
        ("E", "mean transferred BTC per block".to_string()),
        ("F", "print a block by number".to_string()),
        ("G", "first N blocks of a miner".to_string()),
        ("H", "first N blocks ordered by transaction count".to_string()),
        ("I", "find blocks by nonce".to_string()),
        ("J", "nonce index histogram".to_string()),
        ("W", format!("write text dump to {DUMP_FILE}")),
        ("X", "exit".to_string()),
    ];
    for (key, text) in entries {
        println!(
            "  {} {:<3} {}",
            "❯".bright_black(),
            key.bright_green(),
            text.white()
        );
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{} ", label.bright_yellow());
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    if line.is_empty() {
        return None; // EOF
    }
    Some(line.trim().to_string())
}

fn prompt_number(label: &str) -> Option<u64> {
    let line = prompt(label)?;
    match line.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            eprintln!("{} not a number: {line}", "error:".bright_red().bold());
            None
        }
    }
}

fn format_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn show_block(store: &ChainStore, id: u32) {
    match (store.read_block(id), store.tx_count(id)) {
        (Ok(block), Ok(count)) => print!("{}", render_block(&block, count)),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{} {e}", "error:".bright_red().bold())
        }
    }
}

fn run_option(store: &ChainStore, option: &str) {
    match option {
        "A" => {
            let (max, addrs) = store.richest_addresses();
            if addrs.is_empty() {
                println!("no addresses hold funds yet");
            } else {
                println!(
                    "richest: {} BTC held by address(es) {}",
                    max,
                    addrs
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        "B" => {
            let (max, addrs) = store.top_miners();
            if addrs.is_empty() {
                println!("no blocks mined yet");
            } else {
                println!(
                    "top miner(s): {} block(s) by address(es) {}",
                    max,
                    addrs
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        "C" => {
            let (max, blocks) = store.max_tx_blocks();
            if blocks.is_empty() {
                println!("none");
                return;
            }
            println!(
                "most transactions: {} in block(s) {}",
                max,
                format_ids(blocks)
            );
            for id in blocks.to_vec() {
                show_block(store, id);
            }
        }
        "D" => {
            let (min, blocks) = store.min_tx_blocks();
            if blocks.is_empty() {
                println!("none (chain holds only the genesis block)");
                return;
            }
            println!(
                "fewest transactions: {} in block(s) {}",
                min,
                format_ids(blocks)
            );
            for id in blocks.to_vec() {
                show_block(store, id);
            }
        }
        "E" => {
            println!("mean transferred: {:.2} BTC per block", store.mean_value_per_block());
        }
        "F" => {
            if let Some(id) = prompt_number("block number:") {
                show_block(store, id as u32);
            }
        }
        "G" => {
            let Some(miner) = prompt_number("miner address (0-255):") else {
                return;
            };
            if miner > 255 {
                eprintln!("{} address must be 0-255", "error:".bright_red().bold());
                return;
            }
            let Some(n) = prompt_number("how many blocks:") else {
                return;
            };
            let ids = store.blocks_by_miner(miner as u8, n as usize);
            if ids.is_empty() {
                println!("address {miner} has mined no blocks");
            }
            for id in ids {
                show_block(store, id);
            }
        }
        "H" => {
            let Some(n) = prompt_number("report over the first N blocks:") else {
                return;
            };
            let ordered = store.blocks_by_tx_count(n as u32);
            if ordered.is_empty() {
                println!("none");
            }
            for id in ordered {
                let count = store.tx_count(id).unwrap_or(0);
                println!("block {id:>6}  {count:>2} transaction(s)");
            }
        }
        "I" => {
            let Some(nonce) = prompt_number("nonce:") else {
                return;
            };
            if nonce > u32::MAX as u64 {
                eprintln!("{} nonce must fit in 32 bits", "error:".bright_red().bold());
                return;
            }
            let ids = store.find_by_nonce(nonce as u32);
            if ids.is_empty() {
                println!("no block mined with nonce {nonce}");
                return;
            }
            println!("nonce {} found in block(s) {}", nonce, format_ids(&ids));
            for id in ids {
                show_block(store, id);
            }
        }
        "J" => {
            let stats = store.nonce_index_stats();
            println!("nonce index: {} nodes over {} buckets", stats.nodes, stats.buckets);
            println!("used buckets: {}", stats.used_buckets);
            println!("load factor:  {:.4}", stats.load_factor());
            println!("longest chain: {}", stats.max_chain);
            for (len, buckets) in stats.chain_lengths.iter().enumerate().skip(1) {
                if *buckets > 0 {
                    println!("  chains of {len}: {buckets}");
                }
            }
        }
        "W" => match store.dump_text(DUMP_FILE) {
            Ok(()) => println!("wrote {DUMP_FILE}"),
            Err(e) => eprintln!("{} dump failed: {e}", "error:".bright_red().bold()),
        },
        "" => {}
        other => {
            eprintln!("{} unknown option: {other}", "error:".bright_red().bold());
        }
    }
}

fn menu_loop(store: &ChainStore) {
    loop {
        print_menu();
        let Some(choice) = prompt("option:") else {
            return; // EOF ends the session like X does
        };
        let choice = choice.to_ascii_uppercase();
        if choice == "X" {
            return;
        }
        run_option(store, &choice);
    }
}

fn main() {
    let opts = parse_args();

    let mut store = match ChainStore::open(&opts.file) {
        Ok(store) => store,
        Err(e) => {
            eprintln!(
                "{} cannot open {}: {e}",
                "error:".bright_red().bold(),
                opts.file
            );
            std::process::exit(1);
        }
    };

    simulate(&mut store, &opts);
    menu_loop(&store);

    if let Err(e) = store.close() {
        eprintln!("{} close failed: {e}", "error:".bright_red().bold());
        std::process::exit(1);
    }
}

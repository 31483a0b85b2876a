use host::{summarize_drops, BalanceStore, DropSummary};
use plinko_core::{Board, DropResult, RandomBounces, RiskLevel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::str::FromStr;
use std::time::Instant;

/// Saved simulation file format
#[derive(Serialize, Deserialize)]
struct SavedSimulation {
    risk: RiskLevel,
    start_column: u32,
    seed: Option<u64>,
    multipliers: Vec<f64>,
    summary: DropSummary,
    /// Exact landing odds per slot
    expected_slot_probabilities: Vec<f64>,
    /// Observed landing frequency per slot
    observed_slot_frequencies: Vec<f64>,
    expected_multiplier: f64,
    generated_at: String,
}

/// Common options accepted after the positional arguments
struct Options {
    risk: RiskLevel,
    seed: Option<u64>,
    file: Option<String>,
    positional: Vec<String>,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    println!("🎯 Plinko Board");
    println!("{}", "=".repeat(70));
    println!();

    // Parse CLI arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "drop" => {
            let opts = parse_options(&args[2..]);
            let Some(position) = opts.positional.first() else {
                eprintln!("Usage: {} drop <position> [--risk <level>] [--seed <n>]", args[0]);
                std::process::exit(1);
            };
            let position = parse_number::<i64>(position, "position");

            drop_command(position, &opts);
        }

        "simulate" => {
            let opts = parse_options(&args[2..]);
            if opts.positional.len() < 2 {
                eprintln!(
                    "Usage: {} simulate <position> <balls> [--risk <level>] [--seed <n>] [output_file]",
                    args[0]
                );
                std::process::exit(1);
            }
            let position = parse_number::<i64>(&opts.positional[0], "position");
            let balls = parse_number::<u32>(&opts.positional[1], "balls");
            let output_file = opts.positional.get(2).cloned();

            simulate_command(position, balls, output_file.as_deref(), &opts);
        }

        "balance" => {
            let opts = parse_options(&args[2..]);
            let store = BalanceStore::new(
                opts.file
                    .clone()
                    .unwrap_or_else(|| host::settings::DEFAULT_BALANCE_FILE.to_string()),
            );

            match opts.positional.first().map(|s| s.as_str()) {
                None | Some("show") => balance_show_command(&store),
                Some("set") => {
                    let Some(amount) = opts.positional.get(1) else {
                        eprintln!("Usage: {} balance set <amount> [--file <path>]", args[0]);
                        std::process::exit(1);
                    };
                    balance_set_command(&store, parse_number::<f64>(amount, "amount"));
                }
                Some(other) => {
                    eprintln!("❌ Unknown balance command: {}", other);
                    print_usage(&args[0]);
                    std::process::exit(1);
                }
            }
        }

        "--help" | "-h" => {
            print_usage(&args[0]);
            std::process::exit(0);
        }

        _ => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  drop <position> [--risk <level>] [--seed <n>]");
    eprintln!("      Drop one chip and print its path");
    eprintln!("      - position: Starting slot, clamped onto the board");
    eprintln!();
    eprintln!("  simulate <position> <balls> [--risk <level>] [--seed <n>] [output_file]");
    eprintln!("      Drop many chips and compare landing frequencies with the exact odds");
    eprintln!("      - output_file: Optional file to save the report (JSON)");
    eprintln!("                     Defaults to: plinko-sim_<risk>_<timestamp>.json");
    eprintln!();
    eprintln!("  balance [show] [--file <path>]");
    eprintln!("  balance set <amount> [--file <path>]");
    eprintln!("      Read or overwrite the stored player balance");
    eprintln!("      - --file: Balance file (default: {})", host::settings::DEFAULT_BALANCE_FILE);
    eprintln!();
    eprintln!("Risk Levels:");
    eprintln!("  classic: 9 slots, 0.2x - 2x (default)");
    eprintln!("  low:     11 slots, 0.5x - 100x");
    eprintln!("  medium:  11 slots, 0.3x - 200x");
    eprintln!("  high:    11 slots, 0.1x - 1000x");
}

fn parse_options(args: &[String]) -> Options {
    let mut opts = Options {
        risk: RiskLevel::default(),
        seed: None,
        file: None,
        positional: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--risk" | "-r" | "--seed" | "-s" | "--file" | "-f" => {
                let Some(value) = iter.next() else {
                    eprintln!("❌ Error: {} requires a value", arg);
                    std::process::exit(1);
                };
                match arg.as_str() {
                    "--risk" | "-r" => {
                        opts.risk = RiskLevel::from_str(value).unwrap_or_else(|e| {
                            eprintln!("❌ Error: {}", e);
                            std::process::exit(1);
                        });
                    }
                    "--seed" | "-s" => opts.seed = Some(parse_number::<u64>(value, "seed")),
                    _ => opts.file = Some(value.clone()),
                }
            }
            _ => opts.positional.push(arg.clone()),
        }
    }

    opts
}

fn parse_number<T: FromStr>(raw: &str, what: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse().unwrap_or_else(|e| {
        eprintln!("❌ Error: invalid {} '{}': {}", what, raw, e);
        std::process::exit(1);
    })
}

fn load_board(risk: RiskLevel) -> Board {
    Board::preset(risk).unwrap_or_else(|e| {
        eprintln!("❌ Invalid board configuration for {}: {}", risk, e);
        std::process::exit(1);
    })
}

fn bounce_source(seed: Option<u64>) -> RandomBounces<StdRng> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    RandomBounces::new(rng)
}

fn drop_command(position: i64, opts: &Options) {
    let board = load_board(opts.risk);
    let start = board.clamp_start(position);

    println!("📋 Dropping chip");
    println!("  Risk level: {}", opts.risk);
    println!("  Start slot: {}", start);
    if let Some(seed) = opts.seed {
        println!("  Seed: {}", seed);
    }
    println!();

    let result = board.drop_chip(start, &mut bounce_source(opts.seed));
    print_path(&result, board.rows());

    println!();
    println!("✅ Landed in slot {} → {}x", result.slot, result.multiplier);
    println!("{}", "=".repeat(70));
}

fn print_path(result: &DropResult, rows: u32) {
    for pos in result.path.iter() {
        let indent = " ".repeat((rows - pos.row) as usize);
        let pegs: String = (0..=pos.row.max(pos.column))
            .map(|c| if c == pos.column { "● " } else { "· " })
            .collect();
        println!("  {:>2} {}{}", pos.row, indent, pegs);
    }
}

fn simulate_command(position: i64, balls: u32, output_file: Option<&str>, opts: &Options) {
    if balls == 0 {
        eprintln!("❌ Error: balls must be at least 1");
        std::process::exit(1);
    }

    let board = load_board(opts.risk);
    let start = board.clamp_start(position);

    println!("📋 Simulating drops");
    println!("  Risk level: {}", opts.risk);
    println!("  Start slot: {}", start);
    println!("  Balls: {}", balls);
    println!();

    let started = Instant::now();
    let summary = summarize_drops(&board, start, balls, &mut bounce_source(opts.seed));
    println!("  Simulation time: {:.2}s", started.elapsed().as_secs_f64());
    println!();

    let expected = board.slot_probabilities(start);
    let observed: Vec<f64> = summary
        .slot_counts
        .iter()
        .map(|&n| n as f64 / summary.balls as f64)
        .collect();

    println!("  Slot  Multiplier   Expected   Observed");
    for (slot, multiplier) in board.multipliers().iter().enumerate() {
        println!(
            "  {:>4}  {:>9}x   {:>7.3}%   {:>7.3}%",
            slot,
            multiplier,
            expected[slot] * 100.0,
            observed[slot] * 100.0
        );
    }
    println!();

    let expected_multiplier = board.expected_multiplier(start);
    println!("  Expected multiplier: {:.4}x", expected_multiplier);
    println!("  Average multiplier:  {:.4}x", summary.average_multiplier);
    println!("  Best multiplier:     {}x", summary.best_multiplier);
    println!();

    let saved = SavedSimulation {
        risk: opts.risk,
        start_column: start,
        seed: opts.seed,
        multipliers: board.multipliers().to_vec(),
        summary,
        expected_slot_probabilities: expected,
        observed_slot_frequencies: observed,
        expected_multiplier,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    // Determine output filename
    let default_filename = format!(
        "plinko-sim_{}_{}.json",
        opts.risk,
        chrono::Utc::now().timestamp()
    );
    let file_to_save = output_file.unwrap_or(&default_filename);

    match save_simulation(&saved, file_to_save) {
        Ok(()) => {
            println!("💾 Report saved to: {}", file_to_save);
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            eprintln!("❌ Error saving report: {}", e);
            std::process::exit(1);
        }
    }
}

fn balance_show_command(store: &BalanceStore) {
    match store.load() {
        Ok(balance) => {
            println!("💰 Balance: ${:.2}", balance);
            println!("  File: {}", store.path().display());
        }
        Err(e) => {
            eprintln!("❌ Error reading balance: {}", e);
            std::process::exit(1);
        }
    }
}

fn balance_set_command(store: &BalanceStore, amount: f64) {
    match store.store(amount) {
        Ok(balance) => {
            println!("✅ Balance set to ${:.2}", balance);
            println!("  File: {}", store.path().display());
        }
        Err(e) => {
            eprintln!("❌ Error saving balance: {}", e);
            std::process::exit(1);
        }
    }
}

fn save_simulation(report: &SavedSimulation, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

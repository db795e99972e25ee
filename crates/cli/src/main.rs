//! Pipeline simulator CLI.
//!
//! This binary runs one trace through one configuration. It performs:
//! 1. **Setup:** Loads a JSON configuration (or the built-in default) and opens a binary trace.
//! 2. **Run:** Ticks the simulator until the trace drains or the cycle limit is hit.
//! 3. **Report:** Prints pipeline statistics, per-level cache counters, and optionally cache contents.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use pipesim_core::config::Config;
use pipesim_core::sim::{BinaryTrace, RunOutcome, Simulator};
use pipesim_core::soc::interconnect::Device;
use pipesim_core::SimResult;

#[derive(Parser, Debug)]
#[command(
    name = "pipesim",
    author,
    version,
    about = "Cycle-level five-stage pipeline simulator with a configurable cache hierarchy",
    long_about = "Run an instruction trace through an in-order pipeline and a cache hierarchy.\n\nExamples:\n  pipesim --trace sample.tr\n  pipesim --config split_l1.json --trace sample.tr --max-cycles 100000\n  pipesim -c unified.json -t sample.tr -vv --dump-cache"
)]
struct Cli {
    /// JSON configuration file. Uses the built-in default when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Binary instruction trace (12-byte records).
    #[arg(short, long)]
    trace: PathBuf,

    /// Stop after this many cycles.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print every valid cache line after the run.
    #[arg(long)]
    dump_cache: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> SimResult<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    print_config(&config, cli);

    let trace = BinaryTrace::open(&cli.trace)?;
    let mut sim = Simulator::new(&config, Box::new(trace))?;
    if let Some(limit) = cli.max_cycles {
        sim = sim.with_max_cycles(limit);
    }

    let outcome = sim.run()?;
    if outcome == RunOutcome::CycleLimit {
        println!("[*] Stopped at cycle limit ({} cycles)", sim.stats.cycles);
    }

    sim.stats.print();
    sim.memory.print_stats();
    if cli.dump_cache {
        dump_caches(&sim);
    }
    Ok(())
}

fn print_config(config: &Config, cli: &Cli) {
    let p = &config.pipeline;
    match &cli.config {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: built-in default"),
    }
    println!(
        "  Width: {}  Forwarding: {}  Write ports: {}  Split caches: {}  BTB: {}  Predictor: {}",
        p.pipeline_width,
        p.enable_forwarding,
        p.reg_file_write_ports,
        p.split_caches,
        p.branch_target_buffer,
        p.branch_predictor
    );
    println!(
        "  Ports: inst={}  data={}  Levels: {}",
        config.memory.instruction_port.as_deref().unwrap_or("-"),
        config.memory.data_port.as_deref().unwrap_or("-"),
        config.memory.levels.len()
    );
    println!("  Trace: {}", cli.trace.display());
    println!();
}

fn dump_caches(sim: &Simulator) {
    println!("CACHE CONTENTS");
    for (_, device) in sim.memory.hierarchy.iter() {
        let Device::Cache(cache) = device else {
            continue;
        };
        let lines = cache.core().contents();
        println!("  {} ({} valid lines)", cache.name(), lines.len());
        for line in lines {
            println!(
                "    set {:>4} way {:>2}  addr {:#010x}  tag {:#x}  age {:>3}{}",
                line.set,
                line.way,
                line.addr,
                line.tag,
                line.age,
                if line.dirty { "  dirty" } else { "" }
            );
        }
    }
}

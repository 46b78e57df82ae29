use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::exit,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use snowverload::{gap, parse_graph, Config, KargerStein};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snowverload")]
#[command(about = "Split a wiring diagram in two by cutting a few wires", long_about = None)]
struct Cli {
    /// Log search progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut the diagram and print the product of the group sizes
    Solve {
        /// Wiring diagram, read from stdin when omitted
        file: Option<PathBuf>,

        /// Puzzle part
        #[arg(short, long, default_value_t = 1)]
        part: u8,

        /// Number of wires to cut
        #[arg(long, default_value_t = 3)]
        target: usize,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Give up after this many contraction attempts (0 = never)
        #[arg(long, default_value_t = 100_000)]
        max_trials: usize,

        /// Attempts per stage-one sample before drawing a new one
        #[arg(long, default_value_t = 10_000)]
        max_batch_trials: usize,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Run every attempt on the main thread
        #[arg(long)]
        sequential: bool,

        /// Print both groups as JSON instead of the product
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        /// Print out how long parsing and cutting took
        timings: bool,
    },

    /// Split a sorted list of numbers at its largest gap
    GapSplit {
        /// One integer per line, read from stdin when omitted
        file: Option<PathBuf>,
    },
}

fn read_input(file: Option<&PathBuf>) -> snowverload::Result<String> {
    match file {
        Some(file) => Ok(fs::read_to_string(file)?),
        None if atty::is(atty::Stream::Stdin) => Ok("".to_string()),
        None => {
            let mut str = String::new();
            io::stdin().read_to_string(&mut str)?;
            Ok(str)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level.as_str())),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Solve {
            file,
            part,
            target,
            seed,
            max_trials,
            max_batch_trials,
            timeout_secs,
            sequential,
            json,
            timings,
        } => {
            if part != 1 {
                eprintln!("{part} is not a valid part");
                exit(4);
            }

            let contents = match read_input(file.as_ref()) {
                Ok(contents) => contents,
                Err(err) => {
                    eprintln!("Could not read input: {err}");
                    exit(1);
                }
            };

            let t0 = Instant::now();
            let graph = match parse_graph(&contents) {
                Ok(graph) => graph,
                Err(err) => {
                    eprintln!("Could not parse diagram: {err}");
                    exit(2);
                }
            };
            if timings {
                eprintln!("Parsed in {:?}", t0.elapsed());
            }
            debug!(
                vertices = graph.num_vertices(),
                edges = graph.num_edges(),
                "parsed diagram"
            );

            let config = Config {
                seed,
                max_trials: (max_trials > 0).then_some(max_trials),
                timeout: timeout_secs.map(Duration::from_secs),
                max_batch_trials,
                parallel: !sequential,
                ..Config::default()
            };

            let t0 = Instant::now();
            let result = KargerStein::new(&graph, config).search(target);
            if timings {
                eprintln!("  took {:?}", t0.elapsed());
            }

            match result {
                Ok(search) => {
                    if timings {
                        eprintln!("  {} batches, {} trials", search.batches, search.trials);
                    }
                    if json {
                        match serde_json::to_string_pretty(&search.partition) {
                            Ok(out) => println!("{out}"),
                            Err(err) => {
                                eprintln!("Could not serialize partition: {err}");
                                exit(3);
                            }
                        }
                    } else {
                        println!("First part: {}", search.partition.product());
                    }
                }
                Err(err) => {
                    eprintln!("Search failed: {err}");
                    exit(3);
                }
            }
        }
        Commands::GapSplit { file } => {
            let contents = match read_input(file.as_ref()) {
                Ok(contents) => contents,
                Err(err) => {
                    eprintln!("Could not read input: {err}");
                    exit(1);
                }
            };

            match gap::split_product(&contents) {
                Ok(product) => println!("{product}"),
                Err(err) => {
                    eprintln!("Could not split: {err}");
                    exit(2);
                }
            }
        }
    }
}

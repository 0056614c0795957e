//! Estimates page ranks from link information.

use anyhow::{Context, Result};
use clap::Parser;
use link_rank::{loader, page_rank, report, DanglingPolicy, Method};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    time::Instant,
};

#[derive(Parser)]
#[command(name = "link-rank", version, about = "Estimates page ranks from link information")]
struct Cli {
    /// Text file of links among web pages as `source target` lines [default: stdin]
    datafile: Option<PathBuf>,
    /// Page rank algorithm: stochastic or distribution
    #[arg(short, long, default_value_t = Method::Stochastic)]
    method: Method,
    /// Number of random walks
    #[arg(short, long, default_value_t = 1_000_000)]
    repeats: usize,
    /// Number of steps a walker takes, or of propagation steps
    #[arg(short, long, default_value_t = 100)]
    steps: usize,
    /// Number of results shown
    #[arg(short, long, default_value_t = 20)]
    number: usize,
    /// Seed for reproducible random walks
    #[arg(long)]
    seed: Option<u64>,
    /// Split the random walks across this many worker threads
    #[arg(long, default_value_t = 1)]
    shards: usize,
    /// Stop propagating once a step moves less than this much mass
    #[arg(long)]
    epsilon: Option<f64>,
    /// Nodes without out-edges: reject, self-loop or prune
    #[arg(long, default_value_t = DanglingPolicy::Reject)]
    dangling: DanglingPolicy,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let reader: Box<dyn BufRead> = match &cli.datafile {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let graph = loader::load(reader, cli.dangling).context("failed to load the link graph")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", graph.stats())?;

    let config = page_rank::Config {
        method: cli.method,
        repeats: cli.repeats,
        steps: cli.steps,
        shards: cli.shards,
        epsilon: cli.epsilon,
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let start = Instant::now();
    let rank = page_rank::estimate(&graph, &config, &mut rng)
        .with_context(|| format!("{} page rank failed", cli.method))?;
    let elapsed = start.elapsed();

    eprintln!("Top {} pages:", cli.number);
    let top = report::top(&rank, cli.number);
    if !top.is_empty() {
        writeln!(stdout, "{top}")?;
    }
    stdout.flush()?;
    eprintln!("Calculation took {:.2} seconds.", elapsed.as_secs_f64());
    Ok(())
}

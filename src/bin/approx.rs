//! Binary that either runs one vertex cover heuristic on an edge list read from standard in, or
//! benchmarks all heuristics on generated graphs and prints one tab separated row per run.

use std::io::{self, BufWriter, Write};

use anyhow::{bail, Context};
use rand::Rng;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use approx_cover::benchmark::{self, BenchmarkConfig, GeneratorCommand, GraphSource, RandomGraph};
use approx_cover::graph::Graph;
use approx_cover::heuristics::{Algorithm, ALL_ALGORITHMS};

#[derive(StructOpt)]
#[structopt(name = "approx", about = "Approximates minimum vertex covers with four heuristics")]
struct Opts {
    /// 0 runs the benchmark, 1-4 run a single heuristic on the edge list given on stdin
    #[structopt(default_value = "0")]
    selector: u32,

    /// Number of generated graphs per size in benchmark mode
    #[structopt(default_value = "10")]
    test_cases: usize,

    /// Graph sizes of the benchmark [default: 10000]
    #[structopt(long)]
    sizes: Vec<usize>,

    /// Heuristics (1-4) to benchmark [default: all]
    #[structopt(long)]
    algorithms: Vec<u32>,

    /// External generator command, called with the graph size as last argument
    #[structopt(long)]
    generator: Option<String>,

    /// Edge probability of the built-in generator
    #[structopt(long, default_value = "0.5")]
    edge_probability: f64,

    /// Seed of all random choices, drawn at random if omitted
    #[structopt(long)]
    seed: Option<u64>,

    /// Worker threads of the benchmark
    #[structopt(long)]
    threads: Option<usize>,

    /// Print a graph of the given size from the built-in generator and exit
    #[structopt(long)]
    emit_graph: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::from_args();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "approx_cover=info,approx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let seed = opts.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "using seed");

    if let Some(size) = opts.emit_graph {
        let graph = RandomGraph::new(opts.edge_probability, seed)?.generate(size, 0)?;
        graph.write_edges(BufWriter::new(io::stdout().lock()))?;
        return Ok(())
    }

    if opts.selector == 0 {
        return run_benchmark(&opts, seed);
    }

    let algorithm = Algorithm::from_selector(opts.selector)?;
    let graph = Graph::read_edges(io::stdin().lock())
        .context("Failed to read the edge list from stdin")?;
    info!(edges = graph.num_edges(), max_id = ?graph.max_id(), algorithm = algorithm.name(), "solving");
    let cover = benchmark::solve_single(algorithm, &graph, seed);
    cover.validate(&graph)?;
    let mut stdout = io::stdout().lock();
    cover.write_solution(&mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn run_benchmark(opts: &Opts, seed: u64) -> anyhow::Result<()> {
    let algorithms = if opts.algorithms.is_empty() {
        ALL_ALGORITHMS.to_vec()
    } else {
        opts.algorithms.iter()
            .map(|selector| Algorithm::from_selector(*selector))
            .collect::<Result<Vec<_>, _>>()?
    };
    let config = BenchmarkConfig {
        sizes: if opts.sizes.is_empty() { vec![10000] } else { opts.sizes.clone() },
        test_cases: opts.test_cases,
        seed,
        threads: opts.threads,
        algorithms,
    };
    let source: Box<dyn GraphSource> = match &opts.generator {
        Some(command) => Box::new(GeneratorCommand::parse(command)?),
        None => Box::new(RandomGraph::new(opts.edge_probability, seed)?),
    };

    let summary = benchmark::run_benchmark(&config, source.as_ref(), BufWriter::new(io::stdout()))
        .context("Benchmark aborted")?;
    info!(records = summary.records, failed = summary.failures.len(), "benchmark finished");
    if !summary.failures.is_empty() {
        bail!("{} benchmark case(s) failed", summary.failures.len());
    }
    Ok(())
}

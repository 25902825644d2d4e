//! Benchmark harness: generates random graphs, runs the heuristics on them in a bounded worker
//! pool and writes one tab separated row per run.
//!
//! Rows are sent through a channel to a single writer thread, so output lines never interleave.
//! A test case whose graph cannot be generated is skipped and reported in `BenchmarkSummary`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::io::{self, Cursor, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use crate::cover::Cover;
use crate::cust_error::ProcessingError;
use crate::graph::{Edge, Graph};
use crate::heuristics::{Algorithm, ALL_ALGORITHMS};

pub const HEADER: &str = "algorithm\texecution_time\tcase_id\tcount";

/// Produces the input graph of a benchmark case.
pub trait GraphSource {
    fn generate(&self, size: usize, case: usize) -> Result<Graph, ProcessingError>;
}

/// Built-in generator: every pair `i < j` of `0..size` becomes an edge with probability
/// `edge_probability`.
#[derive(Debug, Clone, Copy)]
pub struct RandomGraph {
    edge_probability: f64,
    seed: u64,
}

impl RandomGraph {

    pub fn new(edge_probability: f64, seed: u64) -> Result<Self, ProcessingError> {
        if !(0.0..=1.0).contains(&edge_probability) {
            return Err(ProcessingError::InvalidParameter(
                format!("edge probability {} is not within [0, 1]", edge_probability)));
        }
        Ok(RandomGraph { edge_probability, seed })
    }
}

impl GraphSource for RandomGraph {
    fn generate(&self, size: usize, case: usize) -> Result<Graph, ProcessingError> {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(self.seed, &[size as u64, case as u64]));
        let mut edges = Vec::new();
        for left in 0..size {
            for right in left + 1..size {
                if rng.gen_bool(self.edge_probability) {
                    edges.push(Edge(left, right));
                }
            }
        }
        Ok(Graph::new(edges))
    }
}

/// External generator process. It is called with the graph size as last argument and has to
/// print an edge list to its standard output.
#[derive(Debug, Clone)]
pub struct GeneratorCommand {
    program: String,
    args: Vec<String>,
}

impl GeneratorCommand {

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        GeneratorCommand {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line like `python graphGenerator.py` at whitespace.
    pub fn parse(command: &str) -> Result<Self, ProcessingError> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next().ok_or_else(|| {
            ProcessingError::InvalidParameter("generator command is empty".to_owned())
        })?;
        Ok(GeneratorCommand::new(program, parts.collect()))
    }
}

impl GraphSource for GeneratorCommand {
    fn generate(&self, size: usize, _case: usize) -> Result<Graph, ProcessingError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(size.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| ProcessingError::Generator {
                size,
                reason: format!("could not start `{}`: {}", self.program, e),
            })?;
        if !output.status.success() {
            return Err(ProcessingError::Generator {
                size,
                reason: format!("`{}` exited with {}", self.program, output.status),
            });
        }
        Graph::read_edges(Cursor::new(output.stdout))
            .map_err(|source| ProcessingError::GeneratorOutput { size, source })
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Graph sizes, every size gets `test_cases` graphs.
    pub sizes: Vec<usize>,
    pub test_cases: usize,
    /// Base seed of all per-run generators.
    pub seed: u64,
    /// Worker threads, `None` uses the rayon default.
    pub threads: Option<usize>,
    pub algorithms: Vec<Algorithm>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            sizes: vec![10000],
            test_cases: 10,
            seed: 0,
            threads: None,
            algorithms: ALL_ALGORITHMS.to_vec(),
        }
    }
}

/// Timing of one heuristic on one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRecord {
    pub algorithm: &'static str,
    pub elapsed: Duration,
    pub case: usize,
    pub size: usize,
    pub count: usize,
}

impl fmt::Display for BenchmarkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{};{}\t{}",
            self.algorithm, self.elapsed.as_nanos(), self.case, self.size, self.count)
    }
}

#[derive(Debug)]
pub struct CaseFailure {
    pub case: usize,
    pub size: usize,
    pub error: ProcessingError,
}

#[derive(Debug, Default)]
pub struct BenchmarkSummary {
    /// Number of rows written, header excluded.
    pub records: usize,
    pub failures: Vec<CaseFailure>,
}

/// Runs every configured heuristic on `config.test_cases` graphs per size and writes the rows
/// to `out`. Graphs are generated on the calling thread, the heuristics of a case run in
/// parallel on the worker pool.
pub fn run_benchmark<S, W>(config: &BenchmarkConfig, source: &S, out: W)
    -> Result<BenchmarkSummary, ProcessingError>
where
    S: GraphSource + ?Sized,
    W: Write + Send,
{
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()
        .map_err(|e| ProcessingError::InvalidParameter(format!("worker pool: {}", e)))?;
    info!(seed = config.seed, threads = pool.current_num_threads(), "starting benchmark");

    let (tx, rx) = mpsc::channel::<BenchmarkRecord>();
    thread::scope(|s| -> Result<BenchmarkSummary, ProcessingError> {
        let writer = s.spawn(move || write_records(rx, out));
        let writer_gone = Arc::new(AtomicBool::new(false));
        let mut failures = Vec::new();
        'cases: for &size in &config.sizes {
            for case in 1..=config.test_cases {
                if writer.is_finished() || writer_gone.load(Ordering::Relaxed) {
                    // The writer only stops early on an I/O error, returned by the join below.
                    warn!(case, size, "output closed, stopping benchmark");
                    break 'cases;
                }
                let graph = match source.generate(size, case) {
                    Ok(graph) => Arc::new(graph),
                    Err(error) => {
                        error!(case, size, %error, "skipping benchmark case");
                        failures.push(CaseFailure { case, size, error });
                        continue
                    },
                };
                debug!(case, size, edges = graph.num_edges(), "generated graph");
                // One case at a time, so at most one generated graph is alive.
                pool.in_place_scope(|scope| {
                    for &algorithm in &config.algorithms {
                        let graph = Arc::clone(&graph);
                        let tx = tx.clone();
                        let writer_gone = Arc::clone(&writer_gone);
                        let seed = run_seed(config.seed, size, case, algorithm);
                        scope.spawn(move |_| {
                            let record = time_run(algorithm, &graph, case, size, seed);
                            if tx.send(record).is_err() {
                                writer_gone.store(true, Ordering::Relaxed);
                            }
                        });
                    }
                });
            }
        }
        drop(tx);
        let records = writer.join().expect("writer thread panicked")?;
        Ok(BenchmarkSummary { records, failures })
    })
}

fn write_records<W: Write>(rx: Receiver<BenchmarkRecord>, mut out: W) -> Result<usize, io::Error> {
    writeln!(out, "{}", HEADER)?;
    let mut written = 0;
    for record in rx {
        writeln!(out, "{}", record)?;
        out.flush()?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Runs `algorithm` once and measures the solving step only.
pub fn time_run(algorithm: Algorithm, graph: &Graph, case: usize, size: usize, seed: u64) -> BenchmarkRecord {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut solver = algorithm.build();
    solver.parse(graph, &mut rng);
    let start = Instant::now();
    let cover = solver.solve(&mut rng);
    let elapsed = start.elapsed();
    debug_assert!(cover.covers(graph.edges()));
    debug!(algorithm = solver.name(), case, size, count = cover.len(), "finished run");
    BenchmarkRecord {
        algorithm: solver.name(),
        elapsed,
        case,
        size,
        count: cover.len(),
    }
}

/// Runs `algorithm` once on `graph` with a generator seeded by `seed`.
pub fn solve_single(algorithm: Algorithm, graph: &Graph, seed: u64) -> Cover {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    algorithm.build().solve_once(graph, &mut rng)
}

fn run_seed(seed: u64, size: usize, case: usize, algorithm: Algorithm) -> u64 {
    derive_seed(seed, &[size as u64, case as u64, algorithm.selector() as u64])
}

fn derive_seed(seed: u64, parts: &[u64]) -> u64 {
    parts.iter().fold(seed, |acc, part| {
        (acc ^ part).wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(29)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    /// Returns a fixed graph, or fails on the listed cases.
    struct FixedSource {
        graph: Graph,
        failing: Vec<usize>,
    }

    impl GraphSource for FixedSource {
        fn generate(&self, size: usize, case: usize) -> Result<Graph, ProcessingError> {
            if self.failing.contains(&case) {
                return Err(ProcessingError::Generator { size, reason: "exit status: 1".to_owned() });
            }
            Ok(self.graph.clone())
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn rows(buf: &SharedBuf) -> Vec<String> {
        String::from_utf8(buf.0.lock().unwrap().clone()).unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn random_graph_test() {
        let source = RandomGraph::new(0.5, 9).unwrap();
        let graph = source.generate(30, 1).unwrap();
        assert!(graph.edges().iter().all(|e| e.0 < e.1 && e.1 < 30));
        assert_eq!(graph, source.generate(30, 1).unwrap());
        assert_ne!(graph, source.generate(30, 2).unwrap());

        let full = RandomGraph::new(1.0, 0).unwrap().generate(6, 1).unwrap();
        assert_eq!(full.num_edges(), 15);
        assert!(RandomGraph::new(0.0, 0).unwrap().generate(6, 1).unwrap().is_empty());
        assert!(RandomGraph::new(1.5, 0).is_err());
    }

    #[test]
    fn record_format_test() {
        let record = BenchmarkRecord {
            algorithm: "MaxDegree",
            elapsed: Duration::from_nanos(1234),
            case: 3,
            size: 100,
            count: 42,
        };
        assert_eq!(record.to_string(), "MaxDegree\t1234\t3;100\t42");
    }

    #[test]
    fn run_benchmark_test() {
        let config = BenchmarkConfig {
            sizes: vec![20, 40],
            test_cases: 3,
            seed: 5,
            threads: Some(2),
            ..BenchmarkConfig::default()
        };
        let source = RandomGraph::new(0.3, 5).unwrap();
        let buf = SharedBuf::default();
        let summary = run_benchmark(&config, &source, buf.clone()).unwrap();
        assert_eq!(summary.records, 2 * 3 * 4);
        assert!(summary.failures.is_empty());

        let rows = rows(&buf);
        assert_eq!(rows[0], HEADER);
        assert_eq!(rows.len(), 1 + 24);
        for row in &rows[1..] {
            let fields: Vec<&str> = row.split('\t').collect();
            assert_eq!(fields.len(), 4);
            assert!(ALL_ALGORITHMS.iter().any(|a| a.name() == fields[0]));
            assert!(fields[1].parse::<u128>().is_ok());
            assert!(fields[2].ends_with(";20") || fields[2].ends_with(";40"));
            assert!(fields[3].parse::<usize>().is_ok());
        }
    }

    #[test]
    #[traced_test]
    fn failing_case_test() {
        let config = BenchmarkConfig {
            sizes: vec![10],
            test_cases: 3,
            threads: Some(1),
            algorithms: vec![Algorithm::EdgeScan, Algorithm::MaxDegree],
            ..BenchmarkConfig::default()
        };
        let source = FixedSource {
            graph: vec![(0, 1), (1, 2)].into_iter().collect(),
            failing: vec![2],
        };
        let buf = SharedBuf::default();
        let summary = run_benchmark(&config, &source, buf.clone()).unwrap();
        assert_eq!(summary.records, 4);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].case, 2);
        assert!(matches!(summary.failures[0].error, ProcessingError::Generator { size: 10, .. }));
        assert!(rows(&buf).iter().all(|row| !row.contains("\t2;10\t")));
        assert!(logs_contain("skipping benchmark case"));
    }

    /// Output that is already closed, like stdout piped into `head` after it exited.
    #[derive(Clone, Default)]
    struct ClosedOutput(Arc<AtomicBool>);

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.0.store(true, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Counts the generated cases. Waits until `closed` has failed a write.
    struct CountingSource {
        closed: Arc<AtomicBool>,
        generated: std::sync::atomic::AtomicUsize,
    }

    impl GraphSource for CountingSource {
        fn generate(&self, _size: usize, _case: usize) -> Result<Graph, ProcessingError> {
            self.generated.fetch_add(1, Ordering::SeqCst);
            let start = Instant::now();
            while !self.closed.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(5) {
                thread::yield_now();
            }
            thread::sleep(Duration::from_millis(20));
            Ok(vec![(0, 1), (1, 2)].into_iter().collect())
        }
    }

    #[test]
    fn closed_output_stops_early_test() {
        let config = BenchmarkConfig {
            sizes: vec![3],
            test_cases: 100,
            threads: Some(2),
            ..BenchmarkConfig::default()
        };
        let out = ClosedOutput::default();
        let source = CountingSource {
            closed: Arc::clone(&out.0),
            generated: Default::default(),
        };
        let result = run_benchmark(&config, &source, out);
        assert!(matches!(result, Err(ProcessingError::Output(_))));
        assert!(source.generated.load(Ordering::SeqCst) < 10);
    }

    #[test]
    fn generator_command_test() {
        assert!(GeneratorCommand::parse("   ").is_err());
        let missing = GeneratorCommand::new("./no-such-generator-binary", Vec::new());
        assert!(matches!(missing.generate(10, 1), Err(ProcessingError::Generator { size: 10, .. })));
    }

    #[cfg(unix)]
    #[test]
    fn generator_command_output_test() {
        let echo = GeneratorCommand::parse("printf 0\\t1\\n1\\t2\\n").unwrap();
        // The size is appended as an unused printf argument.
        let graph = echo.generate(3, 1).unwrap();
        assert_eq!(graph.edges(), &[Edge(0, 1), Edge(1, 2)]);

        let failing = GeneratorCommand::parse("false").unwrap();
        assert!(matches!(failing.generate(3, 1), Err(ProcessingError::Generator { .. })));

        let garbage = GeneratorCommand::parse("echo not-an-edge").unwrap();
        assert!(matches!(garbage.generate(3, 1), Err(ProcessingError::GeneratorOutput { .. })));
    }

    #[test]
    fn solve_single_test() {
        let graph: Graph = vec![(0, 1), (1, 2), (2, 0)].into_iter().collect();
        for algorithm in ALL_ALGORITHMS {
            let cover = solve_single(*algorithm, &graph, 8);
            assert_eq!(cover, solve_single(*algorithm, &graph, 8));
            assert!(cover.validate(&graph).is_ok());
        }
    }
}

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prefetch_cluster::config::load_json;
use prefetch_cluster::{
    generate_request_dataset, Clusterer, Dataset, KMeans, KMeansParams, SelfOrganizingMap,
    SomParams, SomTestMode,
};

#[derive(Debug, Parser)]
#[command(name = "prefetch-cluster")]
#[command(about = "Cluster request vectors and score them as a prefetcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// k-means clustering
    Kmeans {
        #[command(flatten)]
        input: InputArgs,
        /// Number of clusters
        #[arg(long)]
        k: Option<usize>,
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Self-organizing map
    Som {
        #[command(flatten)]
        input: InputArgs,
        /// Grid side length
        #[arg(long)]
        n: Option<usize>,
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        learning_rate: Option<f64>,
        /// Assign the training set during test, scoring test vectors at the same indices
        #[arg(long)]
        training_parity: bool,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Training vectors, one per line
    #[arg(long, requires = "test", conflicts_with = "synthetic")]
    train: Option<PathBuf>,
    /// Test vectors, one per line
    #[arg(long, requires = "train")]
    test: Option<PathBuf>,
    /// Generate a synthetic request dataset instead of reading files
    #[arg(long)]
    synthetic: bool,
    #[arg(long, default_value_t = 500)]
    synthetic_train: usize,
    #[arg(long, default_value_t = 100)]
    synthetic_test: usize,
    #[arg(long, default_value_t = 64)]
    synthetic_dim: usize,
    #[arg(long, default_value_t = 6)]
    synthetic_patterns: usize,
    /// JSON file with clusterer parameters; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for centroid initialization (and synthetic data)
    #[arg(long)]
    seed: Option<u64>,
    /// Prefetch thresholds to evaluate, comma separated
    #[arg(long, value_delimiter = ',', default_value = "0.5")]
    thresholds: Vec<f64>,
}

impl InputArgs {
    fn load(&self) -> anyhow::Result<Dataset> {
        match (&self.train, &self.test) {
            (Some(train), Some(test)) => Dataset::from_paths(train, test).with_context(|| {
                format!(
                    "failed to load datasets {} / {}",
                    train.display(),
                    test.display()
                )
            }),
            _ if self.synthetic => Ok(generate_request_dataset(
                self.synthetic_train,
                self.synthetic_test,
                self.synthetic_dim,
                self.synthetic_patterns,
                0.05,
                self.seed.unwrap_or(0),
            )?),
            _ => bail!("either --train/--test or --synthetic is required"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Kmeans {
            input,
            k,
            max_iterations,
        } => {
            let data = input.load()?;
            let mut params: KMeansParams = match &input.config {
                Some(path) => load_json(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?,
                None => KMeansParams::default(),
            };
            if let Some(k) = k {
                params.k = k;
            }
            if let Some(max_iterations) = max_iterations {
                params.max_iterations = max_iterations;
            }

            let mut km = KMeans::new(params, &data)?;
            if let Some(seed) = input.seed {
                km = km.with_seed(seed);
            }
            run(&mut km, &input.thresholds)
        }
        Command::Som {
            input,
            n,
            epochs,
            learning_rate,
            training_parity,
        } => {
            let data = input.load()?;
            let mut params: SomParams = match &input.config {
                Some(path) => load_json(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?,
                None => SomParams::default(),
            };
            if let Some(n) = n {
                params.grid_size = n;
            }
            if let Some(epochs) = epochs {
                params.epochs = epochs;
            }
            if let Some(lr) = learning_rate {
                params.initial_learning_rate = lr;
            }
            if training_parity {
                params.test_mode = SomTestMode::TrainingParity;
            }

            let mut som = SelfOrganizingMap::new(params, &data)?;
            if let Some(seed) = input.seed {
                som = som.with_seed(seed);
            }
            run(&mut som, &input.thresholds)
        }
    }
}

fn run(clusterer: &mut dyn Clusterer, thresholds: &[f64]) -> anyhow::Result<()> {
    clusterer.train().context("training failed")?;
    for &threshold in thresholds {
        clusterer.set_prefetch_threshold(threshold)?;
        clusterer.test().context("evaluation failed")?;
        println!("{}", clusterer.report());
    }
    Ok(())
}

//! The end-to-end run: create tables, load a synthetic dataset, time the
//! JOIN formulations, apply the optimization script, time again, verify.
//!
//! Each step is independent. A failing step is logged and recorded in the
//! [`RunSummary`], and the run moves on to the next one.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::connection::{Backend, ConnectionConfig, connect};
use crate::core::{Client, Product, Result};
use crate::generator::{DEFAULT_WINDOW_DAYS, DatasetGenerator, OrderWindow, ProductPool};
use crate::harness::{Measurement, NamedQuery, compare_formulations};
use crate::interface::SqlSession;
use crate::loader::{DEFAULT_CHUNK_SIZE, LoadReport, fetch_product_ids, load_batch, load_chunked};
use crate::script::run_script_file;
use crate::verify::{TABLES, VerificationReport, verify};

pub const ORDERS_JOIN_SQL: &str = include_str!("../sql/queries/orders_join.sql");
pub const ORDERS_CTE_SQL: &str = include_str!("../sql/queries/orders_cte.sql");

/// How many records of each entity kind to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleConfig {
    pub clients: usize,
    pub products: usize,
    pub orders: usize,
}

impl ScaleConfig {
    pub fn new(clients: usize, products: usize, orders: usize) -> Self {
        Self {
            clients,
            products,
            orders,
        }
    }

    /// Few clients and products, a million orders.
    pub fn small() -> Self {
        Self::new(1_000, 1_000, 1_000_000)
    }

    pub fn balanced() -> Self {
        Self::new(10_000, 10_000, 10_000)
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self::small()
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scale: ScaleConfig,
    pub chunk_size: usize,
    pub seed: Option<u64>,
    pub window_days: i64,
    /// Sample order product ids from `1..=products` instead of reading them back.
    pub dense_product_ids: bool,
    pub create_script: PathBuf,
    pub optimize_script: PathBuf,
    pub queries: Vec<NamedQuery>,
}

impl RunConfig {
    /// Defaults with scripts taken from `sql_root/<backend>/`.
    pub fn for_backend(backend: Backend, sql_root: &Path) -> Self {
        let dir = sql_root.join(backend.script_dir());
        Self {
            scale: ScaleConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            seed: None,
            window_days: DEFAULT_WINDOW_DAYS,
            dense_product_ids: false,
            create_script: dir.join("create_tables.sql"),
            optimize_script: dir.join("optimize.sql"),
            queries: default_queries(),
        }
    }

    pub fn scale(mut self, scale: ScaleConfig) -> Self {
        self.scale = scale;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }
}

/// The plain multi-join and its CTE rewrite.
pub fn default_queries() -> Vec<NamedQuery> {
    vec![
        NamedQuery::new("multi-join", ORDERS_JOIN_SQL),
        NamedQuery::new("cte", ORDERS_CTE_SQL),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateTables,
    LoadDataset,
    TimeQueries,
    Optimize,
    RetimeQueries,
    Verify,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateTables => "create tables",
            Self::LoadDataset => "load dataset",
            Self::TimeQueries => "time queries",
            Self::Optimize => "optimize",
            Self::RetimeQueries => "time queries after optimization",
            Self::Verify => "verify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: Step,
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetReport {
    pub clients: LoadReport,
    pub products: LoadReport,
    pub orders: LoadReport,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub steps: Vec<StepOutcome>,
    pub dataset: Option<DatasetReport>,
    pub timings: Vec<Measurement>,
    pub timings_optimized: Vec<Measurement>,
    pub verification: Option<VerificationReport>,
}

impl RunSummary {
    pub fn step(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step)
    }

    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(StepOutcome::succeeded)
    }

    fn record<T>(&mut self, step: Step, outcome: &Result<T>) {
        let error = match outcome {
            Ok(_) => None,
            Err(err) => {
                error!(%step, error = %err, "step failed; continuing");
                Some(err.to_string())
            }
        };
        self.steps.push(StepOutcome { step, error });
    }

    fn record_timings(&mut self, step: Step, measurements: &[Measurement]) {
        let failures: Vec<String> = measurements
            .iter()
            .filter_map(|m| m.outcome.as_ref().err().map(|e| format!("{}: {}", m.name, e)))
            .collect();
        let error = (!failures.is_empty()).then(|| failures.join("; "));
        self.steps.push(StepOutcome { step, error });
    }
}

/// Execute every step in order against the configured database.
pub async fn run(config: &ConnectionConfig, run: &RunConfig) -> RunSummary {
    let database = config.default_database();
    let mut summary = RunSummary::default();

    info!(target = %config.describe(), "starting run");

    let created = run_script_file(config, &run.create_script, database).await;
    summary.record(Step::CreateTables, &created);

    let loaded = load_dataset(config, database, run).await;
    summary.record(Step::LoadDataset, &loaded);
    summary.dataset = loaded.ok();

    let timings = compare_formulations(config, database, &run.queries).await;
    summary.record_timings(Step::TimeQueries, &timings);
    summary.timings = timings;

    let optimized = run_script_file(config, &run.optimize_script, database).await;
    summary.record(Step::Optimize, &optimized);

    let timings = compare_formulations(config, database, &run.queries).await;
    summary.record_timings(Step::RetimeQueries, &timings);
    summary.timings_optimized = timings;

    let verified = verify(config, database, &TABLES).await;
    summary.record(Step::Verify, &verified);
    summary.verification = verified.ok();

    info!(all_succeeded = summary.all_succeeded(), "run finished");
    summary
}

/// Generate the dataset and load it over a single connection.
pub async fn load_dataset(config: &ConnectionConfig, database: Option<&str>, run: &RunConfig) -> Result<DatasetReport> {
    let window = OrderWindow::try_last_days(run.window_days)?;
    let mut generator = match run.seed {
        Some(seed) => DatasetGenerator::seeded(seed),
        None => DatasetGenerator::from_entropy(),
    }
    .with_window(window);

    info!(
        clients = run.scale.clients,
        products = run.scale.products,
        "generating clients and products"
    );
    let clients = generator.clients(run.scale.clients);
    let products = generator.products(run.scale.products);

    let mut session = connect(config, database).await?;
    let outcome = load_all(session.as_mut(), &mut generator, &clients, &products, run).await;
    if let Err(err) = session.close().await {
        error!(error = %err, "failed to close connection");
    }
    outcome
}

async fn load_all<R: rand::Rng>(
    session: &mut dyn SqlSession,
    generator: &mut DatasetGenerator<R>,
    clients: &[Client],
    products: &[Product],
    run: &RunConfig,
) -> Result<DatasetReport> {
    let client_report = load_batch(session, clients).await?;
    let product_report = load_batch(session, products).await?;

    let pool = if run.dense_product_ids {
        ProductPool::Dense(products.len() as i64)
    } else {
        let ids = fetch_product_ids(session).await?;
        if ids.len() != products.len() {
            warn!(
                stored = ids.len(),
                generated = products.len(),
                "opt_products holds rows from earlier runs; sampling from stored ids"
            );
        }
        ProductPool::Known(ids)
    };

    info!(orders = run.scale.orders, "generating orders");
    let orders = generator.orders(run.scale.orders, clients, &pool)?;
    let order_report = load_chunked(session, &orders, run.chunk_size).await?;

    Ok(DatasetReport {
        clients: client_report,
        products: product_report,
        orders: order_report,
    })
}

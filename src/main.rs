use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use optbench::connection::ConnectionConfig;
use optbench::generator::DEFAULT_WINDOW_DAYS;
use optbench::harness::{NamedQuery, print_measurements};
use optbench::loader::DEFAULT_CHUNK_SIZE;
use optbench::pipeline::{self, RunConfig, ScaleConfig};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// 1,000 clients, 1,000 products, 1,000,000 orders
    Small,
    /// 10,000 of each
    Balanced,
}

#[derive(Parser)]
#[command(name = "optbench")]
#[command(about = "Fill the opt_* tables with synthetic data and time JOIN formulations")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Preset::Small)]
    preset: Preset,
    #[arg(long)]
    clients: Option<usize>,
    #[arg(long)]
    products: Option<usize>,
    #[arg(long)]
    orders: Option<usize>,
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Seed for reproducible field values (client ids stay unique per run)
    #[arg(long)]
    seed: Option<u64>,
    /// Days of history order dates are drawn from
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS, value_parser = clap::value_parser!(i64).range(1..))]
    window_days: i64,
    /// Sample order product ids from 1..=products instead of reading them back
    #[arg(long)]
    dense_product_ids: bool,
    /// Overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
    /// Root holding mysql/ and sqlite/ script directories
    #[arg(long, default_value = "sql")]
    sql_dir: PathBuf,
    #[arg(long)]
    create_script: Option<PathBuf>,
    #[arg(long)]
    optimize_script: Option<PathBuf>,
    #[arg(long)]
    join_query: Option<PathBuf>,
    #[arg(long)]
    cte_query: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_environment();

    let cli = Cli::parse();

    let mut config = ConnectionConfig::from_env().context("failed to load connection settings")?;
    if let Some(url) = &cli.database_url {
        config = config.url(url);
    }
    config.validate().context("invalid connection settings")?;

    let run_config = build_run_config(&cli, &config).await?;
    info!(
        target = %config.describe(),
        clients = run_config.scale.clients,
        products = run_config.scale.products,
        orders = run_config.scale.orders,
        chunk_size = run_config.chunk_size,
        "configuration loaded"
    );

    let summary = pipeline::run(&config, &run_config).await;

    println!();
    print_measurements("Query timings", &summary.timings);
    print_measurements("Query timings after optimization", &summary.timings_optimized);
    println!();
    if let Some(report) = &summary.verification {
        report.print();
    }
    println!();
    for outcome in &summary.steps {
        match &outcome.error {
            None => println!("  [ok]     {}", outcome.step),
            Some(err) => println!("  [failed] {}: {}", outcome.step, err),
        }
    }

    Ok(())
}

async fn build_run_config(cli: &Cli, config: &ConnectionConfig) -> Result<RunConfig> {
    let preset = match cli.preset {
        Preset::Small => ScaleConfig::small(),
        Preset::Balanced => ScaleConfig::balanced(),
    };
    let scale = ScaleConfig::new(
        cli.clients.unwrap_or(preset.clients),
        cli.products.unwrap_or(preset.products),
        cli.orders.unwrap_or(preset.orders),
    );

    let mut run_config = RunConfig::for_backend(config.backend(), &cli.sql_dir)
        .scale(scale)
        .chunk_size(cli.chunk_size);
    run_config.seed = cli.seed;
    run_config.window_days = cli.window_days;
    run_config.dense_product_ids = cli.dense_product_ids;

    if let Some(path) = &cli.create_script {
        run_config.create_script = path.clone();
    }
    if let Some(path) = &cli.optimize_script {
        run_config.optimize_script = path.clone();
    }
    if let Some(path) = &cli.join_query {
        run_config.queries[0] = load_query("multi-join", path).await?;
    }
    if let Some(path) = &cli.cte_query {
        run_config.queries[1] = load_query("cte", path).await?;
    }

    Ok(run_config)
}

async fn load_query(name: &str, path: &Path) -> Result<NamedQuery> {
    let sql = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read query {}", path.display()))?;
    Ok(NamedQuery::new(name, sql))
}

/// Load `.env` before the subscriber so RUST_LOG can come from it.
fn init_environment() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("optbench=info"))
}

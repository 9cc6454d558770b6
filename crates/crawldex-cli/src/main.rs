mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use crawldex_core::ProductSort;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crawldex-cli")]
#[command(about = "Browse crawler result records from the command line")]
struct Cli {
    /// Results directory; defaults to `CRAWLDEX_RESULTS_DIR`.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List result records, newest crawl first.
    List,
    /// Print a record exactly as stored.
    Show { filename: String },
    /// Per-source counts and price statistics for a record.
    Stats { filename: String },
    /// Filter, sort and page through the products of a record.
    Products {
        filename: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long, value_enum, default_value_t = SortArg::PriceAsc)]
        sort: SortArg,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        per_page: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    PriceAsc,
    PriceDesc,
    TitleAsc,
    Source,
}

impl From<SortArg> for ProductSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::PriceAsc => ProductSort::PriceAsc,
            SortArg::PriceDesc => ProductSort::PriceDesc,
            SortArg::TitleAsc => ProductSort::TitleAsc,
            SortArg::Source => ProductSort::Source,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Arguments first, so `--help` works even with a broken environment.
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = crawldex_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.dir.unwrap_or(config.results_dir);
    let store = crawldex_catalog::ResultStore::new(dir);
    tracing::debug!(dir = %store.dir().display(), "using results directory");

    let output = commands::run(cli.command, &store, config.page_size)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

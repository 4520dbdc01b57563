use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::download::DEFAULT_ENDPOINT;

#[derive(Parser, Debug)]
#[command(
    name = "dblp-loader",
    version,
    about = "Load the dblp HCI export into a local document store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Load(LoadArgs),
    Download(DownloadArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[arg(long, env = "DBLP_COLLECTION", default_value = "dblp_hci_records")]
    pub collection: String,

    #[arg(long, env = "DBLP_SOURCE_FILE", default_value = "dblp/20250406_hci.tsv")]
    pub file: PathBuf,

    #[arg(long, env = "DBLP_DB_PATH", default_value = ".cache/dblp/venuelens.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, env = "DBLP_SPARQL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value_t = 10_000)]
    pub batch_size: usize,

    #[arg(long)]
    pub max_rows: Option<u64>,

    #[arg(long, default_value_t = 1000)]
    pub progress_interval_ms: u64,

    #[arg(long, default_value_t = false)]
    pub offline: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    #[arg(long, env = "DBLP_SOURCE_FILE", default_value = "dblp/20250406_hci.tsv")]
    pub file: PathBuf,

    #[arg(long, env = "DBLP_SPARQL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, env = "DBLP_COLLECTION", default_value = "dblp_hci_records")]
    pub collection: String,

    #[arg(long, env = "DBLP_DB_PATH", default_value = ".cache/dblp/venuelens.sqlite")]
    pub db_path: PathBuf,
}

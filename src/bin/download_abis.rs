//! Fetch the BondingManager and RoundsManager ABIs from the published Arbitrum deployments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reward_watcher::{
    DEFAULT_ABI_DIR,
    abi::{DEPLOYMENTS_URL, download_abis},
};
use tracing_subscriber::EnvFilter;

/// Download the contract ABIs the reward watcher needs.
#[derive(Parser, Debug)]
#[command(name = "download-abis", version)]
struct Args {
    /// Directory to write the ABI files into
    #[arg(long, default_value = DEFAULT_ABI_DIR)]
    out_dir: PathBuf,

    /// Base URL of the deployment records
    #[arg(long, default_value = DEPLOYMENTS_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let client = reqwest::Client::new();

    download_abis(&client, &args.base_url, &args.out_dir).await.context("ABI download failed")?;

    Ok(())
}

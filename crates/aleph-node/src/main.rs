//! Runs a single committee process: loads its identity from a TOML
//! configuration file, spawns the arbiter and scheduler tasks, and runs
//! until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aleph_node::config::ProcessConfigFile;
use aleph_node::container::Node;

/// Runs one process of an Aleph committee.
#[derive(Parser, Debug)]
#[command(name = "aleph-node")]
#[command(about = "Runs one process of a leaderless asynchronous BFT ordering committee")]
struct Args {
    /// Path to this process's TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// `tracing` filter directive, e.g. `info` or `aleph_poset=debug,info`.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let file = ProcessConfigFile::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let identity = file.into_identity().context("validating process configuration")?;

    info!(
        own_id = identity.config.own_id.0,
        committee_size = identity.config.committee_size.0,
        threshold = identity.config.threshold,
        "starting aleph-node"
    );

    let node = Node::spawn(identity);

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutdown signal received, stopping tasks");
    node.shut_down().await;
    info!("all tasks stopped");

    Ok(())
}

//! `dagma` - list and materialize pipeline assets from the command line.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dagma::{AssetKey, DagmaConfig, Definitions, Materialization, RuntimeConfig};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dagma", version, about = "Materialize dagma pipeline assets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print assets, jobs, schedules and partitions.
    List,
    /// Run the named assets, or every asset with `--all`.
    Materialize {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        assets: Vec<String>,
        #[arg(long)]
        all: bool,
    },
    /// Run a defined job.
    Job { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `DAGMA_LOG` may come from `.env`, so read it before the subscriber
    // exists. Configuration is loaded afterwards so its logs are kept.
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_env("DAGMA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(RuntimeConfig::default().log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .json()
        .init();

    let config = DagmaConfig::from_env().context("loading configuration")?;

    let defs = Definitions::from_config(&config).context("building resources")?;

    let run = match cli.command {
        Command::List => {
            println!("{}", serde_json::to_string_pretty(&listing(&defs))?);
            return Ok(());
        }
        Command::Materialize { all: true, .. } => defs.materialize_all().await?,
        Command::Materialize { assets, .. } => {
            let selection = assets
                .iter()
                .map(|name| name.parse::<AssetKey>())
                .collect::<Result<Vec<_>, _>>()?;
            defs.materialize(&selection).await?
        }
        Command::Job { name } => defs.materialize_job(&name).await?,
    };

    println!("{}", serde_json::to_string_pretty(&summary(&run))?);
    if let Some((asset, err)) = run.failure() {
        bail!("asset {asset} failed: {err}");
    }
    Ok(())
}

fn listing(defs: &Definitions) -> Value {
    let assets: Vec<Value> = defs
        .assets
        .iter()
        .map(|key| {
            json!({
                "name": key.name(),
                "group": key.group(),
                "description": key.description(),
                "deps": key.deps().iter().map(|dep| dep.name()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "assets": assets,
        "jobs": defs.jobs,
        "schedules": defs.schedules,
        "partitions": defs.partitions,
    })
}

fn summary(run: &Materialization) -> Value {
    let assets: Vec<Value> = run
        .materialized()
        .map(|m| json!({ "asset": m.asset, "value": m.value, "metadata": m.metadata }))
        .collect();
    json!({
        "success": run.success(),
        "failed": run.failure().map(|(asset, err)| json!({ "asset": asset, "error": err.to_string() })),
        "assets": assets,
    })
}

//! CEP resolver service.
//!
//! Answers `GET /?cep=<postal code>` by racing two upstream providers.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    CEP RESOLVER                       │
//!                      │                                                       │
//!   GET /?cep=...      │  ┌─────────┐    ┌──────────────────┐                 │
//!   ───────────────────┼─▶│  http   │───▶│ RaceCoordinator  │──┬──▶ BrasilAPI ─┼──▶
//!                      │  │ server  │    │ (deadline, fail- │  │              │
//!                      │  └─────────┘    │  fast selection) │  └──▶ ViaCep ────┼──▶
//!                      │       ▲         └────────┬─────────┘                 │
//!   JSON / status      │       │                  │ first outcome             │
//!   ◀──────────────────┼───────┘         ┌────────▼─────────┐                 │
//!                      │                 │ AddressRecord    │                 │
//!                      │                 │ normalization    │                 │
//!                      │                 └──────────────────┘                 │
//!                      │                                                       │
//!                      │  config (toml + reload) · observability · lifecycle   │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use cep_resolver::lifecycle::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "cep-resolver")]
#[command(about = "Resolve Brazilian postal codes by racing BrasilAPI and ViaCep", long_about = None)]
struct Args {
    /// Path to a TOML configuration file (watched for changes).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    lifecycle::run(StartupOptions {
        config_path: args.config,
        bind_address: args.bind,
    })
    .await?;

    Ok(())
}

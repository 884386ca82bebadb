// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use anyhow::{Context, Result};
use axial::{Axial, AxisOverrides, ResolutionStatus};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "axial-chart-demo")]
#[command(about = "Resolve chart axes for a query response and print the chart plan as JSON")]
struct Cli {
    /// Query response (`{"sql": ..., "results": [...]}`); stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Resolver configuration; falls back to `AXIAL_CONFIG`, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    x_key: Option<String>,
    #[arg(long)]
    y_key: Option<String>,
    #[arg(long, default_value_t = false)]
    pretty: bool,
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let engine = match args
        .config
        .clone()
        .or_else(|| std::env::var_os("AXIAL_CONFIG").map(PathBuf::from))
    {
        Some(path) => Axial::from_toml_file(&path)
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .with_context(|| format!("loading {}", path.display()))?,
        None => Axial::new(),
    };
    debug!(config = ?engine.config(), "Resolver configuration in effect");

    let body = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading query response from stdin")?;
            buf
        }
    };

    let overrides = AxisOverrides {
        x_key: args.x_key,
        y_key: args.y_key,
    };
    let plan = engine
        .plan_json(&body, &overrides)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    info!(summary = %plan.summary(), "Chart plan built");

    match plan.status() {
        ResolutionStatus::Resolved => {}
        ResolutionStatus::Empty => eprintln!("No rows returned; nothing to chart."),
        ResolutionStatus::Unresolved => eprintln!("Cannot chart this result."),
    }
    let out = if args.pretty {
        serde_json::to_string_pretty(&plan)?
    } else {
        serde_json::to_string(&plan)?
    };
    println!("{out}");
    Ok(())
}

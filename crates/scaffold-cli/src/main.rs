// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `scaffold` - run template automation requests from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod runtime;

/// Create and destroy repositories from templates.
#[derive(Parser, Debug)]
#[command(name = "scaffold", about = "Template automation engine", version)]
struct Args {
	/// Log filter used when RUST_LOG is unset
	#[arg(long, env = "SCAFFOLD_LOG", default_value = "info", global = true)]
	log_level: String,

	/// Emit logs as JSON
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Execute one create or destroy request and print the JSON response
	Run {
		/// Request file, or `-` for stdin
		#[arg(short, long, default_value = "-")]
		request: PathBuf,
	},
	/// Show version and build information
	Version,
}

fn init_tracing(level: &str, json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	let registry = tracing_subscriber::registry().with(filter);

	// stdout carries the response only.
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

fn version_info() -> String {
	format!(
		"scaffold version: {}\nPlatform:          {}-{}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	let request_path = match args.command {
		Command::Version => {
			println!("{}", version_info());
			return Ok(ExitCode::SUCCESS);
		}
		Command::Run { request } => request,
	};

	init_tracing(&args.log_level, args.json);

	let raw = runtime::read_request(&request_path)?;
	let context = runtime::build_context().await?;
	tracing::info!(invocation_id = %context.invocation_id(), "starting scaffold");

	let response = context.run(&raw).await;
	println!("{}", serde_json::to_string_pretty(&response)?);

	Ok(ExitCode::from(runtime::exit_code(response.status())))
}

pub mod request_file;

use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr};
use serde_json::Value;

use gexp_config::Config;
use gexp_explore::{ExploreSettings, Explorer, MemoryBackend};
use gexp_request::{GraphExploreRequest, wire};

use crate::request_file::RequestFile;

#[derive(Debug, Parser)]
#[command(
	version = gexp_cli::VERSION,
	rename_all = "kebab",
	styles = gexp_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// Report every structural problem in a request file.
	Validate {
		#[arg(long, short = 'r', value_name = "FILE")]
		request: PathBuf,
	},
	/// Encode a request file into the binary wire format.
	Encode {
		#[arg(long, short = 'r', value_name = "FILE")]
		request: PathBuf,
		#[arg(long, short = 'o', value_name = "FILE")]
		output: PathBuf,
	},
	/// Decode a binary payload and print its contents.
	Decode {
		#[arg(long, short = 'i', value_name = "FILE")]
		input: PathBuf,
	},
	/// Run a request against a JSON corpus held in memory.
	Explore {
		#[arg(long, short = 'r', value_name = "FILE")]
		request: PathBuf,
		#[arg(long, value_name = "FILE")]
		corpus: PathBuf,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = load_config(args.config.as_deref())?;

	gexp_cli::init_tracing(&config.service.log_level);

	match args.command {
		Command::Validate { request } => {
			let request = load_request(&request, &config)?;

			ensure_valid(&request)?;

			println!("Request is valid: {request}.");
		},
		Command::Encode { request, output } => {
			let request = load_request(&request, &config)?;

			ensure_valid(&request)?;

			let bytes = wire::encode(&request)?;

			fs::write(&output, &bytes)
				.wrap_err_with(|| format!("Failed to write payload to {output:?}."))?;
			tracing::info!(bytes = bytes.len(), hops = request.hop_count(), "Request encoded.");
		},
		Command::Decode { input } => {
			let bytes =
				fs::read(&input).wrap_err_with(|| format!("Failed to read payload at {input:?}."))?;
			let request = wire::decode(&bytes)?;

			println!("{}", serde_json::to_string_pretty(&describe(&request))?);
		},
		Command::Explore { request, corpus } => {
			let request = load_request(&request, &config)?;
			let raw = fs::read_to_string(&corpus)
				.wrap_err_with(|| format!("Failed to read corpus at {corpus:?}."))?;
			let backend = MemoryBackend::from_json(&raw)?;
			let settings = ExploreSettings::from_config(&config.explore)?;
			let plan = request.freeze()?;

			tracing::info!(documents = backend.len(), plan = %plan, "Exploring.");

			let response = Explorer::new(backend, settings).explore(&plan).await?;

			println!("{}", serde_json::to_string_pretty(&response)?);
		},
	}

	Ok(())
}

pub fn load_config(path: Option<&Path>) -> color_eyre::Result<Config> {
	match path {
		Some(path) => Ok(gexp_config::load(path)?),
		None => Ok(Config {
			service: gexp_config::Service { log_level: "info".to_string() },
			sampling: Default::default(),
			explore: Default::default(),
		}),
	}
}

pub fn load_request(path: &Path, config: &Config) -> color_eyre::Result<GraphExploreRequest> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read request file at {path:?}."))?;
	let file = RequestFile::from_json(&raw)
		.wrap_err_with(|| format!("Failed to parse request file at {path:?}."))?;

	Ok(file.into_request(&config.sampling)?)
}

fn ensure_valid(request: &GraphExploreRequest) -> color_eyre::Result<()> {
	let errors = request.validate();

	if errors.is_empty() {
		return Ok(());
	}

	for error in &errors {
		eprintln!("- {error}");
	}

	Err(eyre::eyre!("Request has {} validation error(s).", errors.len()))
}

/// A JSON view of a request, including the parent link of every hop.
pub fn describe(request: &GraphExploreRequest) -> Value {
	let hops = request
		.hops()
		.iter()
		.map(|hop| {
			let vertices = hop
				.vertices()
				.iter()
				.map(|vertex| {
					serde_json::json!({
						"field": vertex.field(),
						"size": vertex.size(),
						"min_doc_count": vertex.min_doc_count(),
						"shard_min_doc_count": vertex.shard_min_doc_count(),
						"include": vertex
							.includes()
							.map(|include| serde_json::json!({
								"term": include.term(),
								"boost": include.boost(),
							}))
							.collect::<Vec<_>>(),
						"exclude": vertex.excludes().collect::<Vec<_>>(),
					})
				})
				.collect::<Vec<_>>();
			let sampling = hop.effective_sampling(request.sampling());

			serde_json::json!({
				"hop": hop.id().index(),
				"parent": hop.parent().map(|parent| parent.index()),
				"query": hop.guiding_query(),
				"sampling": {
					"sample_size": sampling.sample_size(),
					"diversity_field": sampling.diversity_field(),
					"max_docs_per_diversity_value": sampling.max_docs_per_diversity_value(),
					"strategy": sampling.strategy().as_str(),
				},
				"vertices": vertices,
			})
		})
		.collect::<Vec<_>>();
	let options = request.indices_options();

	serde_json::json!({
		"indices": request.indices(),
		"indices_options": {
			"ignore_unavailable": options.ignore_unavailable,
			"allow_no_indices": options.allow_no_indices,
			"expand_wildcards_open": options.expand_wildcards_open,
			"expand_wildcards_closed": options.expand_wildcards_closed,
		},
		"types": request.types(),
		"routing": request.routing(),
		"timeout_ms": request
			.timeout()
			.map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
		"return_detailed_info": request.return_detailed_info(),
		"validation_errors": request.validate(),
		"hops": hops,
	})
}

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Explore, Sampling, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.sampling.sample_size == 0 {
		return Err(Error::Validation {
			message: "sampling.sample_size must be greater than zero.".to_string(),
		});
	}
	if cfg.sampling.max_docs_per_diversity_value > 0 && cfg.sampling.diversity_field.is_none() {
		return Err(Error::Validation {
			message: "sampling.max_docs_per_diversity_value requires sampling.diversity_field."
				.to_string(),
		});
	}
	if !matches!(cfg.explore.dedup.as_str(), "ancestors" | "off") {
		return Err(Error::Validation {
			message: "explore.dedup must be one of ancestors or off.".to_string(),
		});
	}
	if cfg.explore.max_hops == 0 {
		return Err(Error::Validation {
			message: "explore.max_hops must be greater than zero.".to_string(),
		});
	}
	if cfg.explore.timeout_grace_ms == 0 {
		return Err(Error::Validation {
			message: "explore.timeout_grace_ms must be greater than zero.".to_string(),
		});
	}

	if let Some(timeout) = cfg.explore.default_timeout_ms
		&& timeout == 0
	{
		return Err(Error::Validation {
			message: "explore.default_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.sampling.diversity_field.as_deref().map(|field| field.trim().is_empty()).unwrap_or(false)
	{
		cfg.sampling.diversity_field = None;
	}

	cfg.explore.dedup = cfg.explore.dedup.trim().to_ascii_lowercase();
}

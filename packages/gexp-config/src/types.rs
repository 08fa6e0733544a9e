use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub sampling: Sampling,
	#[serde(default)]
	pub explore: Explore,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

/// Request-level sampling defaults. Requests that never touch a sampling setter inherit these
/// when built through the CLI.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
	pub sample_size: u32,
	pub use_significance: bool,
	pub diversity_field: Option<String>,
	/// Zero means unbounded.
	pub max_docs_per_diversity_value: u32,
}
impl Default for Sampling {
	fn default() -> Self {
		Self {
			sample_size: 100,
			use_significance: true,
			diversity_field: None,
			max_docs_per_diversity_value: 0,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Explore {
	/// One of "ancestors" or "off".
	pub dedup: String,
	pub default_timeout_ms: Option<u64>,
	/// How long a hop may run past the soft budget before its call is abandoned.
	pub timeout_grace_ms: u64,
	pub max_hops: u32,
}
impl Default for Explore {
	fn default() -> Self {
		Self {
			dedup: "ancestors".to_string(),
			default_timeout_ms: None,
			timeout_grace_ms: 5_000,
			max_hops: 16,
		}
	}
}

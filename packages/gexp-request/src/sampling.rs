use crate::{Error, Result};

/// Shard-level sample size used when neither the request nor the hop sets one.
pub const DEFAULT_SAMPLE_SIZE: u32 = 100;

/// How candidate terms are ranked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoringStrategy {
	/// Frequency in the sample compared with background frequency in the corpus.
	Significance,
	/// Plain frequency in the sample.
	Popularity,
}
impl ScoringStrategy {
	pub fn from_flag(use_significance: bool) -> Self {
		if use_significance { Self::Significance } else { Self::Popularity }
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Significance => "significance",
			Self::Popularity => "popularity",
		}
	}
}

/// Fully resolved sampling settings for one hop.
///
/// `sample_size` bounds how many top-matching documents per shard are inspected. Values below
/// roughly fifty give little evidence for significance comparisons, and values in the
/// thousands dilute good matches with noise and cost more background lookups. Neither end is
/// clamped here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplingPolicy {
	pub(crate) sample_size: u32,
	pub(crate) diversity_field: Option<String>,
	pub(crate) max_docs_per_diversity_value: u32,
	pub(crate) use_significance: bool,
}
impl SamplingPolicy {
	pub fn sample_size(&self) -> u32 {
		self.sample_size
	}

	pub fn diversity_field(&self) -> Option<&str> {
		self.diversity_field.as_deref()
	}

	/// Zero means unbounded. Ignored without a diversity field.
	pub fn max_docs_per_diversity_value(&self) -> u32 {
		self.max_docs_per_diversity_value
	}

	pub fn use_significance(&self) -> bool {
		self.use_significance
	}

	pub fn strategy(&self) -> ScoringStrategy {
		ScoringStrategy::from_flag(self.use_significance)
	}

	/// The per-value cap when diversification is active.
	pub fn diversity_cap(&self) -> Option<(&str, u32)> {
		match (self.diversity_field.as_deref(), self.max_docs_per_diversity_value) {
			(Some(field), cap) if cap > 0 => Some((field, cap)),
			_ => None,
		}
	}
}
impl Default for SamplingPolicy {
	fn default() -> Self {
		Self {
			sample_size: DEFAULT_SAMPLE_SIZE,
			diversity_field: None,
			max_docs_per_diversity_value: 0,
			use_significance: true,
		}
	}
}

/// Hop-local sampling settings. Each present value replaces the request default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplingOverride {
	pub(crate) sample_size: Option<u32>,
	pub(crate) diversity_field: Option<String>,
	pub(crate) max_docs_per_diversity_value: Option<u32>,
	pub(crate) use_significance: Option<bool>,
}
impl SamplingOverride {
	pub fn sample_size(&self) -> Option<u32> {
		self.sample_size
	}

	pub fn diversity_field(&self) -> Option<&str> {
		self.diversity_field.as_deref()
	}

	pub fn max_docs_per_diversity_value(&self) -> Option<u32> {
		self.max_docs_per_diversity_value
	}

	pub fn use_significance(&self) -> Option<bool> {
		self.use_significance
	}

	pub fn is_empty(&self) -> bool {
		self.sample_size.is_none()
			&& self.diversity_field.is_none()
			&& self.max_docs_per_diversity_value.is_none()
			&& self.use_significance.is_none()
	}

	pub fn resolve(&self, defaults: &SamplingPolicy) -> SamplingPolicy {
		SamplingPolicy {
			sample_size: self.sample_size.unwrap_or(defaults.sample_size),
			diversity_field: self
				.diversity_field
				.clone()
				.or_else(|| defaults.diversity_field.clone()),
			max_docs_per_diversity_value: self
				.max_docs_per_diversity_value
				.unwrap_or(defaults.max_docs_per_diversity_value),
			use_significance: self.use_significance.unwrap_or(defaults.use_significance),
		}
	}
}

pub(crate) fn check_sample_size(sample_size: u32) -> Result<u32> {
	if sample_size == 0 {
		return Err(Error::invalid_argument("Sample size must be greater than zero."));
	}

	Ok(sample_size)
}

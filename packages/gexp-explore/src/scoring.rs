use gexp_request::ScoringStrategy;

/// Frequencies of one candidate term in the sample (subset) and the corpus (superset).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TermFrequencies {
	pub subset_freq: u64,
	pub subset_size: u64,
	pub superset_freq: u64,
	pub superset_size: u64,
}

/// Ranks candidate terms. Higher is better; zero or less means "not interesting".
pub trait TermScorer
where
	Self: Send + Sync,
{
	fn name(&self) -> &'static str;

	fn score(&self, freq: &TermFrequencies) -> f64;
}

/// Rewards terms that are proportionally more common in the sample than in the corpus,
/// weighting the absolute probability change by the relative one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignificanceScorer;
impl TermScorer for SignificanceScorer {
	fn name(&self) -> &'static str {
		"significance"
	}

	fn score(&self, freq: &TermFrequencies) -> f64 {
		if freq.subset_size == 0 || freq.superset_size == 0 {
			return 0.0;
		}

		let subset_probability = freq.subset_freq as f64 / freq.subset_size as f64;
		let superset_probability = freq.superset_freq as f64 / freq.superset_size as f64;

		if subset_probability <= 0.0 || superset_probability <= 0.0 {
			return 0.0;
		}

		let absolute_change = subset_probability - superset_probability;

		if absolute_change <= 0.0 {
			return 0.0;
		}

		absolute_change * (subset_probability / superset_probability)
	}
}

/// Plain frequency in the sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct PopularityScorer;
impl TermScorer for PopularityScorer {
	fn name(&self) -> &'static str {
		"popularity"
	}

	fn score(&self, freq: &TermFrequencies) -> f64 {
		freq.subset_freq as f64
	}
}

pub fn scorer_for(strategy: ScoringStrategy) -> &'static dyn TermScorer {
	match strategy {
		ScoringStrategy::Significance => &SignificanceScorer,
		ScoringStrategy::Popularity => &PopularityScorer,
	}
}

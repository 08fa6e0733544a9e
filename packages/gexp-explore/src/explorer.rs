use std::{
	sync::atomic::{AtomicBool, Ordering},
	time::{Duration, Instant},
};

use ahash::AHashSet;
use serde::Serialize;

use gexp_request::{ExplorePlan, Hop, HopChain, SamplingPolicy};

use crate::{
	Error, Result,
	backend::{HopQuery, HopSample, SearchBackend},
	dedup::{DedupPolicy, VisitedTerms},
	scoring::{self, TermFrequencies},
};

/// A term discovered as a node of the exploration graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Vertex {
	pub field: String,
	pub term: String,
	pub weight: f64,
	/// Index of the hop that found the vertex.
	pub depth: usize,
	pub doc_count: u64,
	pub bg_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HopResult {
	pub hop: usize,
	pub strategy: &'static str,
	pub sampled_docs: u64,
	pub vertices: Vec<Vertex>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExploreResponse {
	pub hops: Vec<HopResult>,
	/// The budget ran out and `hops` holds only what completed.
	pub timed_out: bool,
	pub cancelled: bool,
	/// A hop found nothing, so later hops had no seeds and were skipped.
	pub exhausted: bool,
	pub took_ms: u64,
}
impl ExploreResponse {
	pub fn completed_hops(&self) -> usize {
		self.hops.len()
	}

	pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
		self.hops.iter().flat_map(|hop| hop.vertices.iter())
	}
}

#[derive(Clone, Debug)]
pub struct ExploreSettings {
	pub dedup: DedupPolicy,
	/// Used when the plan carries no timeout of its own.
	pub default_timeout: Option<Duration>,
	/// Extra time a hop may take past the remaining budget. Only a backend that ignores the
	/// budget ever hits this; its hop is then abandoned.
	pub timeout_grace: Duration,
	pub max_hops: usize,
}
impl ExploreSettings {
	pub fn from_config(cfg: &gexp_config::Explore) -> Result<Self> {
		Ok(Self {
			dedup: cfg.dedup.parse()?,
			default_timeout: cfg.default_timeout_ms.map(Duration::from_millis),
			timeout_grace: Duration::from_millis(cfg.timeout_grace_ms),
			max_hops: cfg.max_hops as usize,
		})
	}
}
impl Default for ExploreSettings {
	fn default() -> Self {
		Self {
			dedup: DedupPolicy::Ancestors,
			default_timeout: None,
			timeout_grace: Duration::from_secs(5),
			max_hops: 16,
		}
	}
}

/// Cooperative cancellation, checked between hops.
#[derive(Debug, Default)]
pub struct ExploreControl {
	cancelled: AtomicBool,
}
impl ExploreControl {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}
}

/// Runs the hops of a plan in order against a backend.
pub struct Explorer<B> {
	backend: B,
	settings: ExploreSettings,
}
impl<B> Explorer<B>
where
	B: SearchBackend,
{
	pub fn new(backend: B, settings: ExploreSettings) -> Self {
		Self { backend, settings }
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn settings(&self) -> &ExploreSettings {
		&self.settings
	}

	pub async fn explore(&self, plan: &ExplorePlan) -> Result<ExploreResponse> {
		self.explore_with(plan, &ExploreControl::default()).await
	}

	pub async fn explore_with(
		&self,
		plan: &ExplorePlan,
		control: &ExploreControl,
	) -> Result<ExploreResponse> {
		if plan.hop_count() > self.settings.max_hops {
			return Err(Error::InvalidPlan {
				message: format!(
					"Plan has {} hops but at most {} are allowed.",
					plan.hop_count(),
					self.settings.max_hops
				),
			});
		}

		let started = Instant::now();
		let budget = plan.timeout().or(self.settings.default_timeout);
		let request = plan.request();
		let mut visited = VisitedTerms::new(self.settings.dedup);
		let mut response = ExploreResponse::default();

		for hop in plan.hops() {
			let index = hop.id().index();

			if control.is_cancelled() {
				tracing::info!(hop = index, "Exploration cancelled between hops.");

				response.cancelled = true;

				break;
			}

			let remaining = match budget {
				Some(budget) => {
					let Some(remaining) = budget.checked_sub(started.elapsed()) else {
						tracing::warn!(hop = index, ?budget, "Exploration budget spent before hop.");

						response.timed_out = true;

						break;
					};

					Some(remaining)
				},
				None => None,
			};
			let sampling = plan.hop_sampling(index)?;
			let seeds = hop
				.parent()
				.and_then(|parent| response.hops.get(parent.index()))
				.map(|parent| parent.vertices.as_slice())
				.unwrap_or(&[]);
			let query = HopQuery {
				hop: hop.id(),
				indices: request.indices(),
				routing: request.routing(),
				guiding_query: hop.guiding_query(),
				seeds,
				sampling,
				vertices: hop.vertices(),
				remaining,
			};
			let call = self.backend.sample(query);
			// Soft budget: the backend reports partial results itself. Only a call that also
			// outlives the grace period is abandoned.
			let sample = match remaining {
				Some(remaining) => {
					let hard_cap = remaining.saturating_add(self.settings.timeout_grace);

					match tokio::time::timeout(hard_cap, call).await {
						Ok(sample) => sample?,
						Err(_) => {
							tracing::warn!(
								hop = index,
								?hard_cap,
								"Hop ignored the exploration budget; abandoning it."
							);

							response.timed_out = true;

							break;
						},
					}
				},
				None => call.await?,
			};
			let vertices = select_vertices(plan.hops(), hop, sampling, &sample, &visited)?;

			tracing::debug!(
				hop = index,
				strategy = sampling.strategy().as_str(),
				sampled_docs = sample.sampled_docs,
				vertices = vertices.len(),
				"Hop completed."
			);

			visited.record(hop.id(), &vertices);

			let found_nothing = vertices.is_empty();

			response.hops.push(HopResult {
				hop: index,
				strategy: sampling.strategy().as_str(),
				sampled_docs: sample.sampled_docs,
				vertices,
			});

			if sample.timed_out {
				tracing::warn!(hop = index, "Backend returned partial results after a timeout.");

				response.timed_out = true;

				break;
			}
			if found_nothing && index + 1 < plan.hop_count() {
				tracing::info!(hop = index, "Hop found no vertices; stopping early.");

				response.exhausted = true;

				break;
			}
		}

		response.took_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

		Ok(response)
	}
}

fn select_vertices(
	chain: &HopChain,
	hop: &Hop,
	sampling: &SamplingPolicy,
	sample: &HopSample,
	visited: &VisitedTerms,
) -> Result<Vec<Vertex>> {
	if sample.terms_by_vertex.len() != hop.vertices().len() {
		return Err(Error::Backend {
			message: format!(
				"Backend returned terms for {} vertex requests but the hop has {}.",
				sample.terms_by_vertex.len(),
				hop.vertices().len()
			),
		});
	}

	let scorer = scoring::scorer_for(sampling.strategy());
	let mut in_hop = AHashSet::new();
	let mut selected = Vec::new();

	for (spec, terms) in hop.vertices().iter().zip(&sample.terms_by_vertex) {
		let mut candidates = terms
			.iter()
			.filter(|stats| spec.admits(&stats.term))
			.filter(|stats| stats.doc_count >= u64::from(spec.min_doc_count()))
			.filter(|stats| !visited.seen_by_ancestors(chain, hop.id(), spec.field(), &stats.term))
			.filter_map(|stats| {
				let freq = TermFrequencies {
					subset_freq: stats.doc_count,
					subset_size: sample.sampled_docs,
					superset_freq: stats.bg_count,
					superset_size: sample.corpus_docs,
				};
				let boost = f64::from(spec.boost_for(&stats.term).unwrap_or(1.0));
				let weight = scorer.score(&freq) * boost;

				(weight > 0.0).then(|| Vertex {
					field: spec.field().to_string(),
					term: stats.term.clone(),
					weight,
					depth: hop.id().index(),
					doc_count: stats.doc_count,
					bg_count: stats.bg_count,
				})
			})
			.collect::<Vec<_>>();

		candidates.sort_by(|lhs, rhs| {
			rhs.weight.total_cmp(&lhs.weight).then_with(|| lhs.term.cmp(&rhs.term))
		});
		candidates.truncate(spec.size() as usize);

		for vertex in candidates {
			if in_hop.insert((vertex.field.clone(), vertex.term.clone())) {
				selected.push(vertex);
			}
		}
	}

	Ok(selected)
}

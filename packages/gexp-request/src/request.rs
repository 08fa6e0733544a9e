use std::{fmt, time::Duration};

use crate::{
	Error, Hop, HopChain, IndicesOptions, QueryDescriptor, Result, SamplingPolicy,
	sampling::check_sample_size, timeout::parse_time_value, validate,
};

/// Criteria that guide the exploration of connected terms which can be returned as a graph.
///
/// This is the mutable building phase. Once [`GraphExploreRequest::freeze`] succeeds the
/// request becomes an [`ExplorePlan`], which cannot be changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphExploreRequest {
	pub(crate) indices: Vec<String>,
	pub(crate) indices_options: IndicesOptions,
	pub(crate) types: Vec<String>,
	pub(crate) routing: Option<String>,
	pub(crate) timeout: Option<Duration>,
	pub(crate) sampling: SamplingPolicy,
	pub(crate) return_detailed_info: bool,
	pub(crate) hops: HopChain,
}
impl GraphExploreRequest {
	pub fn new() -> Self {
		Self::default()
	}

	/// A request against `indices`. No indices means all indices.
	pub fn with_indices<I, S>(indices: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut request = Self::new();

		request.set_indices(indices);

		request
	}

	pub fn indices(&self) -> &[String] {
		&self.indices
	}

	pub fn set_indices<I, S>(&mut self, indices: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.indices = indices.into_iter().map(Into::into).collect();

		self
	}

	pub fn indices_options(&self) -> IndicesOptions {
		self.indices_options
	}

	pub fn set_indices_options(&mut self, options: IndicesOptions) -> &mut Self {
		self.indices_options = options;

		self
	}

	pub fn types(&self) -> &[String] {
		&self.types
	}

	pub fn set_types<I, S>(&mut self, types: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.types = types.into_iter().map(Into::into).collect();

		self
	}

	pub fn routing(&self) -> Option<&str> {
		self.routing.as_deref()
	}

	pub fn set_routing(&mut self, routing: impl Into<String>) -> &mut Self {
		self.routing = Some(routing.into());

		self
	}

	/// Joins several routing values with commas.
	pub fn set_routings(&mut self, routings: &[&str]) -> &mut Self {
		self.routing = Some(routings.join(","));

		self
	}

	pub fn clear_routing(&mut self) -> &mut Self {
		self.routing = None;

		self
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}

	/// Exploration stops after this budget. Searches inside a hop only get the remaining time
	/// and may still overrun, since their timeouts are best effort. Partial results are
	/// returned when the budget runs out.
	pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
		self.timeout = Some(timeout);

		self
	}

	pub fn set_timeout_str(&mut self, timeout: &str) -> Result<&mut Self> {
		let timeout = parse_time_value(timeout, "GraphExploreRequest.timeout")?;

		Ok(self.set_timeout(timeout))
	}

	/// Request-level sampling defaults. Hops may override each value.
	pub fn sampling(&self) -> &SamplingPolicy {
		&self.sampling
	}

	pub fn sample_size(&self) -> u32 {
		self.sampling.sample_size
	}

	/// Number of top-matching documents considered per shard in each hop.
	pub fn set_sample_size(&mut self, max_docs_per_hop: u32) -> Result<&mut Self> {
		self.sampling.sample_size = check_sample_size(max_docs_per_hop)?;

		Ok(self)
	}

	pub fn sample_diversity_field(&self) -> Option<&str> {
		self.sampling.diversity_field.as_deref()
	}

	/// Single-value field used to diversify sampled results.
	pub fn set_sample_diversity_field(&mut self, field: impl Into<String>) -> &mut Self {
		self.sampling.diversity_field = Some(field.into());

		self
	}

	pub fn clear_sample_diversity_field(&mut self) -> &mut Self {
		self.sampling.diversity_field = None;

		self
	}

	pub fn max_docs_per_diversity_value(&self) -> u32 {
		self.sampling.max_docs_per_diversity_value
	}

	/// Number of sampled documents allowed to share a diversity value. Only meaningful with a
	/// diversity field.
	pub fn set_max_docs_per_diversity_value(&mut self, max_docs: u32) -> &mut Self {
		self.sampling.max_docs_per_diversity_value = max_docs;

		self
	}

	pub fn use_significance(&self) -> bool {
		self.sampling.use_significance
	}

	/// `true` selects terms by significance, `false` by popularity.
	pub fn set_use_significance(&mut self, value: bool) -> &mut Self {
		self.sampling.use_significance = value;

		self
	}

	pub fn return_detailed_info(&self) -> bool {
		self.return_detailed_info
	}

	pub fn set_return_detailed_info(&mut self, value: bool) -> &mut Self {
		self.return_detailed_info = value;

		self
	}

	/// Adds the next exploration stage, parented to the current last hop.
	pub fn create_next_hop(&mut self, guiding_query: Option<QueryDescriptor>) -> &mut Hop {
		self.hops.append(guiding_query)
	}

	pub fn hop_count(&self) -> usize {
		self.hops.len()
	}

	pub fn hop(&self, index: usize) -> Result<&Hop> {
		self.hops.get(index)
	}

	pub fn hop_mut(&mut self, index: usize) -> Result<&mut Hop> {
		self.hops.get_mut(index)
	}

	pub fn hops(&self) -> &HopChain {
		&self.hops
	}

	pub fn validate(&self) -> Vec<String> {
		validate::validate(self)
	}

	/// Validates and seals the request for execution.
	pub fn freeze(self) -> Result<ExplorePlan> {
		let messages = self.validate();

		if !messages.is_empty() {
			return Err(Error::Validation { messages });
		}

		let sampling = self.hops.iter().map(|hop| hop.effective_sampling(&self.sampling)).collect();

		tracing::debug!(
			hops = self.hops.len(),
			indices = ?self.indices,
			timeout = ?self.timeout,
			"Graph explore request frozen."
		);

		Ok(ExplorePlan { request: self, sampling })
	}
}
impl fmt::Display for GraphExploreRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "graph explore [{}][{}]", self.indices.join(", "), self.types.join(", "))
	}
}

/// A validated request. Read-only, so it can be shared across threads once dispatched.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorePlan {
	request: GraphExploreRequest,
	sampling: Vec<SamplingPolicy>,
}
impl ExplorePlan {
	pub fn request(&self) -> &GraphExploreRequest {
		&self.request
	}

	pub fn hops(&self) -> &HopChain {
		&self.request.hops
	}

	pub fn hop_count(&self) -> usize {
		self.request.hops.len()
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.request.timeout
	}

	/// Effective sampling for the hop at `index`, with hop overrides applied.
	pub fn hop_sampling(&self, index: usize) -> Result<&SamplingPolicy> {
		let count = self.sampling.len();

		self.sampling.get(index).ok_or(Error::HopOutOfRange { index, count })
	}

	/// Returns to the building phase.
	pub fn into_request(self) -> GraphExploreRequest {
		self.request
	}
}
impl fmt::Display for ExplorePlan {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.request, f)
	}
}

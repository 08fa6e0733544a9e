use std::time::Duration;

use gexp_request::{HopId, QueryDescriptor, SamplingPolicy, VertexSpec};

use crate::{BoxFuture, Result, Vertex};

/// Everything a backend needs to sample documents and extract candidate terms for one hop.
#[derive(Clone, Copy, Debug)]
pub struct HopQuery<'a> {
	pub hop: HopId,
	pub indices: &'a [String],
	pub routing: Option<&'a str>,
	pub guiding_query: Option<&'a QueryDescriptor>,
	/// Vertices found by the parent hop. Empty for the first hop.
	pub seeds: &'a [Vertex],
	pub sampling: &'a SamplingPolicy,
	pub vertices: &'a [VertexSpec],
	/// What is left of the exploration budget, if there is one.
	pub remaining: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermStats {
	pub term: String,
	/// Sampled documents containing the term.
	pub doc_count: u64,
	/// Corpus documents containing the term.
	pub bg_count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HopSample {
	pub sampled_docs: u64,
	pub corpus_docs: u64,
	/// One entry per vertex spec of the hop, in the same order.
	pub terms_by_vertex: Vec<Vec<TermStats>>,
	/// Set when the backend hit its deadline and returned what it had.
	pub timed_out: bool,
}

/// The document store seam: runs the guiding query over a sample and reports term
/// statistics. Work inside one call may be parallel; calls for successive hops are not.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn sample<'a>(&'a self, query: HopQuery<'a>) -> BoxFuture<'a, Result<HopSample>>;
}

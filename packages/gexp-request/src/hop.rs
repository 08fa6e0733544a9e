use std::fmt;

use crate::{
	Error, QueryDescriptor, Result, SamplingOverride, SamplingPolicy, VertexSpec,
	sampling::check_sample_size,
};

/// Position of a hop inside its chain. Parent links are stored as ids, never as references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HopId(usize);
impl HopId {
	pub fn index(self) -> usize {
		self.0
	}
}
impl fmt::Display for HopId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "hop#{}", self.0)
	}
}

/// One stage of graph exploration.
#[derive(Clone, Debug, PartialEq)]
pub struct Hop {
	id: HopId,
	parent: Option<HopId>,
	guiding_query: Option<QueryDescriptor>,
	vertices: Vec<VertexSpec>,
	sampling: SamplingOverride,
}
impl Hop {
	fn new(id: HopId, parent: Option<HopId>, guiding_query: Option<QueryDescriptor>) -> Self {
		Self { id, parent, guiding_query, vertices: Vec::new(), sampling: SamplingOverride::default() }
	}

	pub fn id(&self) -> HopId {
		self.id
	}

	/// The hop immediately before this one, or `None` for the first hop.
	pub fn parent(&self) -> Option<HopId> {
		self.parent
	}

	pub fn guiding_query(&self) -> Option<&QueryDescriptor> {
		self.guiding_query.as_ref()
	}

	/// Adds a vertex request for `field` and returns it for further configuration.
	pub fn add_vertex(&mut self, field: impl Into<String>) -> Result<&mut VertexSpec> {
		let spec = VertexSpec::new(field)?;

		Ok(self.push_vertex(spec))
	}

	pub fn push_vertex(&mut self, spec: VertexSpec) -> &mut VertexSpec {
		self.vertices.push(spec);

		let last = self.vertices.len() - 1;

		&mut self.vertices[last]
	}

	pub fn vertices(&self) -> &[VertexSpec] {
		&self.vertices
	}

	pub fn vertex(&self, index: usize) -> Option<&VertexSpec> {
		self.vertices.get(index)
	}

	pub fn vertex_mut(&mut self, index: usize) -> Option<&mut VertexSpec> {
		self.vertices.get_mut(index)
	}

	pub fn sampling(&self) -> &SamplingOverride {
		&self.sampling
	}

	pub fn set_sample_size(&mut self, sample_size: u32) -> Result<&mut Self> {
		self.sampling.sample_size = Some(check_sample_size(sample_size)?);

		Ok(self)
	}

	pub fn set_sample_diversity_field(&mut self, field: impl Into<String>) -> &mut Self {
		self.sampling.diversity_field = Some(field.into());

		self
	}

	pub fn set_max_docs_per_diversity_value(&mut self, max_docs: u32) -> &mut Self {
		self.sampling.max_docs_per_diversity_value = Some(max_docs);

		self
	}

	pub fn set_use_significance(&mut self, value: bool) -> &mut Self {
		self.sampling.use_significance = Some(value);

		self
	}

	pub fn clear_sampling_override(&mut self) -> &mut Self {
		self.sampling = SamplingOverride::default();

		self
	}

	pub(crate) fn set_sampling(&mut self, sampling: SamplingOverride) {
		self.sampling = sampling;
	}

	pub fn effective_sampling(&self, defaults: &SamplingPolicy) -> SamplingPolicy {
		self.sampling.resolve(defaults)
	}
}

/// Ordered hops where every hop after the first is parented to its predecessor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HopChain {
	hops: Vec<Hop>,
}
impl HopChain {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a hop parented to the current last hop. This is the only way hops enter a
	/// chain, so parent links always mirror sequence order.
	pub fn append(&mut self, guiding_query: Option<QueryDescriptor>) -> &mut Hop {
		let id = HopId(self.hops.len());
		let parent = self.hops.last().map(Hop::id);

		self.hops.push(Hop::new(id, parent, guiding_query));

		&mut self.hops[id.0]
	}

	pub fn len(&self) -> usize {
		self.hops.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hops.is_empty()
	}

	pub fn get(&self, index: usize) -> Result<&Hop> {
		let count = self.hops.len();

		self.hops.get(index).ok_or(Error::HopOutOfRange { index, count })
	}

	pub fn get_mut(&mut self, index: usize) -> Result<&mut Hop> {
		let count = self.hops.len();

		self.hops.get_mut(index).ok_or(Error::HopOutOfRange { index, count })
	}

	pub fn last(&self) -> Option<&Hop> {
		self.hops.last()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Hop> {
		self.hops.iter()
	}

	pub fn parent_of(&self, index: usize) -> Result<Option<&Hop>> {
		let hop = self.get(index)?;

		Ok(hop.parent.map(|parent| &self.hops[parent.0]))
	}

	/// Walks the parent chain starting at the parent of `id`, nearest ancestor first.
	pub fn ancestors(&self, id: HopId) -> Ancestors<'_> {
		let next = self.hops.get(id.0).and_then(Hop::parent);

		Ancestors { chain: self, next }
	}
}
impl<'a> IntoIterator for &'a HopChain {
	type IntoIter = std::slice::Iter<'a, Hop>;
	type Item = &'a Hop;

	fn into_iter(self) -> Self::IntoIter {
		self.hops.iter()
	}
}

pub struct Ancestors<'a> {
	chain: &'a HopChain,
	next: Option<HopId>,
}
impl<'a> Iterator for Ancestors<'a> {
	type Item = &'a Hop;

	fn next(&mut self) -> Option<Self::Item> {
		let hop = self.chain.hops.get(self.next?.0)?;

		self.next = hop.parent;

		Some(hop)
	}
}

use std::collections::{BTreeMap, BTreeSet};

use crate::{Error, Result};

pub const DEFAULT_VERTEX_SIZE: u32 = 5;
pub const DEFAULT_MIN_DOC_COUNT: u32 = 3;
pub const DEFAULT_SHARD_MIN_DOC_COUNT: u32 = 2;

/// A term paired with a strictly positive scoring multiplier.
#[derive(Clone, Debug, PartialEq)]
pub struct TermBoost {
	term: String,
	boost: f32,
}
impl TermBoost {
	pub fn new(term: impl Into<String>, boost: f32) -> Result<Self> {
		let term = term.into();

		if term.is_empty() {
			return Err(Error::invalid_argument("Boosted terms must be non-empty."));
		}
		if boost.is_nan() || boost <= 0.0 {
			return Err(Error::invalid_argument("Boosts must be a positive non-zero number."));
		}

		Ok(Self { term, boost })
	}

	pub fn term(&self) -> &str {
		&self.term
	}

	pub fn boost(&self) -> f32 {
		self.boost
	}
}

/// Which field a hop inspects for candidate vertices, and how terms are selected from it.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexSpec {
	field: String,
	includes: BTreeMap<String, TermBoost>,
	excludes: BTreeSet<String>,
	size: u32,
	min_doc_count: u32,
	shard_min_doc_count: u32,
}
impl VertexSpec {
	pub fn new(field: impl Into<String>) -> Result<Self> {
		let field = field.into();

		if field.trim().is_empty() {
			return Err(Error::invalid_argument("Vertex field name must be non-empty."));
		}

		Ok(Self {
			field,
			includes: BTreeMap::new(),
			excludes: BTreeSet::new(),
			size: DEFAULT_VERTEX_SIZE,
			min_doc_count: DEFAULT_MIN_DOC_COUNT,
			shard_min_doc_count: DEFAULT_SHARD_MIN_DOC_COUNT,
		})
	}

	pub fn field(&self) -> &str {
		&self.field
	}

	pub fn size(&self) -> u32 {
		self.size
	}

	/// Maximum number of distinct terms surfaced from this field in one hop.
	pub fn set_size(&mut self, size: u32) -> Result<&mut Self> {
		if size == 0 {
			return Err(Error::invalid_argument(format!(
				"Vertex size for field [{}] must be greater than zero.",
				self.field
			)));
		}

		self.size = size;

		Ok(self)
	}

	pub fn min_doc_count(&self) -> u32 {
		self.min_doc_count
	}

	pub fn set_min_doc_count(&mut self, value: u32) -> &mut Self {
		self.min_doc_count = value;

		self
	}

	pub fn shard_min_doc_count(&self) -> u32 {
		self.shard_min_doc_count
	}

	pub fn set_shard_min_doc_count(&mut self, value: u32) -> &mut Self {
		self.shard_min_doc_count = value;

		self
	}

	pub fn add_include(&mut self, term: impl Into<String>, boost: f32) -> Result<&mut Self> {
		let boost = TermBoost::new(term, boost)?;

		self.push_include(boost)
	}

	pub fn push_include(&mut self, boost: TermBoost) -> Result<&mut Self> {
		if !self.excludes.is_empty() {
			return Err(Error::invalid_argument("Can not have both include and exclude clauses."));
		}

		self.includes.insert(boost.term.clone(), boost);

		Ok(self)
	}

	pub fn add_exclude(&mut self, term: impl Into<String>) -> Result<&mut Self> {
		let term = term.into();

		if !self.includes.is_empty() {
			return Err(Error::invalid_argument("Can not have both include and exclude clauses."));
		}
		if term.is_empty() {
			return Err(Error::invalid_argument("Excluded terms must be non-empty."));
		}

		self.excludes.insert(term);

		Ok(self)
	}

	/// Included terms in term order.
	pub fn includes(&self) -> impl ExactSizeIterator<Item = &TermBoost> {
		self.includes.values()
	}

	pub fn excludes(&self) -> impl ExactSizeIterator<Item = &str> {
		self.excludes.iter().map(String::as_str)
	}

	pub fn has_includes(&self) -> bool {
		!self.includes.is_empty()
	}

	pub fn boost_for(&self, term: &str) -> Option<f32> {
		self.includes.get(term).map(TermBoost::boost)
	}

	/// Whether the include/exclude clauses allow `term` to become a vertex.
	pub fn admits(&self, term: &str) -> bool {
		if self.excludes.contains(term) {
			return false;
		}

		self.includes.is_empty() || self.includes.contains_key(term)
	}
}

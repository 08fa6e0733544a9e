use std::str::FromStr;

use ahash::AHashSet;

use gexp_request::{HopChain, HopId};

use crate::{Error, Vertex};

/// Whether terms found by ancestor hops may be surfaced again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupPolicy {
	/// Skip any (field, term) already found by a hop on the parent chain.
	#[default]
	Ancestors,
	Off,
}
impl DedupPolicy {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ancestors => "ancestors",
			Self::Off => "off",
		}
	}
}
impl FromStr for DedupPolicy {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"ancestors" => Ok(Self::Ancestors),
			"off" => Ok(Self::Off),
			other => Err(Error::Settings { message: format!("Unknown dedup policy {other:?}.") }),
		}
	}
}

/// Vertices found per hop, indexed by hop position.
#[derive(Debug, Default)]
pub struct VisitedTerms {
	policy: DedupPolicy,
	by_hop: Vec<AHashSet<(String, String)>>,
}
impl VisitedTerms {
	pub fn new(policy: DedupPolicy) -> Self {
		Self { policy, by_hop: Vec::new() }
	}

	pub fn record(&mut self, hop: HopId, vertices: &[Vertex]) {
		let index = hop.index();

		if self.by_hop.len() <= index {
			self.by_hop.resize_with(index + 1, AHashSet::new);
		}

		self.by_hop[index]
			.extend(vertices.iter().map(|vertex| (vertex.field.clone(), vertex.term.clone())));
	}

	/// Whether `field:term` was found by an ancestor of `hop` and should be skipped.
	pub fn seen_by_ancestors(&self, chain: &HopChain, hop: HopId, field: &str, term: &str) -> bool {
		if self.policy == DedupPolicy::Off {
			return false;
		}

		let key = (field.to_string(), term.to_string());

		chain
			.ancestors(hop)
			.filter_map(|ancestor| self.by_hop.get(ancestor.id().index()))
			.any(|seen| seen.contains(&key))
	}
}

use serde::Deserialize;
use serde_json::Value;

use gexp_request::{GraphExploreRequest, IndicesOptions, QueryDescriptor};

/// JSON description of a request, converted through the builder so every argument check
/// applies.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestFile {
	pub indices: Vec<String>,
	pub indices_options: Option<IndicesOptionsFile>,
	pub types: Vec<String>,
	pub routing: Option<String>,
	pub timeout: Option<String>,
	pub sample_size: Option<u32>,
	pub sample_diversity_field: Option<String>,
	pub max_docs_per_diversity_value: Option<u32>,
	pub use_significance: Option<bool>,
	pub return_detailed_info: bool,
	pub hops: Vec<HopFile>,
}
impl RequestFile {
	pub fn from_json(raw: &str) -> serde_json::Result<Self> {
		serde_json::from_str(raw)
	}

	/// Builds the request. Values missing from the file fall back to `defaults`.
	pub fn into_request(
		self,
		defaults: &gexp_config::Sampling,
	) -> gexp_request::Result<GraphExploreRequest> {
		let mut request = GraphExploreRequest::with_indices(self.indices);

		request
			.set_types(self.types)
			.set_use_significance(self.use_significance.unwrap_or(defaults.use_significance))
			.set_max_docs_per_diversity_value(
				self.max_docs_per_diversity_value.unwrap_or(defaults.max_docs_per_diversity_value),
			)
			.set_return_detailed_info(self.return_detailed_info);
		request.set_sample_size(self.sample_size.unwrap_or(defaults.sample_size))?;

		if let Some(options) = self.indices_options {
			request.set_indices_options(options.into());
		}
		if let Some(routing) = self.routing {
			request.set_routing(routing);
		}
		if let Some(timeout) = self.timeout {
			request.set_timeout_str(&timeout)?;
		}
		if let Some(field) = self.sample_diversity_field.or_else(|| defaults.diversity_field.clone())
		{
			request.set_sample_diversity_field(field);
		}

		for hop_file in self.hops {
			let hop = request.create_next_hop(hop_file.query.map(QueryDescriptor::new));

			if let Some(sample_size) = hop_file.sample_size {
				hop.set_sample_size(sample_size)?;
			}
			if let Some(field) = hop_file.sample_diversity_field {
				hop.set_sample_diversity_field(field);
			}
			if let Some(max_docs) = hop_file.max_docs_per_diversity_value {
				hop.set_max_docs_per_diversity_value(max_docs);
			}
			if let Some(value) = hop_file.use_significance {
				hop.set_use_significance(value);
			}

			for vertex_file in hop_file.vertices {
				let vertex = hop.add_vertex(vertex_file.field)?;

				if let Some(size) = vertex_file.size {
					vertex.set_size(size)?;
				}
				if let Some(min_doc_count) = vertex_file.min_doc_count {
					vertex.set_min_doc_count(min_doc_count);
				}
				if let Some(shard_min_doc_count) = vertex_file.shard_min_doc_count {
					vertex.set_shard_min_doc_count(shard_min_doc_count);
				}

				for include in vertex_file.include {
					vertex.add_include(include.term, include.boost.unwrap_or(1.0))?;
				}
				for exclude in vertex_file.exclude {
					vertex.add_exclude(exclude)?;
				}
			}
		}

		Ok(request)
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndicesOptionsFile {
	#[serde(default)]
	pub ignore_unavailable: bool,
	#[serde(default)]
	pub allow_no_indices: bool,
	#[serde(default = "default_true")]
	pub expand_wildcards_open: bool,
	#[serde(default)]
	pub expand_wildcards_closed: bool,
}
impl From<IndicesOptionsFile> for IndicesOptions {
	fn from(file: IndicesOptionsFile) -> Self {
		IndicesOptions::from_options(
			file.ignore_unavailable,
			file.allow_no_indices,
			file.expand_wildcards_open,
			file.expand_wildcards_closed,
		)
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HopFile {
	pub query: Option<Value>,
	pub sample_size: Option<u32>,
	pub sample_diversity_field: Option<String>,
	pub max_docs_per_diversity_value: Option<u32>,
	pub use_significance: Option<bool>,
	pub vertices: Vec<VertexFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VertexFile {
	pub field: String,
	pub size: Option<u32>,
	pub min_doc_count: Option<u32>,
	pub shard_min_doc_count: Option<u32>,
	#[serde(default)]
	pub include: Vec<IncludeFile>,
	#[serde(default)]
	pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeFile {
	pub term: String,
	pub boost: Option<f32>,
}

fn default_true() -> bool {
	true
}

//! Positional binary encoding of a [`GraphExploreRequest`].
//!
//! Request layout: indices, indices options flags, types, optional routing, optional
//! timeout, sample size, optional diversity field, max docs per diversity value, use
//! significance, return detailed info, hop count, then each hop in chain order.
//!
//! Hop layout: optional guiding query (JSON text), vertex count, each vertex, then the hop
//! sampling override.
//!
//! Integers are big-endian and unsigned. Counters (sample size, max docs per diversity
//! value, vertex size and doc counts) and collection lengths are `u32`, so values above
//! `i32::MAX` are carried as is.
//!
//! No version tag is carried. New optional fields must be appended at the end of the block
//! they belong to, never inserted, so older payloads keep decoding positionally. Parent
//! links are not transmitted; they are rebuilt from hop order.

pub mod stream;

use std::time::Duration;

pub use stream::{StreamReader, StreamWriter};

use crate::{
	Error, GraphExploreRequest, Hop, IndicesOptions, QueryDescriptor, Result, SamplingOverride,
	TermBoost, VertexSpec,
};

/// Smallest possible encoded hop: absent query marker, vertex count, four absent overrides.
const MIN_HOP_BYTES: usize = 1 + 4 + 4;
/// Smallest possible encoded vertex: a one-byte field name, three counters, two list counts.
const MIN_VERTEX_BYTES: usize = 4 + 1 + 4 * 3 + 4 * 2;

/// Encodes a request. Fails only when a collection is too long for its `u32` length prefix.
pub fn encode(request: &GraphExploreRequest) -> Result<Vec<u8>> {
	let mut out = StreamWriter::new();

	write_request(&mut out, request);

	out.into_bytes()
}

/// Decodes a full payload. Trailing bytes are an error.
pub fn decode(bytes: &[u8]) -> Result<GraphExploreRequest> {
	let mut input = StreamReader::new(bytes);
	let request = read_request(&mut input)?;

	input.finish()?;

	tracing::trace!(
		bytes = bytes.len(),
		hops = request.hop_count(),
		"Decoded graph explore request."
	);

	Ok(request)
}

pub fn write_request(out: &mut StreamWriter, request: &GraphExploreRequest) {
	out.write_string_list(&request.indices);
	out.write_u8(request.indices_options.to_flags());
	out.write_string_list(&request.types);
	out.write_optional_string(request.routing.as_deref());
	out.write_optional(request.timeout, write_duration);
	out.write_u32(request.sampling.sample_size);
	out.write_optional_string(request.sampling.diversity_field.as_deref());
	out.write_u32(request.sampling.max_docs_per_diversity_value);
	out.write_bool(request.sampling.use_significance);
	out.write_bool(request.return_detailed_info);
	out.write_len(request.hops.len());

	for hop in &request.hops {
		write_hop(out, hop);
	}
}

pub fn read_request(input: &mut StreamReader<'_>) -> Result<GraphExploreRequest> {
	let mut request = GraphExploreRequest::new();

	request.indices = input.read_string_list("indices")?;
	request.indices_options = IndicesOptions::from_flags(input.read_u8("indices options")?)?;
	request.types = input.read_string_list("types")?;
	request.routing = input.read_optional_string("routing")?;
	request.timeout = input.read_optional("timeout", read_duration)?;
	request.sampling.sample_size = read_positive(input, "sample size")?;
	request.sampling.diversity_field = input.read_optional_string("sample diversity field")?;
	request.sampling.max_docs_per_diversity_value =
		input.read_u32("max docs per diversity value")?;
	request.sampling.use_significance = input.read_bool("use significance")?;
	request.return_detailed_info = input.read_bool("return detailed info")?;

	let hop_count = input.read_len("hop count", MIN_HOP_BYTES)?;

	for _ in 0..hop_count {
		// Appending in emission order is what re-links each hop to its predecessor.
		let guiding_query = input.read_optional("guiding query", read_query)?;
		let hop = request.create_next_hop(guiding_query);

		read_hop_body(input, hop)?;
	}

	Ok(request)
}

fn write_duration(out: &mut StreamWriter, value: Duration) {
	out.write_u64(value.as_secs());
	out.write_u32(value.subsec_nanos());
}

fn read_duration(input: &mut StreamReader<'_>) -> Result<Duration> {
	let secs = input.read_u64("timeout seconds")?;
	let nanos = input.read_u32("timeout nanos")?;

	if nanos >= 1_000_000_000 {
		return Err(Error::decode(format!("timeout nanos {nanos} out of range")));
	}

	Ok(Duration::new(secs, nanos))
}

fn read_query(input: &mut StreamReader<'_>) -> Result<QueryDescriptor> {
	let raw = input.read_string("guiding query")?;

	QueryDescriptor::from_json(&raw)
		.map_err(|err| Error::decode(format!("guiding query is unreadable: {err}")))
}

fn read_positive(input: &mut StreamReader<'_>, what: &str) -> Result<u32> {
	let value = input.read_u32(what)?;

	if value == 0 {
		return Err(Error::decode(format!("{what} must be greater than zero")));
	}

	Ok(value)
}

fn write_hop(out: &mut StreamWriter, hop: &Hop) {
	out.write_optional(hop.guiding_query(), |out, query| out.write_string(&query.to_json()));
	out.write_len(hop.vertices().len());

	for vertex in hop.vertices() {
		write_vertex(out, vertex);
	}

	write_sampling_override(out, hop.sampling());
}

fn read_hop_body(input: &mut StreamReader<'_>, hop: &mut Hop) -> Result<()> {
	let vertex_count = input.read_len("vertex count", MIN_VERTEX_BYTES)?;

	for _ in 0..vertex_count {
		hop.push_vertex(read_vertex(input)?);
	}

	hop.set_sampling(read_sampling_override(input)?);

	Ok(())
}

fn write_vertex(out: &mut StreamWriter, vertex: &VertexSpec) {
	out.write_string(vertex.field());
	out.write_u32(vertex.size());
	out.write_u32(vertex.min_doc_count());
	out.write_u32(vertex.shard_min_doc_count());
	out.write_len(vertex.includes().len());

	for include in vertex.includes() {
		out.write_string(include.term());
		out.write_f32(include.boost());
	}

	out.write_len(vertex.excludes().len());

	for exclude in vertex.excludes() {
		out.write_string(exclude);
	}
}

fn read_vertex(input: &mut StreamReader<'_>) -> Result<VertexSpec> {
	let field = input.read_string("vertex field")?;
	let mut vertex = VertexSpec::new(field).map_err(reject)?;

	vertex.set_size(input.read_u32("vertex size")?).map_err(reject)?;
	vertex.set_min_doc_count(input.read_u32("vertex min doc count")?);
	vertex.set_shard_min_doc_count(input.read_u32("vertex shard min doc count")?);

	let include_count = input.read_len("vertex includes", 8)?;

	for _ in 0..include_count {
		let term = input.read_string("include term")?;
		let boost = input.read_f32("include boost")?;

		vertex.push_include(TermBoost::new(term, boost).map_err(reject)?).map_err(reject)?;
	}

	let exclude_count = input.read_len("vertex excludes", 4)?;

	for _ in 0..exclude_count {
		vertex.add_exclude(input.read_string("exclude term")?).map_err(reject)?;
	}

	Ok(vertex)
}

fn write_sampling_override(out: &mut StreamWriter, sampling: &SamplingOverride) {
	out.write_optional(sampling.sample_size(), StreamWriter::write_u32);
	out.write_optional_string(sampling.diversity_field());
	out.write_optional(sampling.max_docs_per_diversity_value(), StreamWriter::write_u32);
	out.write_optional(sampling.use_significance(), StreamWriter::write_bool);
}

fn read_sampling_override(input: &mut StreamReader<'_>) -> Result<SamplingOverride> {
	let sample_size =
		input.read_optional("hop sample size", |input| read_positive(input, "hop sample size"))?;
	let diversity_field = input.read_optional_string("hop sample diversity field")?;
	let max_docs_per_diversity_value = input
		.read_optional("hop max docs per diversity value", |input| {
			input.read_u32("hop max docs per diversity value")
		})?;
	let use_significance = input
		.read_optional("hop use significance", |input| input.read_bool("hop use significance"))?;

	Ok(SamplingOverride {
		sample_size,
		diversity_field,
		max_docs_per_diversity_value,
		use_significance,
	})
}

// Construction-time checks still apply to decoded values; surface them as decode errors.
fn reject(err: Error) -> Error {
	match err {
		Error::InvalidArgument { message } => Error::decode(message),
		other => other,
	}
}

//! A document store held in memory. It understands a small subset of guiding queries and is
//! meant for local exploration, fixtures and tests.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use serde_json::Value;

use gexp_request::{QueryDescriptor, SamplingPolicy};

use crate::{
	BoxFuture, Error, Result, Vertex,
	backend::{HopQuery, HopSample, SearchBackend, TermStats},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
	One(String),
	Many(Vec<String>),
}

/// A document as field name to terms. Fields holding a single string are accepted too.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
	fields: BTreeMap<String, Vec<String>>,
}
impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_terms<I, S>(mut self, field: &str, terms: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields.entry(field.to_string()).or_default().extend(terms.into_iter().map(Into::into));

		self
	}

	pub fn terms(&self, field: &str) -> &[String] {
		self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn contains(&self, field: &str, term: &str) -> bool {
		self.terms(field).iter().any(|value| value == term)
	}
}
impl<'de> Deserialize<'de> for Document {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
		let fields = raw
			.into_iter()
			.map(|(field, value)| match value {
				FieldValue::One(term) => (field, vec![term]),
				FieldValue::Many(terms) => (field, terms),
			})
			.collect();

		Ok(Self { fields })
	}
}

#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
	docs: Vec<Document>,
}
impl MemoryBackend {
	pub fn new(docs: Vec<Document>) -> Self {
		Self { docs }
	}

	/// Parses a JSON array of documents.
	pub fn from_json(raw: &str) -> Result<Self> {
		let docs = serde_json::from_str(raw).map_err(|err| Error::Backend {
			message: format!("Failed to parse corpus: {err}."),
		})?;

		Ok(Self::new(docs))
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	fn run(&self, query: &HopQuery<'_>) -> Result<HopSample> {
		let filter = QueryFilter::parse(query.guiding_query)?;
		let sample = self.sample_docs(&filter, query.seeds, query.sampling);
		let mut terms_by_vertex = Vec::with_capacity(query.vertices.len());

		for spec in query.vertices {
			let mut counts: AHashMap<&str, u64> = AHashMap::new();

			for doc in &sample {
				let unique = doc.terms(spec.field()).iter().map(String::as_str).collect::<AHashSet<_>>();

				for term in unique {
					*counts.entry(term).or_default() += 1;
				}
			}

			let mut stats = counts
				.into_iter()
				.map(|(term, doc_count)| TermStats {
					term: term.to_string(),
					doc_count,
					bg_count: self.background_count(spec.field(), term),
				})
				.collect::<Vec<_>>();

			stats.sort_by(|lhs, rhs| lhs.term.cmp(&rhs.term));
			terms_by_vertex.push(stats);
		}

		tracing::trace!(
			hop = query.hop.index(),
			sampled_docs = sample.len(),
			corpus_docs = self.docs.len(),
			"Sampled in-memory corpus."
		);

		Ok(HopSample {
			sampled_docs: sample.len() as u64,
			corpus_docs: self.docs.len() as u64,
			terms_by_vertex,
			timed_out: false,
		})
	}

	fn sample_docs(
		&self,
		filter: &QueryFilter,
		seeds: &[Vertex],
		sampling: &SamplingPolicy,
	) -> Vec<&Document> {
		let cap = sampling.diversity_cap();
		let limit = sampling.sample_size() as usize;
		let mut per_value: AHashMap<&str, u32> = AHashMap::new();
		let mut sample = Vec::new();

		for doc in &self.docs {
			if sample.len() >= limit {
				break;
			}
			if !filter.matches(doc) {
				continue;
			}
			if !seeds.is_empty()
				&& !seeds.iter().any(|seed| doc.contains(&seed.field, &seed.term))
			{
				continue;
			}

			if let Some((field, max_docs)) = cap
				&& let Some(value) = doc.terms(field).first()
			{
				let seen = per_value.entry(value.as_str()).or_default();

				if *seen >= max_docs {
					continue;
				}

				*seen += 1;
			}

			sample.push(doc);
		}

		sample
	}

	fn background_count(&self, field: &str, term: &str) -> u64 {
		self.docs.iter().filter(|doc| doc.contains(field, term)).count() as u64
	}
}
impl SearchBackend for MemoryBackend {
	fn sample<'a>(&'a self, query: HopQuery<'a>) -> BoxFuture<'a, Result<HopSample>> {
		Box::pin(async move { self.run(&query) })
	}
}

enum QueryFilter {
	All,
	Terms { field: String, values: Vec<String> },
}
impl QueryFilter {
	fn parse(query: Option<&QueryDescriptor>) -> Result<Self> {
		let Some(query) = query else {
			return Ok(Self::All);
		};
		let Some((kind, body)) = query.as_value().as_object().and_then(single_entry) else {
			return Err(unsupported(query));
		};

		match kind.as_str() {
			"match_all" => Ok(Self::All),
			"term" => {
				let Some((field, value)) = body.as_object().and_then(single_entry) else {
					return Err(unsupported(query));
				};
				let Some(value) = value.as_str() else {
					return Err(unsupported(query));
				};

				Ok(Self::Terms { field: field.clone(), values: vec![value.to_string()] })
			},
			"terms" => {
				let Some((field, values)) = body.as_object().and_then(single_entry) else {
					return Err(unsupported(query));
				};
				let Some(values) = values.as_array() else {
					return Err(unsupported(query));
				};
				let values = values.iter().filter_map(Value::as_str).map(str::to_string).collect();

				Ok(Self::Terms { field: field.clone(), values })
			},
			_ => Err(unsupported(query)),
		}
	}

	fn matches(&self, doc: &Document) -> bool {
		match self {
			Self::All => true,
			Self::Terms { field, values } => values.iter().any(|value| doc.contains(field, value)),
		}
	}
}

fn single_entry(object: &serde_json::Map<String, Value>) -> Option<(&String, &Value)> {
	if object.len() != 1 {
		return None;
	}

	object.iter().next()
}

fn unsupported(query: &QueryDescriptor) -> Error {
	Error::UnsupportedQuery { message: query.to_json() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_supported_queries() {
		assert!(matches!(QueryFilter::parse(None).unwrap(), QueryFilter::All));
		assert!(matches!(
			QueryFilter::parse(Some(&QueryDescriptor::match_all())).unwrap(),
			QueryFilter::All
		));

		let QueryFilter::Terms { field, values } =
			QueryFilter::parse(Some(&QueryDescriptor::terms("tags", ["a", "b"]))).unwrap()
		else {
			panic!("Expected a terms filter.");
		};

		assert_eq!(field, "tags");
		assert_eq!(values, vec!["a".to_string(), "b".to_string()]);
	}

	#[test]
	fn rejects_unsupported_queries() {
		let query = QueryDescriptor::new(serde_json::json!({ "fuzzy": { "body": "rust" } }));

		assert!(matches!(QueryFilter::parse(Some(&query)), Err(Error::UnsupportedQuery { .. })));
	}

	#[test]
	fn documents_accept_single_values() {
		let backend =
			MemoryBackend::from_json(r#"[{"author":"ann","tags":["rust","wasm"]}]"#).unwrap();

		assert_eq!(backend.len(), 1);
		assert!(backend.docs[0].contains("author", "ann"));
		assert_eq!(backend.docs[0].terms("tags").len(), 2);
	}
}

use serde_json::Value;

use crate::{Error, Result};

/// An opaque query that narrows which documents a hop considers. Interpretation belongs to
/// the search backend.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct QueryDescriptor(Value);
impl QueryDescriptor {
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	pub fn match_all() -> Self {
		Self(serde_json::json!({ "match_all": {} }))
	}

	pub fn term(field: &str, value: &str) -> Self {
		Self(serde_json::json!({ "term": { field: value } }))
	}

	pub fn terms<I, S>(field: &str, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let values = values.into_iter().map(Into::into).collect::<Vec<String>>();

		Self(serde_json::json!({ "terms": { field: values } }))
	}

	pub fn from_json(raw: &str) -> Result<Self> {
		serde_json::from_str(raw)
			.map(Self)
			.map_err(|err| Error::invalid_argument(format!("Guiding query is not valid JSON: {err}.")))
	}

	pub fn as_value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}

	pub fn to_json(&self) -> String {
		self.0.to_string()
	}
}

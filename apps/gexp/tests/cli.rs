use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use gexp::{describe, load_config, load_request, request_file::RequestFile};
use gexp_request::{IndicesOptions, wire};

const REQUEST: &str = r#"{
	"indices": ["people"],
	"routing": "r1,r2",
	"timeout": "5s",
	"sample_size": 40,
	"hops": [
		{
			"query": { "term": { "tags": "rust" } },
			"vertices": [
				{ "field": "people", "size": 2, "min_doc_count": 1, "include": [{ "term": "alice", "boost": 2.0 }, { "term": "bob" }] }
			]
		},
		{
			"sample_size": 10,
			"use_significance": false,
			"vertices": [{ "field": "tags", "exclude": ["java"] }]
		}
	]
}"#;

fn write_temp_file(extension: &str, payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("gexp_cli_test_{nanos}_{pid}_{ordinal}.{extension}"));

	fs::write(&path, payload).expect("Failed to write test file.");

	path
}

#[test]
fn request_file_builds_through_the_builder() {
	let defaults = gexp_config::Sampling::default();
	let request = RequestFile::from_json(REQUEST)
		.expect("Request file must parse.")
		.into_request(&defaults)
		.expect("Request must build.");

	assert_eq!(request.indices(), ["people".to_string()]);
	assert_eq!(request.routing(), Some("r1,r2"));
	assert_eq!(request.timeout(), Some(Duration::from_secs(5)));
	assert_eq!(request.sample_size(), 40);
	assert!(request.use_significance());
	assert_eq!(request.indices_options(), IndicesOptions::default());
	assert_eq!(request.hop_count(), 2);
	assert!(request.validate().is_empty());

	let first = request.hop(0).expect("Hop 0 must exist.");
	let vertex = &first.vertices()[0];

	assert_eq!(vertex.size(), 2);
	assert_eq!(vertex.boost_for("alice"), Some(2.0));
	assert_eq!(vertex.boost_for("bob"), Some(1.0));

	let second = request.hop(1).expect("Hop 1 must exist.");
	let sampling = second.effective_sampling(request.sampling());

	assert_eq!(second.parent().map(|parent| parent.index()), Some(0));
	assert_eq!(sampling.sample_size(), 10);
	assert!(!sampling.use_significance());
	assert!(!second.vertices()[0].admits("java"));
}

#[test]
fn config_defaults_fill_missing_sampling_values() {
	let defaults = gexp_config::Sampling {
		sample_size: 7,
		use_significance: false,
		diversity_field: Some("author".to_string()),
		max_docs_per_diversity_value: 2,
	};
	let request = RequestFile::from_json(r#"{ "hops": [{ "vertices": [{ "field": "f" }] }] }"#)
		.expect("Request file must parse.")
		.into_request(&defaults)
		.expect("Request must build.");

	assert_eq!(request.sample_size(), 7);
	assert!(!request.use_significance());
	assert_eq!(request.sample_diversity_field(), Some("author"));
	assert_eq!(request.max_docs_per_diversity_value(), 2);
}

#[test]
fn invalid_arguments_fail_while_building() {
	let defaults = gexp_config::Sampling::default();
	let zero_boost = RequestFile::from_json(
		r#"{ "hops": [{ "vertices": [{ "field": "f", "include": [{ "term": "a", "boost": 0.0 }] }] }] }"#,
	)
	.expect("Request file must parse.")
	.into_request(&defaults)
	.expect_err("Expected a zero boost to be rejected.");

	assert!(matches!(zero_boost, gexp_request::Error::InvalidArgument { .. }));

	let bad_timeout = RequestFile::from_json(r#"{ "timeout": "soon" }"#)
		.expect("Request file must parse.")
		.into_request(&defaults)
		.expect_err("Expected a malformed timeout to be rejected.");

	assert!(bad_timeout.to_string().contains("GraphExploreRequest.timeout"));
}

#[test]
fn unknown_request_fields_are_rejected() {
	let err = RequestFile::from_json(r#"{ "hopz": [] }"#).expect_err("Expected unknown field.");

	assert!(err.to_string().contains("hopz"));
}

#[test]
fn empty_request_still_builds_but_reports_problems() {
	let request = RequestFile::from_json(r#"{ "hops": [{}] }"#)
		.expect("Request file must parse.")
		.into_request(&gexp_config::Sampling::default())
		.expect("Request must build.");
	let summary = describe(&request);

	assert_eq!(summary["validation_errors"].as_array().map(Vec::len), Some(1));
}

#[test]
fn describe_summarizes_a_decoded_payload() {
	let path = write_temp_file("json", REQUEST);
	let config = load_config(None).expect("Default config must load.");
	let request = load_request(&path, &config).expect("Request must load.");
	let decoded = wire::decode(&wire::encode(&request).expect("Request must encode."))
		.expect("Payload must decode.");
	let summary = describe(&decoded);

	fs::remove_file(&path).ok();

	assert_eq!(summary["routing"], "r1,r2");
	assert_eq!(summary["timeout_ms"], 5_000);
	assert_eq!(summary["hops"][0]["parent"], serde_json::Value::Null);
	assert_eq!(summary["hops"][1]["parent"], 0);
	assert_eq!(summary["hops"][0]["vertices"][0]["include"][0]["term"], "alice");
	assert_eq!(summary["hops"][1]["sampling"]["strategy"], "popularity");
	assert_eq!(summary["hops"][1]["vertices"][0]["exclude"][0], "java");
}

#[test]
fn config_file_sets_the_log_level() {
	let path = write_temp_file("toml", "[service]\nlog_level = \"debug\"\n");
	let config = load_config(Some(&path)).expect("Config must load.");

	fs::remove_file(&path).ok();

	assert_eq!(config.service.log_level, "debug");
	assert_eq!(config.explore.max_hops, 16);
}

#[test]
fn describe_saturates_timeouts_past_u64_millis() {
	let mut request = gexp_request::GraphExploreRequest::new();

	request.set_timeout(Duration::MAX);

	assert_eq!(describe(&request)["timeout_ms"], u64::MAX);
}

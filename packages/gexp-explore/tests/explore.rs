use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use gexp_explore::{
	BoxFuture, DedupPolicy, Document, Error, ExploreControl, ExploreSettings, Explorer, HopQuery,
	HopSample, MemoryBackend, Result, SearchBackend, TermStats,
};
use gexp_request::{ExplorePlan, GraphExploreRequest, QueryDescriptor};

fn corpus() -> MemoryBackend {
	MemoryBackend::new(vec![
		Document::new().with_terms("tags", ["rust"]).with_terms("people", ["alice", "bob"]),
		Document::new().with_terms("tags", ["rust"]).with_terms("people", ["alice", "carol"]),
		Document::new().with_terms("tags", ["go"]).with_terms("people", ["carol", "dave"]),
		Document::new().with_terms("tags", ["go"]).with_terms("people", ["dave", "erin"]),
		Document::new().with_terms("tags", ["java"]).with_terms("people", ["erin"]),
	])
}

fn two_people_hops(use_significance: bool) -> ExplorePlan {
	let mut request = GraphExploreRequest::new();

	request.set_use_significance(use_significance);

	let first = request.create_next_hop(Some(QueryDescriptor::term("tags", "rust")));

	first.add_vertex("people").unwrap().set_size(2).unwrap().set_min_doc_count(1);

	let second = request.create_next_hop(None);

	second.add_vertex("people").unwrap().set_size(2).unwrap().set_min_doc_count(1);

	request.freeze().unwrap()
}

fn terms(vertices: &[gexp_explore::Vertex]) -> Vec<&str> {
	vertices.iter().map(|vertex| vertex.term.as_str()).collect()
}

#[tokio::test]
async fn second_hop_is_seeded_by_the_first_and_skips_ancestor_terms() {
	let explorer = Explorer::new(corpus(), ExploreSettings::default());
	let response = explorer.explore(&two_people_hops(false)).await.unwrap();

	assert_eq!(response.completed_hops(), 2);
	assert!(!response.timed_out);
	assert_eq!(terms(&response.hops[0].vertices), vec!["alice", "bob"]);
	assert_eq!(terms(&response.hops[1].vertices), vec!["carol"]);
	assert_eq!(response.hops[1].vertices[0].depth, 1);
	assert_eq!(response.hops[0].strategy, "popularity");
}

#[tokio::test]
async fn dedup_off_allows_revisiting_terms() {
	let settings = ExploreSettings { dedup: DedupPolicy::Off, ..Default::default() };
	let explorer = Explorer::new(corpus(), settings);
	let response = explorer.explore(&two_people_hops(false)).await.unwrap();

	assert_eq!(terms(&response.hops[1].vertices), vec!["alice", "bob"]);
}

#[tokio::test]
async fn significance_ranks_overrepresented_terms_first() {
	let mut request = GraphExploreRequest::new();

	request
		.create_next_hop(Some(QueryDescriptor::term("tags", "go")))
		.add_vertex("people")
		.unwrap()
		.set_min_doc_count(1);

	let response = Explorer::new(corpus(), ExploreSettings::default())
		.explore(&request.freeze().unwrap())
		.await
		.unwrap();
	let hop = &response.hops[0];

	assert_eq!(hop.strategy, "significance");
	assert_eq!(hop.sampled_docs, 2);
	assert_eq!(terms(&hop.vertices), vec!["dave", "carol", "erin"]);
}

#[tokio::test]
async fn include_boosts_restrict_and_reweight() {
	let mut request = GraphExploreRequest::new();
	let vertex = request
		.create_next_hop(Some(QueryDescriptor::term("tags", "go")))
		.add_vertex("people")
		.unwrap();

	vertex.set_min_doc_count(1);
	vertex.add_include("carol", 20.0).unwrap().add_include("erin", 1.0).unwrap();

	let response = Explorer::new(corpus(), ExploreSettings::default())
		.explore(&request.freeze().unwrap())
		.await
		.unwrap();

	assert_eq!(terms(&response.hops[0].vertices), vec!["carol", "erin"]);
}

#[tokio::test]
async fn min_doc_count_filters_weak_terms() {
	let mut request = GraphExploreRequest::new();

	request.set_use_significance(false);
	request
		.create_next_hop(Some(QueryDescriptor::term("tags", "rust")))
		.add_vertex("people")
		.unwrap()
		.set_min_doc_count(2);

	let response = Explorer::new(corpus(), ExploreSettings::default())
		.explore(&request.freeze().unwrap())
		.await
		.unwrap();

	assert_eq!(terms(&response.hops[0].vertices), vec!["alice"]);
}

#[tokio::test]
async fn diversity_cap_and_sample_size_bound_the_sample() {
	let mut request = GraphExploreRequest::new();

	request
		.set_use_significance(false)
		.set_sample_diversity_field("tags")
		.set_max_docs_per_diversity_value(1);
	request.create_next_hop(None).add_vertex("people").unwrap().set_min_doc_count(1);

	let second = request.create_next_hop(Some(QueryDescriptor::match_all()));

	second.add_vertex("tags").unwrap().set_min_doc_count(1);
	second.set_sample_size(1).unwrap();

	let response = Explorer::new(corpus(), ExploreSettings::default())
		.explore(&request.freeze().unwrap())
		.await
		.unwrap();

	assert_eq!(response.hops[0].sampled_docs, 3);
	assert_eq!(response.hops[1].sampled_docs, 1);
}

#[tokio::test]
async fn empty_hop_stops_exploration_early() {
	let mut request = GraphExploreRequest::new();

	request
		.create_next_hop(Some(QueryDescriptor::term("tags", "rust")))
		.add_vertex("people")
		.unwrap()
		.add_include("zed", 1.0)
		.unwrap();
	request.create_next_hop(None).add_vertex("tags").unwrap();

	let response = Explorer::new(corpus(), ExploreSettings::default())
		.explore(&request.freeze().unwrap())
		.await
		.unwrap();

	assert!(response.exhausted);
	assert_eq!(response.completed_hops(), 1);
	assert!(response.hops[0].vertices.is_empty());
}

#[tokio::test]
async fn too_many_hops_are_refused() {
	let settings = ExploreSettings { max_hops: 1, ..Default::default() };
	let err = Explorer::new(corpus(), settings).explore(&two_people_hops(true)).await.unwrap_err();

	assert!(matches!(err, Error::InvalidPlan { .. }));
}

#[tokio::test]
async fn unsupported_guiding_query_is_a_backend_error() {
	let mut request = GraphExploreRequest::new();

	request
		.create_next_hop(Some(QueryDescriptor::new(serde_json::json!({ "fuzzy": { "tags": "rst" } }))))
		.add_vertex("people")
		.unwrap();

	let err = Explorer::new(corpus(), ExploreSettings::default())
		.explore(&request.freeze().unwrap())
		.await
		.unwrap_err();

	assert!(matches!(err, Error::UnsupportedQuery { .. }));
}

/// How far a budget-aware scripted hop runs past its remaining time.
const OVERRUN: Duration = Duration::from_millis(5);

/// Returns one fixed term per vertex spec after sleeping `delays[hop]`. When the delay does
/// not fit the remaining budget, a budget-aware backend stops shortly after it and reports a
/// partial hop.
struct ScriptedBackend {
	delays: Vec<Duration>,
	honors_budget: bool,
	partial_at: Option<usize>,
	seen_seeds: Mutex<Vec<Vec<String>>>,
	cancel_after_first: Option<Arc<ExploreControl>>,
}
impl ScriptedBackend {
	fn new(delays: Vec<Duration>) -> Self {
		Self {
			delays,
			honors_budget: true,
			partial_at: None,
			seen_seeds: Mutex::new(Vec::new()),
			cancel_after_first: None,
		}
	}

	fn sampled_hops(&self) -> usize {
		self.seen_seeds.lock().unwrap().len()
	}
}
impl SearchBackend for ScriptedBackend {
	fn sample<'a>(&'a self, query: HopQuery<'a>) -> BoxFuture<'a, Result<HopSample>> {
		Box::pin(async move {
			let index = query.hop.index();
			let mut delay = self.delays.get(index).copied().unwrap_or_default();
			let mut timed_out = self.partial_at == Some(index);

			self.seen_seeds
				.lock()
				.unwrap()
				.push(query.seeds.iter().map(|seed| seed.term.clone()).collect());

			if self.honors_budget
				&& let Some(remaining) = query.remaining
				&& delay > remaining
			{
				delay = remaining + OVERRUN;
				timed_out = true;
			}
			if !delay.is_zero() {
				tokio::time::sleep(delay).await;
			}
			if let Some(control) = &self.cancel_after_first {
				control.cancel();
			}

			let terms_by_vertex = query
				.vertices
				.iter()
				.map(|_| vec![TermStats { term: format!("t{index}"), doc_count: 5, bg_count: 5 }])
				.collect();

			Ok(HopSample { sampled_docs: 5, corpus_docs: 50, terms_by_vertex, timed_out })
		})
	}
}

fn hop_plan(hops: usize, timeout: Option<Duration>) -> ExplorePlan {
	let mut request = GraphExploreRequest::new();

	if let Some(timeout) = timeout {
		request.set_timeout(timeout);
	}

	for _ in 0..hops {
		request.create_next_hop(None).add_vertex("f").unwrap();
	}

	request.freeze().unwrap()
}

fn three_hop_plan(timeout: Option<Duration>) -> ExplorePlan {
	hop_plan(3, timeout)
}

#[tokio::test]
async fn seeds_come_from_the_parent_hop() {
	let backend = ScriptedBackend::new(Vec::new());
	let explorer = Explorer::new(backend, ExploreSettings::default());
	let response = explorer.explore(&three_hop_plan(None)).await.unwrap();

	assert_eq!(response.completed_hops(), 3);

	let seen = explorer.backend().seen_seeds.lock().unwrap().clone();

	assert_eq!(seen, vec![Vec::<String>::new(), vec!["t0".to_string()], vec!["t1".to_string()]]);
}

#[tokio::test]
async fn timeout_returns_partial_results() {
	let backend = ScriptedBackend::new(vec![
		Duration::ZERO,
		Duration::from_secs(30),
		Duration::ZERO,
	]);
	let explorer = Explorer::new(backend, ExploreSettings::default());
	let response =
		explorer.explore(&three_hop_plan(Some(Duration::from_millis(50)))).await.unwrap();

	assert!(response.timed_out);
	assert_eq!(response.completed_hops(), 2);
	assert_eq!(terms(&response.hops[0].vertices), vec!["t0"]);
	assert_eq!(terms(&response.hops[1].vertices), vec!["t1"]);
	assert_eq!(explorer.backend().sampled_hops(), 2);
}

#[tokio::test]
async fn hop_overrunning_the_budget_keeps_its_partial_result() {
	let backend = ScriptedBackend::new(vec![Duration::from_secs(30)]);
	let explorer = Explorer::new(backend, ExploreSettings::default());
	let response = explorer.explore(&hop_plan(2, Some(Duration::from_millis(30)))).await.unwrap();

	assert!(response.timed_out);
	assert_eq!(response.completed_hops(), 1);
	assert_eq!(terms(&response.hops[0].vertices), vec!["t0"]);
	assert_eq!(explorer.backend().sampled_hops(), 1);
}

#[tokio::test]
async fn backend_reported_partial_hop_ends_exploration() {
	let mut backend = ScriptedBackend::new(Vec::new());

	backend.partial_at = Some(0);

	let explorer = Explorer::new(backend, ExploreSettings::default());
	let response = explorer.explore(&three_hop_plan(None)).await.unwrap();

	assert!(response.timed_out);
	assert_eq!(response.completed_hops(), 1);
	assert_eq!(terms(&response.hops[0].vertices), vec!["t0"]);
	assert_eq!(explorer.backend().sampled_hops(), 1);
}

#[tokio::test]
async fn backend_ignoring_the_budget_is_abandoned_after_the_grace_period() {
	let mut backend = ScriptedBackend::new(vec![Duration::ZERO, Duration::from_secs(30)]);

	backend.honors_budget = false;

	let settings =
		ExploreSettings { timeout_grace: Duration::from_millis(20), ..Default::default() };
	let response = Explorer::new(backend, settings)
		.explore(&three_hop_plan(Some(Duration::from_millis(20))))
		.await
		.unwrap();

	assert!(response.timed_out);
	assert_eq!(response.completed_hops(), 1);
	assert_eq!(terms(&response.hops[0].vertices), vec!["t0"]);
}

#[tokio::test]
async fn default_timeout_applies_when_the_plan_has_none() {
	let backend = ScriptedBackend::new(vec![Duration::from_secs(30)]);
	let settings =
		ExploreSettings { default_timeout: Some(Duration::from_millis(20)), ..Default::default() };
	let explorer = Explorer::new(backend, settings);
	let response = explorer.explore(&three_hop_plan(None)).await.unwrap();

	assert!(response.timed_out);
	assert_eq!(response.completed_hops(), 1);
	assert_eq!(explorer.backend().sampled_hops(), 1);
}

#[tokio::test]
async fn cancellation_is_honored_between_hops() {
	let control = Arc::new(ExploreControl::new());
	let mut backend = ScriptedBackend::new(Vec::new());

	backend.cancel_after_first = Some(control.clone());

	let response = Explorer::new(backend, ExploreSettings::default())
		.explore_with(&three_hop_plan(None), &control)
		.await
		.unwrap();

	assert!(response.cancelled);
	assert_eq!(response.completed_hops(), 1);
}

#[tokio::test]
async fn mismatched_backend_output_is_rejected() {
	struct EmptyBackend;
	impl SearchBackend for EmptyBackend {
		fn sample<'a>(&'a self, _query: HopQuery<'a>) -> BoxFuture<'a, Result<HopSample>> {
			Box::pin(async move { Ok(HopSample::default()) })
		}
	}

	let err = Explorer::new(EmptyBackend, ExploreSettings::default())
		.explore(&three_hop_plan(None))
		.await
		.unwrap_err();

	assert!(matches!(err, Error::Backend { .. }));
}

#[test]
fn settings_follow_config() {
	let cfg: gexp_config::Config = toml::from_str(
		"[service]\nlog_level = \"info\"\n\n[explore]\ndedup = \"off\"\ndefault_timeout_ms = 250\ntimeout_grace_ms = 75\nmax_hops = 4\n",
	)
	.unwrap();
	let settings = ExploreSettings::from_config(&cfg.explore).unwrap();

	assert_eq!(settings.dedup, DedupPolicy::Off);
	assert_eq!(settings.default_timeout, Some(Duration::from_millis(250)));
	assert_eq!(settings.timeout_grace, Duration::from_millis(75));
	assert_eq!(settings.max_hops, 4);
}

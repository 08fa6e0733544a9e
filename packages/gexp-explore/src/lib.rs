//! Sequential execution of graph exploration plans.
//!
//! Hop `n + 1` is seeded with the vertices found by hop `n`, so hops never run in parallel.
//! A backend may parallelize the work inside a single hop.

pub mod backend;
pub mod dedup;
pub mod explorer;
pub mod memory;
pub mod scoring;

mod error;

use std::{future::Future, pin::Pin};

pub use backend::{HopQuery, HopSample, SearchBackend, TermStats};
pub use dedup::{DedupPolicy, VisitedTerms};
pub use error::{Error, Result};
pub use explorer::{ExploreControl, ExploreResponse, ExploreSettings, Explorer, HopResult, Vertex};
pub use memory::{Document, MemoryBackend};
pub use scoring::{PopularityScorer, SignificanceScorer, TermFrequencies, TermScorer, scorer_for};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

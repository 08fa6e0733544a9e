//! Request model for multi-hop graph exploration.
//!
//! A request chains hops. Each hop samples the documents matched by its guiding query, picks
//! interesting terms from its vertex fields, and hands those terms to the next hop as seeds.

pub mod hop;
pub mod indices;
pub mod query;
pub mod request;
pub mod sampling;
pub mod timeout;
pub mod validate;
pub mod vertex;
pub mod wire;

mod error;

pub use error::{Error, Result};
pub use hop::{Ancestors, Hop, HopChain, HopId};
pub use indices::IndicesOptions;
pub use query::QueryDescriptor;
pub use request::{ExplorePlan, GraphExploreRequest};
pub use sampling::{DEFAULT_SAMPLE_SIZE, SamplingOverride, SamplingPolicy, ScoringStrategy};
pub use validate::{NO_HOPS_ERROR_MESSAGE, NO_VERTICES_ERROR_MESSAGE};
pub use vertex::{
	DEFAULT_MIN_DOC_COUNT, DEFAULT_SHARD_MIN_DOC_COUNT, DEFAULT_VERTEX_SIZE, TermBoost, VertexSpec,
};

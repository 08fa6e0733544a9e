use crate::{GraphExploreRequest, Hop};

pub const NO_HOPS_ERROR_MESSAGE: &str = "Graph explore request must have at least one hop";
pub const NO_VERTICES_ERROR_MESSAGE: &str =
	"Graph explore hop must have at least one VertexRequest";

/// Collects every structural problem in `request`. An empty report means the request can be
/// executed. Argument errors never show up here; they are raised by the setters.
pub fn validate(request: &GraphExploreRequest) -> Vec<String> {
	let mut errors = Vec::new();

	if request.hops().is_empty() {
		errors.push(NO_HOPS_ERROR_MESSAGE.to_string());
	}

	for hop in request.hops() {
		validate_hop(hop, &mut errors);
	}

	errors
}

fn validate_hop(hop: &Hop, errors: &mut Vec<String>) {
	if hop.vertices().is_empty() {
		errors.push(NO_VERTICES_ERROR_MESSAGE.to_string());
	}
}

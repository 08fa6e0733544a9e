pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid plan: {message}")]
	InvalidPlan { message: String },
	#[error("Unsupported guiding query: {message}")]
	UnsupportedQuery { message: String },
	#[error("Backend error: {message}")]
	Backend { message: String },
	#[error("Invalid settings: {message}")]
	Settings { message: String },
	#[error(transparent)]
	Request(#[from] gexp_request::Error),
}

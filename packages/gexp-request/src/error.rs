pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid argument: {message}")]
	InvalidArgument { message: String },
	#[error("Hop {index} is out of range for a chain of {count} hops.")]
	HopOutOfRange { index: usize, count: usize },
	#[error("Validation failed: {}", messages.join("; "))]
	Validation { messages: Vec<String> },
	#[error("Failed to decode graph explore request: {message}")]
	Decode { message: String },
	#[error("Failed to encode graph explore request: {message}")]
	Encode { message: String },
}
impl Error {
	pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
		Self::InvalidArgument { message: message.into() }
	}

	pub(crate) fn decode(message: impl Into<String>) -> Self {
		Self::Decode { message: message.into() }
	}
}

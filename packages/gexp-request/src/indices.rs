use crate::{Error, Result};

const IGNORE_UNAVAILABLE: u8 = 1;
const ALLOW_NO_INDICES: u8 = 1 << 1;
const EXPAND_WILDCARDS_OPEN: u8 = 1 << 2;
const EXPAND_WILDCARDS_CLOSED: u8 = 1 << 3;
const KNOWN_FLAGS: u8 =
	IGNORE_UNAVAILABLE | ALLOW_NO_INDICES | EXPAND_WILDCARDS_OPEN | EXPAND_WILDCARDS_CLOSED;

/// How target index expressions are resolved. Carried opaquely to the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndicesOptions {
	pub ignore_unavailable: bool,
	pub allow_no_indices: bool,
	pub expand_wildcards_open: bool,
	pub expand_wildcards_closed: bool,
}
impl IndicesOptions {
	pub fn from_options(
		ignore_unavailable: bool,
		allow_no_indices: bool,
		expand_wildcards_open: bool,
		expand_wildcards_closed: bool,
	) -> Self {
		Self {
			ignore_unavailable,
			allow_no_indices,
			expand_wildcards_open,
			expand_wildcards_closed,
		}
	}

	pub fn lenient() -> Self {
		Self::from_options(true, true, true, false)
	}

	pub fn to_flags(self) -> u8 {
		let mut flags = 0;

		if self.ignore_unavailable {
			flags |= IGNORE_UNAVAILABLE;
		}
		if self.allow_no_indices {
			flags |= ALLOW_NO_INDICES;
		}
		if self.expand_wildcards_open {
			flags |= EXPAND_WILDCARDS_OPEN;
		}
		if self.expand_wildcards_closed {
			flags |= EXPAND_WILDCARDS_CLOSED;
		}

		flags
	}

	pub fn from_flags(flags: u8) -> Result<Self> {
		if flags & !KNOWN_FLAGS != 0 {
			return Err(Error::decode(format!("unknown indices options flags {flags:#010b}")));
		}

		Ok(Self::from_options(
			flags & IGNORE_UNAVAILABLE != 0,
			flags & ALLOW_NO_INDICES != 0,
			flags & EXPAND_WILDCARDS_OPEN != 0,
			flags & EXPAND_WILDCARDS_CLOSED != 0,
		))
	}
}
impl Default for IndicesOptions {
	fn default() -> Self {
		Self::from_options(false, false, true, false)
	}
}

use crate::{Error, Result};

/// Big-endian positional writer.
///
/// Writes never fail individually. A collection too long for a `u32` length poisons the
/// writer, and [`StreamWriter::into_bytes`] reports it instead of returning bytes that could
/// not be decoded.
#[derive(Debug, Default)]
pub struct StreamWriter {
	buf: Vec<u8>,
	oversized: Option<usize>,
}
impl StreamWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn into_bytes(self) -> Result<Vec<u8>> {
		if let Some(len) = self.oversized {
			return Err(Error::Encode {
				message: format!("collection length {len} exceeds the u32 length prefix"),
			});
		}

		Ok(self.buf)
	}

	pub fn write_u8(&mut self, value: u8) {
		self.buf.push(value);
	}

	pub fn write_bool(&mut self, value: bool) {
		self.write_u8(u8::from(value));
	}

	pub fn write_u32(&mut self, value: u32) {
		self.buf.extend_from_slice(&value.to_be_bytes());
	}

	pub fn write_u64(&mut self, value: u64) {
		self.buf.extend_from_slice(&value.to_be_bytes());
	}

	pub fn write_f32(&mut self, value: f32) {
		self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
	}

	/// Collection lengths are written as `u32`.
	pub fn write_len(&mut self, len: usize) {
		match u32::try_from(len) {
			Ok(len) => self.write_u32(len),
			Err(_) => {
				self.oversized.get_or_insert(len);
				self.write_u32(u32::MAX);
			},
		}
	}

	pub fn write_string(&mut self, value: &str) {
		self.write_len(value.len());
		self.buf.extend_from_slice(value.as_bytes());
	}

	pub fn write_optional_string(&mut self, value: Option<&str>) {
		self.write_optional(value, Self::write_string);
	}

	pub fn write_string_list(&mut self, values: &[String]) {
		self.write_len(values.len());

		for value in values {
			self.write_string(value);
		}
	}

	/// Writes a presence marker, then the value when present.
	pub fn write_optional<T>(&mut self, value: Option<T>, write: impl FnOnce(&mut Self, T)) {
		match value {
			Some(value) => {
				self.write_bool(true);
				write(self, value);
			},
			None => self.write_bool(false),
		}
	}
}

/// Reader over a payload produced by [`StreamWriter`].
#[derive(Debug)]
pub struct StreamReader<'a> {
	bytes: &'a [u8],
	pos: usize,
}
impl<'a> StreamReader<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	pub fn remaining(&self) -> usize {
		self.bytes.len() - self.pos
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn finish(self) -> Result<()> {
		if self.remaining() != 0 {
			return Err(Error::decode(format!(
				"{} trailing bytes after offset {}",
				self.remaining(),
				self.pos
			)));
		}

		Ok(())
	}

	fn take<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
		let end = self.pos + N;
		let Some(slice) = self.bytes.get(self.pos..end) else {
			return Err(Error::decode(format!(
				"unexpected end of input reading {what} at offset {}",
				self.pos
			)));
		};
		let mut out = [0_u8; N];

		out.copy_from_slice(slice);

		self.pos = end;

		Ok(out)
	}

	pub fn read_u8(&mut self, what: &str) -> Result<u8> {
		let [byte] = self.take::<1>(what)?;

		Ok(byte)
	}

	pub fn read_bool(&mut self, what: &str) -> Result<bool> {
		match self.read_u8(what)? {
			0 => Ok(false),
			1 => Ok(true),
			other => Err(Error::decode(format!(
				"invalid boolean {other} for {what} at offset {}",
				self.pos - 1
			))),
		}
	}

	pub fn read_u32(&mut self, what: &str) -> Result<u32> {
		Ok(u32::from_be_bytes(self.take::<4>(what)?))
	}

	pub fn read_u64(&mut self, what: &str) -> Result<u64> {
		Ok(u64::from_be_bytes(self.take::<8>(what)?))
	}

	pub fn read_f32(&mut self, what: &str) -> Result<f32> {
		Ok(f32::from_bits(u32::from_be_bytes(self.take::<4>(what)?)))
	}

	/// Reads a collection length and checks it against the bytes left, so a corrupt count
	/// cannot trigger a huge allocation.
	pub fn read_len(&mut self, what: &str, min_item_bytes: usize) -> Result<usize> {
		let len = self.read_u32(what)? as usize;

		if len.saturating_mul(min_item_bytes.max(1)) > self.remaining() {
			return Err(Error::decode(format!(
				"{what} length {len} exceeds the {} remaining bytes",
				self.remaining()
			)));
		}

		Ok(len)
	}

	pub fn read_string(&mut self, what: &str) -> Result<String> {
		let len = self.read_len(what, 1)?;
		let slice = &self.bytes[self.pos..self.pos + len];

		self.pos += len;

		String::from_utf8(slice.to_vec())
			.map_err(|err| Error::decode(format!("{what} is not valid UTF-8: {err}")))
	}

	pub fn read_optional_string(&mut self, what: &str) -> Result<Option<String>> {
		self.read_optional(what, |reader| reader.read_string(what))
	}

	pub fn read_string_list(&mut self, what: &str) -> Result<Vec<String>> {
		let len = self.read_len(what, 4)?;
		let mut values = Vec::with_capacity(len);

		for _ in 0..len {
			values.push(self.read_string(what)?);
		}

		Ok(values)
	}

	pub fn read_optional<T>(
		&mut self,
		what: &str,
		read: impl FnOnce(&mut Self) -> Result<T>,
	) -> Result<Option<T>> {
		if self.read_bool(what)? { read(self).map(Some) } else { Ok(None) }
	}
}

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::range::{CharLen, TextRange};

/// Monotonically increasing version of a document's text.
///
/// Assigned by the editing surface; every mutation produces a strictly
/// greater version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferVersion(pub u64);

impl BufferVersion {
	/// Version of a freshly opened document.
	pub const INITIAL: BufferVersion = BufferVersion(0);

	/// Returns the version following this one. Saturates at `u64::MAX` so
	/// versions never go backwards.
	#[must_use]
	pub fn next(self) -> Self {
		Self(self.0.saturating_add(1))
	}
}

impl fmt::Display for BufferVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}", self.0)
	}
}

/// An immutable snapshot of document text at a specific version.
///
/// Cloning is cheap: the rope shares its chunks. Mutation never happens in
/// place; [`TextBuffer::replace`] and [`TextBuffer::with_text`] return a new
/// snapshot with the next version.
#[derive(Debug, Clone)]
pub struct TextBuffer {
	text: Rope,
	version: BufferVersion,
}

impl TextBuffer {
	/// Creates a snapshot from a string.
	pub fn new(text: &str, version: BufferVersion) -> Self {
		Self {
			text: Rope::from_str(text),
			version,
		}
	}

	/// Creates a snapshot from an existing rope.
	pub fn from_rope(text: Rope, version: BufferVersion) -> Self {
		Self { text, version }
	}

	/// The underlying rope.
	pub fn text(&self) -> &Rope {
		&self.text
	}

	pub fn version(&self) -> BufferVersion {
		self.version
	}

	/// Length of the text in characters.
	pub fn len_chars(&self) -> CharLen {
		self.text.len_chars()
	}

	pub fn is_empty(&self) -> bool {
		self.text.len_chars() == 0
	}

	/// Returns the text covered by `range`, or `None` if it falls outside the
	/// buffer.
	pub fn slice(&self, range: TextRange) -> Option<RopeSlice<'_>> {
		self.text.get_slice(range.start..range.end)
	}

	/// Returns true if `range` is in bounds and covers exactly `expected`.
	pub fn matches_at(&self, range: TextRange, expected: &str) -> bool {
		self.slice(range).is_some_and(|slice| slice == expected)
	}

	/// Returns a new snapshot with `range` replaced by `replacement`.
	///
	/// Returns `None` if `range` falls outside the buffer or is inverted.
	pub fn replace(&self, range: TextRange, replacement: &str) -> Option<Self> {
		if range.start > range.end || range.end > self.len_chars() {
			return None;
		}
		let mut text = self.text.clone();
		text.remove(range.start..range.end);
		text.insert(range.start, replacement);
		Some(Self {
			text,
			version: self.version.next(),
		})
	}

	/// Returns a new snapshot holding `text` at the next version.
	pub fn with_text(&self, text: &str) -> Self {
		Self {
			text: Rope::from_str(text),
			version: self.version.next(),
		}
	}
}

impl fmt::Display for TextBuffer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for chunk in self.text.chunks() {
			f.write_str(chunk)?;
		}
		Ok(())
	}
}

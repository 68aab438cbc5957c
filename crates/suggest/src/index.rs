//! Fragment-to-offset resolution.
//!
//! Analysis services return literal fragments, not offsets. This module maps a
//! fragment back to the character ranges where it occurs so the engine can
//! anchor it.

use std::borrow::Cow;

use redline_primitives::{BufferVersion, CharIdx, Rope, TextBuffer, TextRange};

/// Search view over one buffer snapshot.
///
/// Holds a contiguous copy of the text only when the rope spans multiple
/// chunks, so repeated lookups during a merge share one materialization.
pub struct TextOffsetIndex<'a> {
	rope: &'a Rope,
	text: Cow<'a, str>,
	version: BufferVersion,
}

impl<'a> TextOffsetIndex<'a> {
	pub fn new(buffer: &'a TextBuffer) -> Self {
		let rope = buffer.text();
		Self {
			rope,
			text: rope.slice(..).into(),
			version: buffer.version(),
		}
	}

	/// Version of the buffer this index was built from.
	pub fn version(&self) -> BufferVersion {
		self.version
	}

	/// Returns every non-overlapping occurrence of `fragment`, left to right.
	///
	/// Matching is exact and case-sensitive. Empty or whitespace-only fragments
	/// and fragments longer than the buffer yield no ranges.
	pub fn find_all(&self, fragment: &str) -> Vec<TextRange> {
		if fragment.trim().is_empty() {
			return Vec::new();
		}
		let fragment_len = fragment.chars().count();
		if fragment_len > self.rope.len_chars() {
			return Vec::new();
		}

		self.text
			.match_indices(fragment)
			.map(|(byte, _)| TextRange::with_len(self.rope.byte_to_char(byte), fragment_len))
			.collect()
	}

	/// Picks one occurrence of `fragment`.
	///
	/// With a `hint`, the occurrence whose start is closest to it wins (ties go
	/// to the leftmost). Without one, the first occurrence wins.
	pub fn resolve_best(&self, fragment: &str, hint: Option<CharIdx>) -> Option<TextRange> {
		let candidates = self.find_all(fragment);
		match hint {
			Some(hint) => candidates.into_iter().min_by_key(|range| range.distance_to(hint)),
			None => candidates.into_iter().next(),
		}
	}
}

/// Returns every occurrence of `fragment` in `buffer`.
pub fn find_all(buffer: &TextBuffer, fragment: &str) -> Vec<TextRange> {
	TextOffsetIndex::new(buffer).find_all(fragment)
}

/// Resolves `fragment` to a single range in `buffer`.
pub fn resolve_best(buffer: &TextBuffer, fragment: &str, hint: Option<CharIdx>) -> Option<TextRange> {
	TextOffsetIndex::new(buffer).resolve_best(fragment, hint)
}

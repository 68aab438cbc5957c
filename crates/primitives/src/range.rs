use std::fmt;

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for anchors and deltas.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
	/// First character covered by the range.
	pub start: CharIdx,
	/// One past the last character covered by the range.
	pub end: CharIdx,
}

impl TextRange {
	/// Creates a range, normalizing reversed bounds.
	pub fn new(start: CharIdx, end: CharIdx) -> Self {
		if end < start {
			Self { start: end, end: start }
		} else {
			Self { start, end }
		}
	}

	/// Creates a range starting at `start` spanning `len` characters.
	pub fn with_len(start: CharIdx, len: CharLen) -> Self {
		Self { start, end: start + len }
	}

	/// Returns the length of the range in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	/// Returns true for a zero-width range.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if the two ranges share at least one character.
	///
	/// Ranges that merely touch (`a.end == b.start`) do not overlap.
	#[inline]
	pub fn overlaps(&self, other: &TextRange) -> bool {
		self.start < other.end && other.start < self.end
	}

	/// Returns true if `pos` falls inside the range.
	#[inline]
	pub fn contains(&self, pos: CharIdx) -> bool {
		self.start <= pos && pos < self.end
	}

	/// Moves both ends by `delta` characters.
	///
	/// Returns `None` when the shift would move the start before zero.
	pub fn shifted(self, delta: isize) -> Option<Self> {
		let start = self.start.checked_add_signed(delta)?;
		let end = self.end.checked_add_signed(delta)?;
		Some(Self { start, end })
	}

	/// Distance between the range start and `pos`.
	#[inline]
	pub fn distance_to(&self, pos: CharIdx) -> usize {
		self.start.abs_diff(pos)
	}
}

impl From<std::ops::Range<CharIdx>> for TextRange {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl From<TextRange> for std::ops::Range<CharIdx> {
	fn from(range: TextRange) -> Self {
		range.start..range.end
	}
}

impl fmt::Display for TextRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {})", self.start, self.end)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_normalizes_reversed_bounds() {
		let range = TextRange::new(7, 3);
		assert_eq!(range, TextRange { start: 3, end: 7 });
		assert_eq!(range.len(), 4);
	}

	#[test]
	fn test_touching_ranges_do_not_overlap() {
		let a = TextRange::new(2, 5);
		let b = TextRange::new(5, 9);
		assert!(!a.overlaps(&b));
		assert!(!b.overlaps(&a));
		assert!(a.overlaps(&TextRange::new(4, 6)));
		assert!(TextRange::new(0, 10).overlaps(&a));
	}

	#[test]
	fn test_shift() {
		let range = TextRange::new(10, 14);
		assert_eq!(range.shifted(2), Some(TextRange::new(12, 16)));
		assert_eq!(range.shifted(-3), Some(TextRange::new(7, 11)));
		assert_eq!(range.shifted(-11), None);
	}

	#[test]
	fn test_contains_is_half_open() {
		let range = TextRange::new(2, 4);
		assert!(!range.contains(1));
		assert!(range.contains(2));
		assert!(range.contains(3));
		assert!(!range.contains(4));
	}

	#[test]
	fn test_display() {
		assert_eq!(TextRange::new(0, 2).to_string(), "[0, 2)");
	}
}

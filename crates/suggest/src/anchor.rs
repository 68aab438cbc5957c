//! Binding suggestions to ranges in a specific buffer version.

use redline_primitives::TextBuffer;

use crate::error::{Result, SuggestError};
use crate::index::TextOffsetIndex;
use crate::suggestion::{Anchor, Suggestion};

/// Resolves where `suggestion` sits in the indexed buffer without mutating it.
///
/// The previous anchor start, if any, is the hint: the occurrence nearest to
/// where the suggestion used to be wins.
pub fn resolve(index: &TextOffsetIndex<'_>, suggestion: &Suggestion) -> Result<Anchor> {
	let hint = suggestion.range().map(|range| range.start);
	index
		.resolve_best(&suggestion.original, hint)
		.map(|range| Anchor {
			range,
			version: index.version(),
		})
		.ok_or_else(|| SuggestError::AnchorResolution {
			fragment: suggestion.original.clone(),
			version: index.version(),
		})
}

/// Anchors `suggestion` against `buffer`.
///
/// On failure the anchor is cleared; the caller is expected to drop the
/// suggestion.
pub fn anchor(suggestion: &mut Suggestion, buffer: &TextBuffer) -> Result<Anchor> {
	anchor_with(&TextOffsetIndex::new(buffer), suggestion)
}

/// Same as [`anchor`], reusing an existing index.
pub fn anchor_with(index: &TextOffsetIndex<'_>, suggestion: &mut Suggestion) -> Result<Anchor> {
	match resolve(index, suggestion) {
		Ok(anchor) => {
			suggestion.anchor = Some(anchor);
			Ok(anchor)
		}
		Err(err) => {
			suggestion.anchor = None;
			Err(err)
		}
	}
}

/// Returns true if the suggestion's anchor can still be trusted in `buffer`.
///
/// Valid when the buffer is the exact version the anchor was placed in, or
/// when the anchored range still holds `original`. The second check keeps
/// anchors alive across edits made strictly outside their range.
pub fn is_valid(suggestion: &Suggestion, buffer: &TextBuffer) -> bool {
	let Some(anchor) = suggestion.anchor else {
		return false;
	};
	anchor.version == buffer.version() || buffer.matches_at(anchor.range, &suggestion.original)
}

#[cfg(test)]
mod tests {
	use redline_primitives::{BufferVersion, SuggestionId, TextRange};

	use super::*;
	use crate::suggestion::{ProposedSuggestion, Severity, SuggestionKind};

	fn suggestion(original: &str, replacement: &str) -> Suggestion {
		Suggestion::from_proposed(
			SuggestionId(1),
			ProposedSuggestion::new(original, replacement, SuggestionKind::Spelling, Severity::High),
		)
	}

	#[test]
	fn test_anchor_sets_range_and_version() {
		let buffer = TextBuffer::new("I recieve emails.", BufferVersion(3));
		let mut s = suggestion("recieve", "receive");

		let anchor = anchor(&mut s, &buffer).unwrap();

		assert_eq!(anchor.range, TextRange::new(2, 9));
		assert_eq!(anchor.version, BufferVersion(3));
		assert_eq!(s.anchor, Some(anchor));
	}

	#[test]
	fn test_anchor_failure_clears_previous_anchor() {
		let buffer = TextBuffer::new("I recieve emails.", BufferVersion(1));
		let mut s = suggestion("recieve", "receive");
		anchor(&mut s, &buffer).unwrap();

		let edited = buffer.with_text("I got emails.");
		let err = anchor(&mut s, &edited).unwrap_err();

		assert!(matches!(err, SuggestError::AnchorResolution { version: BufferVersion(2), .. }));
		assert_eq!(s.anchor, None);
	}

	#[test]
	fn test_reanchor_prefers_previous_position() {
		let buffer = TextBuffer::new("teh cat saw teh dog", BufferVersion(1));
		let mut s = suggestion("teh", "the");
		s.anchor = Some(Anchor {
			range: TextRange::new(12, 15),
			version: BufferVersion(1),
		});

		let edited = buffer.with_text("Then teh cat saw teh dog");
		let anchor = anchor(&mut s, &edited).unwrap();

		assert_eq!(anchor.range, TextRange::new(17, 20));
	}

	#[test]
	fn test_valid_at_same_version() {
		let buffer = TextBuffer::new("I recieve emails.", BufferVersion(1));
		let mut s = suggestion("recieve", "receive");
		anchor(&mut s, &buffer).unwrap();
		assert!(is_valid(&s, &buffer));
	}

	#[test]
	fn test_valid_after_edit_outside_range() {
		let buffer = TextBuffer::new("I recieve emails.", BufferVersion(1));
		let mut s = suggestion("recieve", "receive");
		anchor(&mut s, &buffer).unwrap();

		let edited = buffer.with_text("I recieve letters.");
		assert!(is_valid(&s, &edited));
	}

	#[test]
	fn test_invalid_after_edit_inside_or_before_range() {
		let buffer = TextBuffer::new("I recieve emails.", BufferVersion(1));
		let mut s = suggestion("recieve", "receive");
		anchor(&mut s, &buffer).unwrap();

		assert!(!is_valid(&s, &buffer.with_text("I receive emails.")));
		assert!(!is_valid(&s, &buffer.with_text("So I recieve emails.")));
	}

	#[test]
	fn test_unanchored_is_never_valid() {
		let buffer = TextBuffer::new("I recieve emails.", BufferVersion(1));
		assert!(!is_valid(&suggestion("recieve", "receive"), &buffer));
	}
}

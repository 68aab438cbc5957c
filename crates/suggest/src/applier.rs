//! Applying a suggestion to a buffer and re-anchoring the rest.
//!
//! Application never trusts a UI-held offset: the anchored range is re-read
//! and compared against `original` immediately before splicing. Any drift is
//! reported as [`SuggestError::AnchorMismatch`] with the buffer untouched.

use redline_primitives::{BufferVersion, SuggestionId, TextBuffer, TextRange};
use tracing::trace;

use crate::error::{Result, SuggestError};
use crate::suggestion::{Anchor, Suggestion};

/// Outcome of a successful application.
#[derive(Debug, Clone)]
pub struct Applied {
	/// The buffer with the replacement spliced in, at the next version.
	pub buffer: TextBuffer,
	/// The range the suggestion covered before application.
	pub range: TextRange,
	/// `replacement.len() - original.len()`, in characters.
	pub delta: isize,
}

/// Splices `suggestion.replacement` over its anchored range.
///
/// # Errors
///
/// - [`SuggestError::Unanchored`] if the suggestion was never placed.
/// - [`SuggestError::AnchorMismatch`] if the text at the anchor no longer
///   equals `original`.
pub fn apply(buffer: &TextBuffer, suggestion: &Suggestion) -> Result<Applied> {
	let anchor = suggestion.anchor.ok_or(SuggestError::Unanchored(suggestion.id))?;
	let mismatch = || SuggestError::AnchorMismatch {
		id: suggestion.id,
		range: anchor.range,
		version: buffer.version(),
	};

	if !buffer.matches_at(anchor.range, &suggestion.original) {
		return Err(mismatch());
	}
	let next = buffer
		.replace(anchor.range, &suggestion.replacement)
		.ok_or_else(mismatch)?;

	let delta = suggestion.replacement.chars().count() as isize - anchor.range.len() as isize;
	trace!(
		id = %suggestion.id,
		range = %anchor.range,
		delta,
		version = %next.version(),
		"suggest.apply"
	);

	Ok(Applied {
		buffer: next,
		range: anchor.range,
		delta,
	})
}

/// Result of re-anchoring the remaining suggestions after an application.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShiftOutcome {
	pub shifted: usize,
	/// Suggestions whose range overlapped the applied range. Their anchors are
	/// cleared; they must be dropped.
	pub invalidated: Vec<SuggestionId>,
}

/// Moves anchors to account for a replacement at `applied`.
///
/// - Anchors starting at or after `applied.end` shift by `delta`.
/// - Anchors ending at or before `applied.start` keep their range.
/// - Anchors overlapping `applied` are cleared, never shifted: their text may
///   have been rewritten.
///
/// Surviving anchors are stamped with `version`, the buffer version produced
/// by the application.
pub fn shift_anchors<'a>(
	others: impl IntoIterator<Item = &'a mut Suggestion>,
	applied: TextRange,
	delta: isize,
	version: BufferVersion,
) -> ShiftOutcome {
	let mut outcome = ShiftOutcome::default();

	for suggestion in others {
		let Some(anchor) = suggestion.anchor else {
			continue;
		};

		let range = if anchor.range.start >= applied.end {
			anchor.range.shifted(delta)
		} else if anchor.range.overlaps(&applied) {
			None
		} else {
			Some(anchor.range)
		};

		match range {
			Some(range) => {
				if range != anchor.range {
					outcome.shifted += 1;
				}
				suggestion.anchor = Some(Anchor { range, version });
			}
			None => {
				suggestion.anchor = None;
				outcome.invalidated.push(suggestion.id);
			}
		}
	}

	outcome
}

//! Error types for suggestion anchoring and application.

use redline_primitives::{BufferVersion, SuggestionId, TextRange};
use thiserror::Error;

/// Failures raised while anchoring or applying suggestions.
///
/// None of these are fatal to the editing surface: the worst outcome is a
/// suggestion that is dropped instead of shown or applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
	/// The fragment does not occur in the buffer.
	#[error("fragment {fragment:?} not found in buffer {version}")]
	AnchorResolution { fragment: String, version: BufferVersion },
	/// The anchored text drifted since the suggestion was placed. The buffer
	/// is left untouched.
	#[error("suggestion {id} no longer matches the text at {range} in buffer {version}")]
	AnchorMismatch {
		id: SuggestionId,
		range: TextRange,
		version: BufferVersion,
	},
	#[error("suggestion {0} has no anchor")]
	Unanchored(SuggestionId),
	/// The id is not in the set (already applied, dismissed, or invalidated).
	#[error("unknown suggestion {0}")]
	UnknownSuggestion(SuggestionId),
}

/// An unrecognized `kind` or `severity` label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {field} label {value:?}")]
pub struct LabelError {
	pub field: &'static str,
	pub value: String,
}

/// Result type for suggestion operations.
pub type Result<T> = std::result::Result<T, SuggestError>;

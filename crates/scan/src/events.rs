use redline_primitives::{BufferVersion, DocumentId, SuggestionId};

use crate::analysis::AnalysisError;

/// Notifications emitted by [`ScanManager`](crate::ScanManager) for the host
/// UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
	/// An analysis call was launched for `version`.
	ScanStarted { doc_id: DocumentId, version: BufferVersion },
	/// Scan results were folded into the document's suggestions.
	SuggestionsMerged {
		doc_id: DocumentId,
		added: Vec<SuggestionId>,
		duplicates: usize,
		unresolved: usize,
	},
	/// Suggestions removed because an edit made them untrustworthy.
	SuggestionsInvalidated { doc_id: DocumentId, ids: Vec<SuggestionId> },
	/// The analysis call failed; suggestions are unchanged.
	ScanFailed { doc_id: DocumentId, error: AnalysisError },
	/// The user tried to apply a suggestion whose text had drifted. It was
	/// removed instead of applied.
	SuggestionExpired { doc_id: DocumentId, id: SuggestionId },
	/// A scan completed and the document has no open suggestions.
	DocumentClean { doc_id: DocumentId },
}

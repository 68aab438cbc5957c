use indexmap::IndexMap;
use redline_primitives::{BufferVersion, SuggestionId, TextRange};

use crate::suggestion::{Severity, Suggestion, SuggestionKey, SuggestionKind};

/// Insertion-ordered suggestions for one document.
///
/// Iteration order is display order and stays stable across merges and
/// removals.
#[derive(Debug, Default, Clone)]
pub struct SuggestionSet {
	entries: IndexMap<SuggestionId, Suggestion>,
}

impl SuggestionSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, id: SuggestionId) -> bool {
		self.entries.contains_key(&id)
	}

	pub fn get(&self, id: SuggestionId) -> Option<&Suggestion> {
		self.entries.get(&id)
	}

	pub(crate) fn get_mut(&mut self, id: SuggestionId) -> Option<&mut Suggestion> {
		self.entries.get_mut(&id)
	}

	/// Suggestions in display order.
	pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
		self.entries.values()
	}

	pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Suggestion> {
		self.entries.values_mut()
	}

	pub fn ids(&self) -> impl Iterator<Item = SuggestionId> + '_ {
		self.entries.keys().copied()
	}

	/// Suggestions ordered by anchor position; unanchored entries last.
	pub fn in_document_order(&self) -> Vec<&Suggestion> {
		let mut ordered: Vec<_> = self.entries.values().collect();
		ordered.sort_by_key(|s| s.range().map_or((1, 0), |range| (0, range.start)));
		ordered
	}

	pub fn of_kind(&self, kind: SuggestionKind) -> impl Iterator<Item = &Suggestion> {
		self.entries.values().filter(move |s| s.kind == kind)
	}

	/// Counts per kind and per severity.
	pub fn summary(&self) -> Summary {
		let mut summary = Summary::default();
		for suggestion in self.entries.values() {
			summary.total += 1;
			summary.kinds[suggestion.kind.index()] += 1;
			summary.severities[suggestion.severity.index()] += 1;
		}
		summary
	}

	/// True if a suggestion with `key`, anchored in `version`, overlaps `range`.
	///
	/// `exclude` skips one entry, for checking a suggestion against its peers.
	pub(crate) fn is_claimed(
		&self,
		key: &SuggestionKey,
		range: &TextRange,
		version: BufferVersion,
		exclude: Option<SuggestionId>,
	) -> bool {
		self.entries.values().any(|s| {
			Some(s.id) != exclude
				&& s.has_key(key)
				&& s.anchor
					.is_some_and(|anchor| anchor.version == version && anchor.range.overlaps(range))
		})
	}

	pub(crate) fn insert(&mut self, suggestion: Suggestion) {
		self.entries.insert(suggestion.id, suggestion);
	}

	/// Removes an entry, preserving the order of the rest.
	pub(crate) fn remove(&mut self, id: SuggestionId) -> Option<Suggestion> {
		self.entries.shift_remove(&id)
	}
}

/// Suggestion counts for a document, per kind and severity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
	pub total: usize,
	kinds: [usize; SuggestionKind::ALL.len()],
	severities: [usize; Severity::ALL.len()],
}

impl Summary {
	pub fn kind(&self, kind: SuggestionKind) -> usize {
		self.kinds[kind.index()]
	}

	pub fn severity(&self, severity: Severity) -> usize {
		self.severities[severity.index()]
	}
}

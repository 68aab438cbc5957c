//! Authoritative per-document suggestion state.
//!
//! [`Reconciler`] owns the [`SuggestionSet`] for one document and mediates
//! between scan results arriving asynchronously and the user's ongoing edits:
//! - Merging: new suggestions are anchored, de-duplicated, and appended.
//! - Reconciling: after an edit every anchor is re-validated, re-anchored
//!   once, or dropped.
//! - Dismissal: dismissed suggestions stay excluded for the whole session.
//! - Acceptance: apply, shift the remaining anchors, drop overlapped ones.
//!
//! Per suggestion the lifecycle is `anchored -> {applied | dismissed |
//! invalidated}`; anchoring happens immediately on merge.

use redline_primitives::{BufferVersion, SuggestionId, TextBuffer, TextRange};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use crate::anchor::{is_valid, resolve};
use crate::applier;
use crate::error::{Result, SuggestError};
use crate::index::TextOffsetIndex;
use crate::set::SuggestionSet;
use crate::suggestion::{Anchor, ProposedSuggestion, Suggestion, SuggestionKey, SuggestionKind};

/// Outcome of [`Reconciler::merge_scan_results`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
	/// Newly inserted ids, in insertion order.
	pub added: Vec<SuggestionId>,
	/// Incoming suggestions already present at an overlapping range.
	pub duplicates: usize,
	/// Incoming suggestions whose fragment was not found.
	pub unresolved: usize,
	/// Incoming suggestions matching a dismissed key.
	pub dismissed: usize,
	/// Incoming suggestions whose replacement equals the original.
	pub noops: usize,
	/// Existing suggestions dropped while catching up to the merge buffer.
	pub invalidated: Vec<SuggestionId>,
}

/// Outcome of [`Reconciler::on_buffer_changed`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
	/// Anchors that still matched in place.
	pub retained: usize,
	/// Anchors that broke and were placed again.
	pub reanchored: Vec<SuggestionId>,
	/// Suggestions removed because they could not be placed.
	pub invalidated: Vec<SuggestionId>,
}

/// Outcome of [`Reconciler::accept`].
#[derive(Debug, Clone)]
pub struct Accepted {
	/// The buffer to hand back to the editing surface.
	pub buffer: TextBuffer,
	pub suggestion: Suggestion,
	pub delta: isize,
	/// Pending suggestions dropped because they no longer matched `buffer` or
	/// overlapped the applied range.
	pub invalidated: Vec<SuggestionId>,
}

/// Outcome of [`Reconciler::accept_all`].
#[derive(Debug, Clone)]
pub struct AcceptAllReport {
	pub buffer: TextBuffer,
	pub applied: Vec<SuggestionId>,
	/// Suggestions whose text had drifted; removed without applying.
	pub expired: Vec<SuggestionId>,
	pub invalidated: Vec<SuggestionId>,
}

/// Per-document suggestion reconciler.
#[derive(Debug, Default)]
pub struct Reconciler {
	set: SuggestionSet,
	dismissed_ids: FxHashSet<SuggestionId>,
	dismissed_keys: FxHashSet<SuggestionKey>,
	next_id: u64,
}

impl Reconciler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn suggestions(&self) -> &SuggestionSet {
		&self.set
	}

	pub fn get(&self, id: SuggestionId) -> Option<&Suggestion> {
		self.set.get(id)
	}

	pub fn is_dismissed(&self, id: SuggestionId) -> bool {
		self.dismissed_ids.contains(&id)
	}

	fn issue_id(&mut self) -> SuggestionId {
		self.next_id += 1;
		SuggestionId(self.next_id)
	}

	fn needs_catch_up(&self, version: BufferVersion) -> bool {
		self.set
			.iter()
			.any(|s| s.anchor.is_none_or(|anchor| anchor.version != version))
	}

	/// Merges a scan's suggestions into the set.
	///
	/// Each incoming suggestion is anchored at the first occurrence of its
	/// fragment in `buffer`. It is a duplicate when an existing suggestion with
	/// the same `(original, replacement, kind)` key already overlaps that
	/// occurrence, so rescanning unchanged text adds nothing. Within one
	/// response, repeats of a key claim successive occurrences instead, so a
	/// typo made twice yields two cards. New entries get a fresh id and are
	/// appended after existing ones.
	///
	/// Existing anchors from an older buffer version are reconciled first so
	/// duplicate detection compares like with like.
	pub fn merge_scan_results(
		&mut self,
		incoming: impl IntoIterator<Item = ProposedSuggestion>,
		buffer: &TextBuffer,
	) -> MergeReport {
		let mut report = MergeReport::default();
		let version = buffer.version();

		if self.needs_catch_up(version) {
			report.invalidated = self.on_buffer_changed(buffer).invalidated;
		}

		let index = TextOffsetIndex::new(buffer);
		let mut batch: Vec<Suggestion> = Vec::new();
		for proposed in incoming {
			if proposed.is_noop() {
				report.noops += 1;
				continue;
			}
			let key = proposed.key();
			if self.dismissed_keys.contains(&key) {
				trace!(original = %key.original, kind = %key.kind, "suggest.merge.dismissed");
				report.dismissed += 1;
				continue;
			}

			let candidates = index.find_all(&proposed.original);
			let Some(&first) = candidates.first() else {
				trace!(original = %proposed.original, %version, "suggest.merge.unresolved");
				report.unresolved += 1;
				continue;
			};
			if self.set.is_claimed(&key, &first, version, None) {
				report.duplicates += 1;
				continue;
			}

			let claimed_in_batch = |range: &TextRange| {
				batch
					.iter()
					.any(|s| s.has_key(&key) && s.range().is_some_and(|claimed| claimed.overlaps(range)))
			};
			let Some(range) = candidates.into_iter().find(|range| !claimed_in_batch(range)) else {
				report.duplicates += 1;
				continue;
			};

			let id = self.issue_id();
			let mut suggestion = Suggestion::from_proposed(id, proposed);
			suggestion.anchor = Some(Anchor { range, version });
			batch.push(suggestion);
			report.added.push(id);
		}
		for suggestion in batch {
			self.set.insert(suggestion);
		}

		debug!(
			%version,
			added = report.added.len(),
			duplicates = report.duplicates,
			unresolved = report.unresolved,
			dismissed = report.dismissed,
			total = self.set.len(),
			"suggest.merge"
		);
		report
	}

	/// Re-validates every anchor against an edited buffer.
	///
	/// Anchors that still hold their text are kept (and stamped with the new
	/// version). Broken anchors get one re-anchor attempt near their previous
	/// position; if that fails, or lands on text already claimed by an
	/// identical suggestion, the suggestion is removed. A suggestion that cannot
	/// be trusted to point at real text is never kept.
	pub fn on_buffer_changed(&mut self, buffer: &TextBuffer) -> ReconcileReport {
		let mut report = ReconcileReport::default();
		let version = buffer.version();

		let mut broken = Vec::new();
		for suggestion in self.set.iter_mut() {
			if is_valid(suggestion, buffer) {
				if let Some(anchor) = suggestion.anchor.as_mut() {
					anchor.version = version;
				}
				report.retained += 1;
			} else {
				broken.push(suggestion.id);
			}
		}

		if broken.is_empty() {
			return report;
		}

		let index = TextOffsetIndex::new(buffer);
		for id in broken {
			let Some(suggestion) = self.set.get(id) else {
				continue;
			};
			let placed = resolve(&index, suggestion)
				.ok()
				.filter(|anchor| !self.set.is_claimed(&suggestion.key(), &anchor.range, version, Some(id)));

			match placed {
				Some(anchor) => {
					if let Some(suggestion) = self.set.get_mut(id) {
						suggestion.anchor = Some(anchor);
					}
					report.reanchored.push(id);
				}
				None => {
					self.set.remove(id);
					report.invalidated.push(id);
				}
			}
		}

		if !report.invalidated.is_empty() {
			debug!(
				%version,
				invalidated = report.invalidated.len(),
				reanchored = report.reanchored.len(),
				"suggest.reconcile.invalidated"
			);
		}
		report
	}

	/// Removes a suggestion and excludes its key from every later merge.
	pub fn dismiss(&mut self, id: SuggestionId) -> Result<Suggestion> {
		let suggestion = self.set.remove(id).ok_or(SuggestError::UnknownSuggestion(id))?;
		self.dismissed_ids.insert(id);
		self.dismissed_keys.insert(suggestion.key());
		debug!(%id, kind = %suggestion.kind, "suggest.dismiss");
		Ok(suggestion)
	}

	/// Removes a suggestion and hands it to the caller for application.
	///
	/// Does not touch any buffer. A second call with the same id fails with
	/// [`SuggestError::UnknownSuggestion`].
	pub fn take_for_apply(&mut self, id: SuggestionId) -> Result<Suggestion> {
		self.set.remove(id).ok_or(SuggestError::UnknownSuggestion(id))
	}

	/// Applies a suggestion to `buffer` and re-anchors the rest.
	///
	/// The remaining anchors are first reconciled against `buffer` when any of
	/// them predates it, so on success every remaining anchor refers to the
	/// returned buffer. On failure the buffer is untouched.
	///
	/// # Errors
	///
	/// - [`SuggestError::UnknownSuggestion`] for an id not in the set.
	/// - [`SuggestError::AnchorMismatch`] when the text under the anchor
	///   drifted. The stale suggestion is removed.
	pub fn accept(&mut self, id: SuggestionId, buffer: &TextBuffer) -> Result<Accepted> {
		let suggestion = self.take_for_apply(id)?;

		let mut invalidated = Vec::new();
		if self.needs_catch_up(buffer.version()) {
			invalidated = self.on_buffer_changed(buffer).invalidated;
		}

		let applied = match applier::apply(buffer, &suggestion) {
			Ok(applied) => applied,
			Err(err) => {
				warn!(%id, version = %buffer.version(), error = %err, "suggest.accept.stale");
				return Err(err);
			}
		};

		let shift = applier::shift_anchors(self.set.iter_mut(), applied.range, applied.delta, applied.buffer.version());
		for invalid in &shift.invalidated {
			self.set.remove(*invalid);
		}
		invalidated.extend(shift.invalidated);

		debug!(
			%id,
			delta = applied.delta,
			shifted = shift.shifted,
			invalidated = invalidated.len(),
			version = %applied.buffer.version(),
			"suggest.accept"
		);

		Ok(Accepted {
			buffer: applied.buffer,
			suggestion,
			delta: applied.delta,
			invalidated,
		})
	}

	/// Accepts every suggestion of `kind` (or all, for `None`) in document
	/// order, threading the buffer through each application.
	///
	/// Suggestions whose text drifted are removed and reported as expired;
	/// suggestions overlapped by an earlier application are invalidated.
	pub fn accept_all(&mut self, kind: Option<SuggestionKind>, buffer: &TextBuffer) -> AcceptAllReport {
		let targets: Vec<SuggestionId> = self
			.set
			.in_document_order()
			.into_iter()
			.filter(|s| kind.is_none_or(|kind| s.kind == kind))
			.map(|s| s.id)
			.collect();

		let mut report = AcceptAllReport {
			buffer: buffer.clone(),
			applied: Vec::new(),
			expired: Vec::new(),
			invalidated: Vec::new(),
		};

		for id in targets {
			if !self.set.contains(id) {
				continue;
			}
			match self.accept(id, &report.buffer) {
				Ok(accepted) => {
					report.buffer = accepted.buffer;
					report.applied.push(id);
					report.invalidated.extend(accepted.invalidated);
				}
				Err(SuggestError::AnchorMismatch { .. } | SuggestError::Unanchored(_)) => report.expired.push(id),
				Err(SuggestError::UnknownSuggestion(_) | SuggestError::AnchorResolution { .. }) => {}
			}
		}

		report
	}
}

#[cfg(test)]
mod tests;

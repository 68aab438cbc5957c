use pretty_assertions::assert_eq;
use redline_primitives::{BufferVersion, TextRange};

use super::*;
use crate::suggestion::Severity;

fn proposed(original: &str, replacement: &str, kind: SuggestionKind) -> ProposedSuggestion {
	ProposedSuggestion::new(original, replacement, kind, Severity::Medium)
}

fn spelling(original: &str, replacement: &str) -> ProposedSuggestion {
	proposed(original, replacement, SuggestionKind::Spelling)
}

fn buffer(text: &str, version: u64) -> TextBuffer {
	TextBuffer::new(text, BufferVersion(version))
}

fn range_of(reconciler: &Reconciler, id: SuggestionId) -> Option<TextRange> {
	reconciler.get(id).and_then(Suggestion::range)
}

#[test]
fn test_merge_anchors_and_assigns_fresh_ids() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve teh emails.", 1);

	let report = rec.merge_scan_results(vec![spelling("recieve", "receive"), spelling("teh", "the")], &buf);

	assert_eq!(report.added, vec![SuggestionId(1), SuggestionId(2)]);
	assert_eq!(range_of(&rec, SuggestionId(1)), Some(TextRange::new(2, 9)));
	assert_eq!(range_of(&rec, SuggestionId(2)), Some(TextRange::new(10, 13)));
	let ids: Vec<_> = rec.suggestions().ids().collect();
	assert_eq!(ids, vec![SuggestionId(1), SuggestionId(2)]);
}

#[test]
fn test_merge_drops_unresolved_and_noops() {
	let mut rec = Reconciler::new();
	let buf = buffer("All good here.", 1);

	let report = rec.merge_scan_results(vec![spelling("recieve", "receive"), spelling("good", "good"), spelling("  ", "x")], &buf);

	assert!(report.added.is_empty());
	assert_eq!(report.unresolved, 2);
	assert_eq!(report.noops, 1);
	assert!(rec.suggestions().is_empty());
}

#[test]
fn test_repeated_scan_does_not_duplicate() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);

	rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf);
	let report = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf);

	assert!(report.added.is_empty());
	assert_eq!(report.duplicates, 1);
	assert_eq!(rec.suggestions().len(), 1);
}

#[test]
fn test_rescans_of_repeated_fragment_are_idempotent() {
	let mut rec = Reconciler::new();
	let buf = buffer("very good and very bad and very ugly", 1);
	let response = || vec![proposed("very ", "", SuggestionKind::Clarity)];

	let first = rec.merge_scan_results(response(), &buf);
	let second = rec.merge_scan_results(response(), &buf);
	let third = rec.merge_scan_results(response(), &buf);

	assert_eq!(first.added.len(), 1);
	assert_eq!(range_of(&rec, first.added[0]), Some(TextRange::new(0, 5)));
	assert!(second.added.is_empty());
	assert!(third.added.is_empty());
	assert_eq!(second.duplicates + third.duplicates, 2);
	assert_eq!(rec.suggestions().len(), 1);
}

#[test]
fn test_rescan_keeps_both_cards_for_twice_listed_typo() {
	let mut rec = Reconciler::new();
	let buf = buffer("teh cat and teh dog", 1);
	let response = || vec![spelling("teh", "the"), spelling("teh", "the")];

	assert_eq!(rec.merge_scan_results(response(), &buf).added.len(), 2);
	let again = rec.merge_scan_results(response(), &buf);

	assert!(again.added.is_empty());
	assert_eq!(again.duplicates, 2);
	assert_eq!(rec.suggestions().len(), 2);
}

#[test]
fn test_same_fragment_different_kind_is_not_duplicate() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);

	rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf);
	let report = rec.merge_scan_results(vec![proposed("recieve", "get", SuggestionKind::Style)], &buf);

	assert_eq!(report.added.len(), 1);
	assert_eq!(rec.suggestions().len(), 2);
}

#[test]
fn test_repeated_typo_claims_each_occurrence() {
	let mut rec = Reconciler::new();
	let buf = buffer("teh cat and teh dog", 1);

	let report = rec.merge_scan_results(vec![spelling("teh", "the"), spelling("teh", "the"), spelling("teh", "the")], &buf);

	assert_eq!(report.added.len(), 2);
	assert_eq!(report.duplicates, 1);
	assert_eq!(range_of(&rec, report.added[0]), Some(TextRange::new(0, 3)));
	assert_eq!(range_of(&rec, report.added[1]), Some(TextRange::new(12, 15)));
}

#[test]
fn test_dismissed_never_reappears() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	let id = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf).added[0];

	let dismissed = rec.dismiss(id).unwrap();
	assert_eq!(dismissed.id, id);
	assert!(rec.is_dismissed(id));

	let report = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf);

	assert!(report.added.is_empty());
	assert_eq!(report.dismissed, 1);
	assert!(rec.get(id).is_none());
	assert!(rec.suggestions().is_empty());
}

#[test]
fn test_dismiss_unknown_id() {
	let mut rec = Reconciler::new();
	assert_eq!(rec.dismiss(SuggestionId(9)).unwrap_err(), SuggestError::UnknownSuggestion(SuggestionId(9)));
}

#[test]
fn test_edit_outside_range_keeps_anchor() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	let id = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf).added[0];

	let edited = buffer("I recieve letters.", 2);
	let report = rec.on_buffer_changed(&edited);

	assert_eq!(report.retained, 1);
	assert!(report.invalidated.is_empty());
	assert_eq!(rec.get(id).unwrap().anchor, Some(Anchor {
		range: TextRange::new(2, 9),
		version: BufferVersion(2),
	}));
}

#[test]
fn test_edit_before_range_reanchors() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	let id = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf).added[0];

	let edited = buffer("Daily, I recieve emails.", 2);
	let report = rec.on_buffer_changed(&edited);

	assert_eq!(report.reanchored, vec![id]);
	assert_eq!(range_of(&rec, id), Some(TextRange::new(9, 16)));
}

#[test]
fn test_edit_inside_range_invalidates() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	let id = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf).added[0];

	let edited = buffer("I receive emails.", 2);
	let report = rec.on_buffer_changed(&edited);

	assert_eq!(report.invalidated, vec![id]);
	assert!(rec.get(id).is_none());
}

#[test]
fn test_reanchor_does_not_collapse_twins() {
	let mut rec = Reconciler::new();
	let buf = buffer("teh cat and teh dog", 1);
	let added = rec.merge_scan_results(vec![spelling("teh", "the"), spelling("teh", "the")], &buf).added;

	// The user fixes the first one by hand and prepends text; only one "teh"
	// remains, so only one suggestion may survive.
	let edited = buffer("So the cat and teh dog", 2);
	let report = rec.on_buffer_changed(&edited);

	assert_eq!(rec.suggestions().len(), 1);
	assert_eq!(report.invalidated.len(), 1);
	let survivor = rec.suggestions().iter().next().unwrap();
	assert!(added.contains(&survivor.id));
	assert_eq!(survivor.range(), Some(TextRange::new(15, 18)));
}

#[test]
fn test_merge_catches_up_stale_anchors_first() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf);

	let edited = buffer("Now I recieve emails.", 2);
	let report = rec.merge_scan_results(vec![spelling("recieve", "receive")], &edited);

	assert_eq!(report.duplicates, 1);
	assert!(report.invalidated.is_empty());
	assert_eq!(rec.suggestions().len(), 1);
}

#[test]
fn test_accept_removes_and_shifts() {
	let mut rec = Reconciler::new();
	let buf = buffer("ts a tset", 1);
	let added = rec
		.merge_scan_results(vec![proposed("ts", "it's", SuggestionKind::Grammar), spelling("tset", "test")], &buf)
		.added;

	let accepted = rec.accept(added[0], &buf).unwrap();

	assert_eq!(accepted.buffer.to_string(), "it's a tset");
	assert_eq!(accepted.delta, 2);
	assert_eq!(accepted.buffer.version(), BufferVersion(2));
	assert!(rec.get(added[0]).is_none());
	assert_eq!(range_of(&rec, added[1]), Some(TextRange::new(7, 11)));
	assert!(accepted.buffer.matches_at(TextRange::new(7, 11), "tset"));
}

#[test]
fn test_accept_twice_is_rejected() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	let id = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf).added[0];

	let accepted = rec.accept(id, &buf).unwrap();
	assert_eq!(accepted.buffer.to_string(), "I receive emails.");

	assert_eq!(rec.accept(id, &accepted.buffer).unwrap_err(), SuggestError::UnknownSuggestion(id));
	assert_eq!(rec.take_for_apply(id).unwrap_err(), SuggestError::UnknownSuggestion(id));
}

#[test]
fn test_accept_stale_suggestion_is_declined_and_removed() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve emails.", 1);
	let id = rec.merge_scan_results(vec![spelling("recieve", "receive")], &buf).added[0];

	// The edit arrives without a reconcile pass in between.
	let edited = buffer("I recei emails.", 2);
	let err = rec.accept(id, &edited).unwrap_err();

	assert!(matches!(err, SuggestError::AnchorMismatch { id: got, .. } if got == id));
	assert!(rec.get(id).is_none());
	assert_eq!(edited.to_string(), "I recei emails.");
}

#[test]
fn test_accept_against_newer_buffer_reanchors_the_rest() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve teh emails.", 1);
	let added = rec
		.merge_scan_results(vec![spelling("recieve", "receive"), spelling("teh", "the")], &buf)
		.added;

	// An edit lands without a reconcile pass in between.
	let edited = buffer("I recieve a teh emails.", 2);
	let accepted = rec.accept(added[0], &edited).unwrap();

	assert_eq!(accepted.buffer.to_string(), "I receive a teh emails.");
	assert_eq!(accepted.buffer.version(), BufferVersion(3));
	assert!(accepted.invalidated.is_empty());

	let teh = rec.get(added[1]).unwrap();
	assert_eq!(teh.anchor, Some(Anchor {
		range: TextRange::new(12, 15),
		version: BufferVersion(3),
	}));
	assert!(accepted.buffer.matches_at(TextRange::new(12, 15), "teh"));
}

#[test]
fn test_accept_drops_peers_that_vanished_from_newer_buffer() {
	let mut rec = Reconciler::new();
	let buf = buffer("I recieve teh emails.", 1);
	let added = rec
		.merge_scan_results(vec![spelling("recieve", "receive"), spelling("teh", "the")], &buf)
		.added;

	let edited = buffer("I recieve the emails.", 2);
	let accepted = rec.accept(added[0], &edited).unwrap();

	assert_eq!(accepted.invalidated, vec![added[1]]);
	assert!(rec.suggestions().is_empty());
}

#[test]
fn test_accept_invalidates_overlapping() {
	let mut rec = Reconciler::new();
	let buf = buffer("their is a problem", 1);
	let added = rec
		.merge_scan_results(
			vec![
				proposed("their is", "there is", SuggestionKind::Grammar),
				proposed("is a problem", "is an issue", SuggestionKind::Style),
			],
			&buf,
		)
		.added;

	let accepted = rec.accept(added[0], &buf).unwrap();

	assert_eq!(accepted.invalidated, vec![added[1]]);
	assert!(rec.suggestions().is_empty());
	assert_eq!(accepted.buffer.to_string(), "there is a problem");
}

#[test]
fn test_accept_all_of_kind() {
	let mut rec = Reconciler::new();
	let buf = buffer("teh cat recieve teh fish, which is very very good", 1);
	rec.merge_scan_results(
		vec![
			spelling("teh", "the"),
			spelling("recieve", "received"),
			spelling("teh", "the"),
			proposed("very very", "very", SuggestionKind::Clarity),
		],
		&buf,
	);

	let report = rec.accept_all(Some(SuggestionKind::Spelling), &buf);

	assert_eq!(report.applied.len(), 3);
	assert!(report.expired.is_empty());
	assert_eq!(report.buffer.to_string(), "the cat received the fish, which is very very good");
	assert_eq!(report.buffer.version(), BufferVersion(4));

	let remaining: Vec<_> = rec.suggestions().iter().collect();
	assert_eq!(remaining.len(), 1);
	assert!(report.buffer.matches_at(remaining[0].range().unwrap(), "very very"));
}

#[test]
fn test_accept_all_without_filter() {
	let mut rec = Reconciler::new();
	let buf = buffer("ts a tset", 1);
	rec.merge_scan_results(vec![proposed("ts", "it's", SuggestionKind::Grammar), spelling("tset", "test")], &buf);

	let report = rec.accept_all(None, &buf);

	assert_eq!(report.buffer.to_string(), "it's a test");
	assert!(rec.suggestions().is_empty());
}

#[test]
fn test_summary_reflects_set() {
	let mut rec = Reconciler::new();
	let buf = buffer("teh cat, very very good", 1);
	rec.merge_scan_results(vec![spelling("teh", "the"), proposed("very very", "very", SuggestionKind::Clarity)], &buf);

	let summary = rec.suggestions().summary();
	assert_eq!(summary.total, 2);
	assert_eq!(summary.kind(SuggestionKind::Spelling), 1);
	assert_eq!(summary.kind(SuggestionKind::Clarity), 1);
	assert_eq!(summary.severity(Severity::Medium), 2);
}

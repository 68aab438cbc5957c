//! Suggestion engine: locates correction fragments in versioned text, keeps
//! them anchored while the user edits, and applies them without corrupting
//! unrelated text.
//!
//! Data flows leaves-first:
//! - [`index::TextOffsetIndex`] resolves literal fragments to character ranges.
//! - [`anchor`] binds a [`Suggestion`] to a range in one buffer version.
//! - [`Reconciler`] owns the per-document [`SuggestionSet`], merging scan
//!   results and re-validating anchors after edits.
//! - [`applier`] splices a suggestion into a buffer and shifts the others.

pub mod anchor;
pub mod applier;
mod error;
pub mod index;
mod reconciler;
mod set;
mod suggestion;

pub use anchor::is_valid;
pub use applier::{Applied, ShiftOutcome};
pub use error::{LabelError, Result, SuggestError};
pub use index::TextOffsetIndex;
pub use reconciler::{Accepted, AcceptAllReport, MergeReport, ReconcileReport, Reconciler};
pub use set::{SuggestionSet, Summary};
pub use suggestion::{Anchor, ProposedSuggestion, Severity, Suggestion, SuggestionKey, SuggestionKind};

//! Core types shared by the suggestion engine: buffer snapshots, character
//! ranges, and identifiers.

/// Immutable versioned text snapshots.
pub mod buffer;
/// Identifier types for documents and suggestions.
pub mod ids;
/// Character range types.
pub mod range;

pub use buffer::{BufferVersion, TextBuffer};
pub use ids::{DocumentId, SuggestionId};
pub use range::{CharIdx, CharLen, TextRange};
pub use ropey::{Rope, RopeSlice};

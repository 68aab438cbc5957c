use std::fmt;
use std::str::FromStr;

use redline_primitives::{BufferVersion, SuggestionId, TextRange};
use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// Category of a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SuggestionKind {
	Spelling,
	Grammar,
	Style,
	Punctuation,
	Clarity,
}

impl SuggestionKind {
	pub const ALL: [SuggestionKind; 5] = [
		SuggestionKind::Spelling,
		SuggestionKind::Grammar,
		SuggestionKind::Style,
		SuggestionKind::Punctuation,
		SuggestionKind::Clarity,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			SuggestionKind::Spelling => "spelling",
			SuggestionKind::Grammar => "grammar",
			SuggestionKind::Style => "style",
			SuggestionKind::Punctuation => "punctuation",
			SuggestionKind::Clarity => "clarity",
		}
	}

	pub(crate) fn index(self) -> usize {
		self as usize
	}
}

impl FromStr for SuggestionKind {
	type Err = LabelError;

	/// Parses a kind label, accepting the aliases analysis services emit.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"spelling" | "spell" | "typo" | "misspelling" => Ok(SuggestionKind::Spelling),
			"grammar" | "grammatical" => Ok(SuggestionKind::Grammar),
			"style" | "tone" | "word-choice" | "word_choice" | "wordchoice" => Ok(SuggestionKind::Style),
			"punctuation" | "punct" => Ok(SuggestionKind::Punctuation),
			"clarity" | "conciseness" | "readability" => Ok(SuggestionKind::Clarity),
			_ => Err(LabelError {
				field: "kind",
				value: s.to_string(),
			}),
		}
	}
}

impl TryFrom<String> for SuggestionKind {
	type Error = LabelError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl fmt::Display for SuggestionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How urgently a suggestion should be surfaced.
///
/// Accepts both the `high/medium/low` and `error/warning/suggestion`
/// vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Severity {
	High,
	Medium,
	Low,
}

impl Severity {
	pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

	pub fn as_str(self) -> &'static str {
		match self {
			Severity::High => "high",
			Severity::Medium => "medium",
			Severity::Low => "low",
		}
	}

	pub(crate) fn index(self) -> usize {
		self as usize
	}
}

impl FromStr for Severity {
	type Err = LabelError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"high" | "error" | "critical" => Ok(Severity::High),
			"medium" | "warning" | "moderate" => Ok(Severity::Medium),
			"low" | "suggestion" | "info" | "hint" => Ok(Severity::Low),
			_ => Err(LabelError {
				field: "severity",
				value: s.to_string(),
			}),
		}
	}
}

impl TryFrom<String> for Severity {
	type Error = LabelError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A suggestion's binding to a character range in one buffer version.
///
/// Invariant: `buffer[range] == original` held when the buffer was at
/// `version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
	pub range: TextRange,
	pub version: BufferVersion,
}

/// Identity used for duplicate detection and dismissal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuggestionKey {
	pub original: String,
	pub replacement: String,
	pub kind: SuggestionKind,
}

/// A validated suggestion as received from the analysis service, before it
/// has an id or an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedSuggestion {
	pub original: String,
	pub replacement: String,
	pub kind: SuggestionKind,
	pub severity: Severity,
	#[serde(default)]
	pub explanation: String,
}

impl ProposedSuggestion {
	pub fn new(original: impl Into<String>, replacement: impl Into<String>, kind: SuggestionKind, severity: Severity) -> Self {
		Self {
			original: original.into(),
			replacement: replacement.into(),
			kind,
			severity,
			explanation: String::new(),
		}
	}

	#[must_use]
	pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
		self.explanation = explanation.into();
		self
	}

	pub fn key(&self) -> SuggestionKey {
		SuggestionKey {
			original: self.original.clone(),
			replacement: self.replacement.clone(),
			kind: self.kind,
		}
	}

	/// True when applying the suggestion would not change the text.
	pub fn is_noop(&self) -> bool {
		self.original == self.replacement
	}
}

/// A suggestion tracked by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
	pub id: SuggestionId,
	/// Exact literal fragment expected in the buffer.
	pub original: String,
	pub replacement: String,
	pub kind: SuggestionKind,
	pub severity: Severity,
	/// Human-readable rationale; never parsed.
	pub explanation: String,
	/// Absent until resolved against a buffer.
	pub anchor: Option<Anchor>,
}

impl Suggestion {
	pub fn from_proposed(id: SuggestionId, proposed: ProposedSuggestion) -> Self {
		Self {
			id,
			original: proposed.original,
			replacement: proposed.replacement,
			kind: proposed.kind,
			severity: proposed.severity,
			explanation: proposed.explanation,
			anchor: None,
		}
	}

	pub fn range(&self) -> Option<TextRange> {
		self.anchor.map(|anchor| anchor.range)
	}

	pub fn key(&self) -> SuggestionKey {
		SuggestionKey {
			original: self.original.clone(),
			replacement: self.replacement.clone(),
			kind: self.kind,
		}
	}

	pub fn has_key(&self, key: &SuggestionKey) -> bool {
		self.kind == key.kind && self.original == key.original && self.replacement == key.replacement
	}

	/// Change in character length the suggestion causes when applied.
	pub fn len_delta(&self) -> isize {
		self.replacement.chars().count() as isize - self.original.chars().count() as isize
	}
}

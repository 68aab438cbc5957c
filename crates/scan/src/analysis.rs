//! Boundary with the external text-analysis service.
//!
//! Payloads from the service are dynamically shaped. They are validated here,
//! element by element, so only well-typed [`ProposedSuggestion`]s reach the
//! reconciler.

use std::time::Duration;

use async_trait::async_trait;
use redline_suggest::{ProposedSuggestion, Severity, SuggestionKind};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failures of one analysis round trip. Never fatal: the scheduler logs them
/// and the next countdown retries naturally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
	#[error("analysis transport failed: {0}")]
	Transport(String),
	/// The service answered with a non-success status.
	#[error("analysis service returned status {status}")]
	Service { status: u16 },
	#[error("malformed analysis payload: {0}")]
	Malformed(String),
	#[error("analysis timed out after {0:?}")]
	TimedOut(Duration),
}

/// Text sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
	pub text: String,
}

/// Validated analysis result.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisResponse {
	pub suggestions: Vec<ProposedSuggestion>,
	/// Elements dropped during validation.
	pub rejected: usize,
}

impl AnalysisResponse {
	pub fn new(suggestions: Vec<ProposedSuggestion>) -> Self {
		Self { suggestions, rejected: 0 }
	}

	/// Parses a `{"suggestions": [...]}` payload.
	///
	/// # Errors
	///
	/// Returns [`AnalysisError::Malformed`] when the payload is not JSON or has
	/// no `suggestions` array. Invalid elements are counted in `rejected`
	/// instead of failing the whole response.
	pub fn from_json(payload: &str) -> Result<Self, AnalysisError> {
		let value: Value = serde_json::from_str(payload).map_err(|err| AnalysisError::Malformed(err.to_string()))?;
		Self::from_value(&value)
	}

	pub fn from_value(value: &Value) -> Result<Self, AnalysisError> {
		let items = value
			.get("suggestions")
			.and_then(Value::as_array)
			.ok_or_else(|| AnalysisError::Malformed("missing `suggestions` array".into()))?;

		let mut response = AnalysisResponse::default();
		for (idx, item) in items.iter().enumerate() {
			match decode_suggestion(item) {
				Ok(suggestion) => response.suggestions.push(suggestion),
				Err(reason) => {
					debug!(idx, reason, "scan.analysis.rejected");
					response.rejected += 1;
				}
			}
		}
		Ok(response)
	}
}

fn str_field<'a>(item: &'a Value, names: &[&str]) -> Option<&'a str> {
	names.iter().find_map(|name| item.get(*name).and_then(Value::as_str))
}

/// Validates one element. Unknown kinds are rejected; unknown or missing
/// severities coerce to medium.
fn decode_suggestion(item: &Value) -> Result<ProposedSuggestion, &'static str> {
	let original = str_field(item, &["original"]).ok_or("missing original")?;
	if original.is_empty() {
		return Err("empty original");
	}
	let replacement = str_field(item, &["replacement", "suggestion"]).ok_or("missing replacement")?;
	let kind: SuggestionKind = str_field(item, &["kind", "type"])
		.ok_or("missing kind")?
		.parse()
		.map_err(|_| "unrecognized kind")?;
	let severity = str_field(item, &["severity"])
		.and_then(|label| label.parse().ok())
		.unwrap_or(Severity::Medium);
	let explanation = str_field(item, &["explanation", "message", "reason"]).unwrap_or_default();

	Ok(ProposedSuggestion::new(original, replacement, kind, severity).with_explanation(explanation))
}

/// The external text-analysis collaborator.
///
/// Constructed once and shared by every session. Implementations should map
/// non-success responses and unparsable payloads to [`AnalysisError`].
#[async_trait]
pub trait Analyzer: Send + Sync + 'static {
	async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, AnalysisError>;
}

use std::path::PathBuf;

use async_trait::async_trait;
use redline_scan::{AnalysisError, AnalysisRequest, AnalysisResponse, Analyzer};
use tracing::debug;

/// Analyzer that answers every request with a JSON payload read from disk.
///
/// The file is re-read per call so it can be edited between scans.
#[derive(Debug)]
pub struct FileAnalyzer {
	path: PathBuf,
}

impl FileAnalyzer {
	pub fn new(path: PathBuf) -> Self {
		Self { path }
	}
}

#[async_trait]
impl Analyzer for FileAnalyzer {
	async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
		debug!(path = %self.path.display(), chars = request.text.chars().count(), "cli.analyzer.request");
		let payload = tokio::fs::read_to_string(&self.path)
			.await
			.map_err(|err| AnalysisError::Transport(format!("{}: {err}", self.path.display())))?;
		AnalysisResponse::from_json(&payload)
	}
}

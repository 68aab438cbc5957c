//! Scan configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default quiet period before a scan fires.
pub const DEFAULT_INTERVAL_MS: u64 = 3_000;

/// Default time an analysis call may take before it is abandoned.
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 30_000;

/// Default number of documents that may start a scan in one tick.
pub const DEFAULT_MAX_DOCS_PER_TICK: usize = 8;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value parsed but is out of range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// Tunables for the scan scheduler.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
	/// Quiet period after the last edit before a scan fires. Zero scans on the
	/// next tick.
	pub interval_ms: u64,
	/// In-flight scans older than this are abandoned.
	pub scan_timeout_ms: u64,
	/// Minimum non-whitespace characters a buffer needs to be scanned.
	pub min_chars: usize,
	pub max_docs_per_tick: usize,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			interval_ms: DEFAULT_INTERVAL_MS,
			scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
			min_chars: 1,
			max_docs_per_tick: DEFAULT_MAX_DOCS_PER_TICK,
		}
	}
}

impl ScanConfig {
	pub fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}

	pub fn scan_timeout(&self) -> Duration {
		Duration::from_millis(self.scan_timeout_ms)
	}

	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()
	}

	/// Reads, parses, and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	fn validate(self) -> Result<Self, ConfigError> {
		if self.scan_timeout_ms == 0 {
			return Err(ConfigError::Invalid("scan_timeout_ms must be greater than zero".into()));
		}
		if self.max_docs_per_tick == 0 {
			return Err(ConfigError::Invalid("max_docs_per_tick must be greater than zero".into()));
		}
		Ok(self)
	}
}

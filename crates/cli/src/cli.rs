use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use redline_scan::ScanConfig;
use redline_suggest::SuggestionKind;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(about = "Anchor writing suggestions to a text and optionally apply them")]
#[command(version)]
pub struct Cli {
	/// Text file to check
	pub text: PathBuf,

	/// JSON payload standing in for the analysis service response
	#[arg(long, short = 's', value_name = "FILE")]
	pub suggestions: PathBuf,

	/// Scan configuration (defaults to the user config directory)
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Apply suggestions and print the resulting text (`all` or a kind)
	#[arg(long, value_name = "KIND")]
	pub apply: Option<ApplyTarget>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

/// Which suggestions `--apply` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyTarget {
	All,
	Kind(SuggestionKind),
}

impl ApplyTarget {
	pub fn kind(self) -> Option<SuggestionKind> {
		match self {
			Self::All => None,
			Self::Kind(kind) => Some(kind),
		}
	}
}

impl FromStr for ApplyTarget {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("all") {
			return Ok(Self::All);
		}
		s.parse().map(Self::Kind).map_err(|_| {
			let kinds: Vec<_> = SuggestionKind::ALL.iter().map(|k| k.as_str()).collect();
			format!("expected `all` or one of: {}", kinds.join(", "))
		})
	}
}

/// Default config location: `<config dir>/redline/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("redline").join("config.toml"))
}

/// Loads the explicit config file, else the default one if present, else
/// built-in defaults.
pub fn resolve_config(explicit: Option<&Path>, fallback: Option<PathBuf>) -> anyhow::Result<ScanConfig> {
	if let Some(path) = explicit {
		return ScanConfig::load(path).with_context(|| format!("loading config {}", path.display()));
	}

	match fallback.filter(|path| path.is_file()) {
		Some(path) => {
			tracing::debug!(path = %path.display(), "cli.config.default");
			ScanConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
		}
		None => Ok(ScanConfig::default()),
	}
}

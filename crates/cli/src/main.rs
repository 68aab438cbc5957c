//! Redline command-line driver.
//!
//! Opens one document session over a text file, runs a single scan against
//! a JSON payload, and prints the anchored suggestions. With `--apply` it
//! accepts the selected suggestions and prints the rewritten text instead.

mod analyzer;
mod cli;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::Parser;
use redline_primitives::{BufferVersion, DocumentId, TextBuffer};
use redline_scan::{ScanEvent, ScanManager};
use redline_suggest::SuggestionSet;
use serde_json::{Value, json};
use tracing::info;

use crate::analyzer::FileAnalyzer;
use crate::cli::Cli;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = cli::resolve_config(cli.config.as_deref(), cli::default_config_path())?;
	let text = tokio::fs::read_to_string(&cli.text)
		.await
		.with_context(|| format!("reading {}", cli.text.display()))?;

	let analyzer = Arc::new(FileAnalyzer::new(cli.suggestions.clone()));
	let (mut manager, mut events) = ScanManager::new(config, analyzer);
	let doc_id = DocumentId::next();

	// Batch runs have nothing to debounce: treat the document as already
	// quiet for a full interval.
	let opened = Instant::now();
	let due = opened + manager.config().interval();
	manager.open(doc_id, TextBuffer::new(&text, BufferVersion::INITIAL), opened);

	loop {
		let mut scanned = false;
		let stats = manager.tick(Instant::now().max(due));

		while let Ok(event) = events.try_recv() {
			match event {
				ScanEvent::ScanFailed { error, .. } => {
					return Err(anyhow::Error::new(error).context("analysis failed"));
				}
				ScanEvent::SuggestionsMerged {
					added,
					duplicates,
					unresolved,
					..
				} => {
					info!(added = added.len(), duplicates, unresolved, "scan merged");
					scanned = true;
				}
				_ => {}
			}
		}

		if scanned {
			break;
		}
		if stats.started == 0 && manager.in_flight_count() == 0 {
			bail!("{} was not scanned (below min_chars?)", cli.text.display());
		}
		tokio::time::sleep(POLL_INTERVAL).await;
	}

	let Some(suggestions) = manager.suggestions(doc_id) else {
		bail!("document session closed unexpectedly");
	};
	let summary = suggestions.summary();
	info!(total = summary.total, "suggestions anchored");

	match cli.apply {
		Some(target) => {
			let report = manager.accept_all(doc_id, target.kind(), Instant::now())?;
			info!(
				applied = report.applied.len(),
				expired = report.expired.len(),
				invalidated = report.invalidated.len(),
				"suggestions applied"
			);
			print!("{}", report.buffer);
		}
		None => {
			let rendered = serde_json::to_string_pretty(&render(suggestions))?;
			println!("{rendered}");
		}
	}

	manager.close(doc_id);
	Ok(())
}

/// Renders the set in document order as a JSON array.
fn render(set: &SuggestionSet) -> Value {
	let items: Vec<Value> = set
		.in_document_order()
		.into_iter()
		.map(|s| {
			let range = s.range();
			json!({
				"id": s.id.to_string(),
				"kind": s.kind.as_str(),
				"severity": s.severity.as_str(),
				"original": s.original,
				"replacement": s.replacement,
				"explanation": s.explanation,
				"start": range.map(|r| r.start),
				"end": range.map(|r| r.end),
			})
		})
		.collect();
	Value::Array(items)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("redline=debug,redline_scan=debug,redline_suggest=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

//! Scan manager owning one suggestion session per open document.
//!
//! [`ScanManager`] tracks, per document:
//! - The latest buffer snapshot from the editing surface
//! - The suggestion reconciler
//! - The scan scheduler (countdown, single in-flight scan, timeout)
//!
//! Scans run as spawned tasks and report over a completion channel that
//! [`ScanManager::tick`] drains. A completion is folded in only if the
//! document is still open in the same session epoch and the scheduler still
//! expects that ticket; everything else is discarded. Each scan task holds
//! its own cancellation token, fired when the scan times out or the session
//! closes, so at most one analyzer call per document is ever outstanding.
//!
//! # Error Handling
//!
//! Analysis failures and timeouts are logged, surfaced as
//! [`ScanEvent::ScanFailed`], and never propagate. The next countdown is the
//! retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use redline_primitives::{DocumentId, SuggestionId, TextBuffer};
use redline_suggest::{AcceptAllReport, Accepted, ReconcileReport, Reconciler, SuggestError, Suggestion, SuggestionKind, SuggestionSet};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResponse, Analyzer};
use crate::config::ScanConfig;
use crate::events::ScanEvent;
use crate::scheduler::{ScanPhase, ScanScheduler, ScanTicket};

/// Errors from document-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
	#[error("unknown document {0}")]
	UnknownDocument(DocumentId),
	#[error(transparent)]
	Suggest(#[from] SuggestError),
}

/// Statistics from one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
	pub started: usize,
	pub merged: usize,
	pub failed: usize,
	pub timed_out: usize,
	/// Completions for closed documents or superseded tickets.
	pub discarded: usize,
}

/// Completion message from spawned scan tasks.
#[derive(Debug)]
struct ScanComplete {
	doc_id: DocumentId,
	epoch: u64,
	ticket: ScanTicket,
	result: Result<AnalysisResponse, AnalysisError>,
}

/// Per-document session state.
#[derive(Debug)]
struct DocSession {
	/// Distinguishes reopenings of the same document id.
	epoch: u64,
	buffer: TextBuffer,
	reconciler: Reconciler,
	scheduler: ScanScheduler,
	cancel: CancellationToken,
	/// Child of `cancel` held by the in-flight scan task.
	scan_cancel: Option<CancellationToken>,
}

impl Drop for DocSession {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

/// Owns suggestion sessions for every open document.
pub struct ScanManager {
	config: ScanConfig,
	analyzer: Arc<dyn Analyzer>,
	docs: HashMap<DocumentId, DocSession>,
	next_epoch: u64,
	completion_rx: mpsc::UnboundedReceiver<ScanComplete>,
	completion_tx: mpsc::UnboundedSender<ScanComplete>,
	events: mpsc::UnboundedSender<ScanEvent>,
	cancel: CancellationToken,
}

impl std::fmt::Debug for ScanManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScanManager")
			.field("config", &self.config)
			.field("docs", &self.docs.len())
			.finish()
	}
}

impl Drop for ScanManager {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

impl ScanManager {
	/// Creates a manager and the receiver for its [`ScanEvent`]s.
	pub fn new(config: ScanConfig, analyzer: Arc<dyn Analyzer>) -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
		let (completion_tx, completion_rx) = mpsc::unbounded_channel();
		let (events, events_rx) = mpsc::unbounded_channel();
		let manager = Self {
			config,
			analyzer,
			docs: HashMap::new(),
			next_epoch: 0,
			completion_rx,
			completion_tx,
			events,
			cancel: CancellationToken::new(),
		};
		(manager, events_rx)
	}

	pub fn config(&self) -> &ScanConfig {
		&self.config
	}

	fn emit(&self, event: ScanEvent) {
		let _ = self.events.send(event);
	}

	fn session_mut(&mut self, doc_id: DocumentId) -> Result<&mut DocSession, SessionError> {
		self.docs.get_mut(&doc_id).ok_or(SessionError::UnknownDocument(doc_id))
	}

	/// Starts a session with an empty suggestion set and schedules the first
	/// scan. Reopening an id replaces the previous session.
	pub fn open(&mut self, doc_id: DocumentId, buffer: TextBuffer, now: Instant) {
		self.next_epoch += 1;
		debug!(%doc_id, epoch = self.next_epoch, version = %buffer.version(), "scan.manager.doc_open");

		let mut scheduler = ScanScheduler::new(self.config.interval());
		scheduler.on_text_changed(now);
		self.docs.insert(
			doc_id,
			DocSession {
				epoch: self.next_epoch,
				buffer,
				reconciler: Reconciler::new(),
				scheduler,
				cancel: self.cancel.child_token(),
				scan_cancel: None,
			},
		);
	}

	/// Ends a session. Pending countdowns die with it; a scan still in flight
	/// is discarded when it reports back.
	pub fn close(&mut self, doc_id: DocumentId) {
		if self.docs.remove(&doc_id).is_some() {
			debug!(%doc_id, "scan.manager.doc_close");
		}
	}

	pub fn is_open(&self, doc_id: DocumentId) -> bool {
		self.docs.contains_key(&doc_id)
	}

	pub fn buffer(&self, doc_id: DocumentId) -> Option<&TextBuffer> {
		self.docs.get(&doc_id).map(|s| &s.buffer)
	}

	pub fn suggestions(&self, doc_id: DocumentId) -> Option<&SuggestionSet> {
		self.docs.get(&doc_id).map(|s| s.reconciler.suggestions())
	}

	pub fn phase(&self, doc_id: DocumentId) -> Option<ScanPhase> {
		self.docs.get(&doc_id).map(|s| s.scheduler.phase())
	}

	/// Number of documents with a scan in flight.
	pub fn in_flight_count(&self) -> usize {
		self.docs
			.values()
			.filter(|s| matches!(s.scheduler.phase(), ScanPhase::Scanning | ScanPhase::ApplyingResults))
			.count()
	}

	/// Shortest wait until some countdown fires.
	pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
		self.docs.values().filter_map(|s| s.scheduler.time_until_due(now)).min()
	}

	/// Accepts a new snapshot from the editing surface.
	///
	/// Re-validates every suggestion against it and restarts the countdown.
	/// Snapshots not newer than the current one are ignored. Returns `None`
	/// when ignored.
	pub fn on_text_changed(
		&mut self,
		doc_id: DocumentId,
		buffer: TextBuffer,
		now: Instant,
	) -> Result<Option<ReconcileReport>, SessionError> {
		let session = self.session_mut(doc_id)?;
		if buffer.version() <= session.buffer.version() {
			trace!(
				%doc_id,
				current = %session.buffer.version(),
				got = %buffer.version(),
				"scan.manager.stale_snapshot"
			);
			return Ok(None);
		}

		let report = session.reconciler.on_buffer_changed(&buffer);
		session.buffer = buffer;
		session.scheduler.on_text_changed(now);

		if !report.invalidated.is_empty() {
			self.emit(ScanEvent::SuggestionsInvalidated {
				doc_id,
				ids: report.invalidated.clone(),
			});
		}
		Ok(Some(report))
	}

	/// Dismisses a suggestion for the rest of the session.
	pub fn dismiss(&mut self, doc_id: DocumentId, id: SuggestionId) -> Result<Suggestion, SessionError> {
		Ok(self.session_mut(doc_id)?.reconciler.dismiss(id)?)
	}

	/// Applies a suggestion to the session's current buffer.
	///
	/// On success the session adopts the returned buffer, which the caller
	/// must hand to the editing surface. On
	/// [`SuggestError::AnchorMismatch`] the suggestion is removed, a
	/// [`ScanEvent::SuggestionExpired`] notice is emitted, and the buffer is
	/// unchanged.
	pub fn accept(&mut self, doc_id: DocumentId, id: SuggestionId, now: Instant) -> Result<Accepted, SessionError> {
		let session = self.session_mut(doc_id)?;
		match session.reconciler.accept(id, &session.buffer) {
			Ok(accepted) => {
				session.buffer = accepted.buffer.clone();
				session.scheduler.on_text_changed(now);
				Ok(accepted)
			}
			Err(err) => {
				if matches!(err, SuggestError::AnchorMismatch { .. } | SuggestError::Unanchored(_)) {
					self.emit(ScanEvent::SuggestionExpired { doc_id, id });
				}
				Err(err.into())
			}
		}
	}

	/// Applies every suggestion of `kind` (all kinds for `None`).
	pub fn accept_all(
		&mut self,
		doc_id: DocumentId,
		kind: Option<SuggestionKind>,
		now: Instant,
	) -> Result<AcceptAllReport, SessionError> {
		let session = self.session_mut(doc_id)?;
		let report = session.reconciler.accept_all(kind, &session.buffer);
		if !report.applied.is_empty() {
			session.buffer = report.buffer.clone();
			session.scheduler.on_text_changed(now);
		}
		for &id in &report.expired {
			self.emit(ScanEvent::SuggestionExpired { doc_id, id });
		}
		Ok(report)
	}

	/// Folds finished scans in, abandons timed-out ones, and launches due ones.
	///
	/// Must be called from within a tokio runtime.
	pub fn tick(&mut self, now: Instant) -> TickStats {
		let mut stats = TickStats::default();
		self.poll_completions(now, &mut stats);
		self.check_timeouts(now, &mut stats);
		self.start_due_scans(now, &mut stats);
		stats
	}

	fn poll_completions(&mut self, now: Instant, stats: &mut TickStats) {
		while let Ok(complete) = self.completion_rx.try_recv() {
			let ScanComplete {
				doc_id,
				epoch,
				ticket,
				result,
			} = complete;

			let Some(session) = self.docs.get_mut(&doc_id).filter(|s| s.epoch == epoch) else {
				debug!(%doc_id, epoch, seq = ticket.seq, "scan.manager.discard_closed");
				stats.discarded += 1;
				continue;
			};
			if !session.scheduler.begin_applying(ticket) {
				debug!(%doc_id, seq = ticket.seq, "scan.manager.discard_stale");
				stats.discarded += 1;
				continue;
			}

			let event = match result {
				Ok(response) => {
					let report = session.reconciler.merge_scan_results(response.suggestions, &session.buffer);
					stats.merged += 1;
					debug!(
						%doc_id,
						scanned = %ticket.version,
						current = %session.buffer.version(),
						added = report.added.len(),
						rejected = response.rejected,
						"scan.manager.scan_done"
					);
					if !report.invalidated.is_empty() {
						let _ = self.events.send(ScanEvent::SuggestionsInvalidated {
							doc_id,
							ids: report.invalidated,
						});
					}
					ScanEvent::SuggestionsMerged {
						doc_id,
						added: report.added,
						duplicates: report.duplicates,
						unresolved: report.unresolved,
					}
				}
				Err(error) => {
					warn!(%doc_id, seq = ticket.seq, %error, "scan.manager.scan_failed");
					stats.failed += 1;
					ScanEvent::ScanFailed { doc_id, error }
				}
			};

			let merged = matches!(event, ScanEvent::SuggestionsMerged { .. });
			session.scheduler.finish(ticket, now);
			session.scan_cancel = None;
			let clean = merged && session.reconciler.suggestions().is_empty();
			let _ = self.events.send(event);
			if clean {
				let _ = self.events.send(ScanEvent::DocumentClean { doc_id });
			}
		}
	}

	fn check_timeouts(&mut self, now: Instant, stats: &mut TickStats) {
		let timeout = self.config.scan_timeout();
		for (&doc_id, session) in self.docs.iter_mut() {
			if session.scheduler.check_timeout(now, timeout).is_some() {
				// The abandoned call must not overlap the next scan.
				if let Some(token) = session.scan_cancel.take() {
					token.cancel();
				}
				stats.timed_out += 1;
				let _ = self.events.send(ScanEvent::ScanFailed {
					doc_id,
					error: AnalysisError::TimedOut(timeout),
				});
			}
		}
	}

	fn start_due_scans(&mut self, now: Instant, stats: &mut TickStats) {
		let due_docs: Vec<_> = self
			.docs
			.iter()
			.filter(|(_, session)| session.scheduler.is_due(now))
			.map(|(&doc_id, _)| doc_id)
			.take(self.config.max_docs_per_tick)
			.collect();

		for doc_id in due_docs {
			let Some(session) = self.docs.get_mut(&doc_id) else {
				continue;
			};

			let text = session.buffer.to_string();
			let significant = text.chars().filter(|c| !c.is_whitespace()).count();
			if significant < self.config.min_chars {
				trace!(%doc_id, significant, "scan.manager.skip_short");
				session.scheduler.skip();
				continue;
			}

			let version = session.buffer.version();
			let Some(ticket) = session.scheduler.begin_scan(now, version) else {
				continue;
			};
			stats.started += 1;
			debug!(%doc_id, seq = ticket.seq, %version, chars = session.buffer.len_chars(), "scan.manager.scan_start");

			let epoch = session.epoch;
			let cancel = session.cancel.child_token();
			session.scan_cancel = Some(cancel.clone());
			let analyzer = self.analyzer.clone();
			let tx = self.completion_tx.clone();

			tokio::spawn(async move {
				let result = tokio::select! {
					biased;
					_ = cancel.cancelled() => {
						trace!(%doc_id, seq = ticket.seq, "scan.manager.scan_abandoned");
						return;
					}
					result = analyzer.analyze(AnalysisRequest { text }) => result,
				};
				let _ = tx.send(ScanComplete {
					doc_id,
					epoch,
					ticket,
					result,
				});
			});

			self.emit(ScanEvent::ScanStarted { doc_id, version });
		}
	}
}

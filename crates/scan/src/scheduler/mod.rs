//! Per-document scan state machine.
//!
//! `Idle -> Countdown -> Scanning -> ApplyingResults -> {Idle | Countdown}`
//!
//! - Any edit starts or restarts the countdown from the full interval, so a
//!   scan only fires after a quiet period.
//! - At most one scan is in flight. Edits arriving while scanning are
//!   recorded and re-arm the countdown once the scan resolves.
//! - Results are matched to the in-flight ticket; anything else is stale.
//!
//! The scheduler holds no timers. The owner passes `now` into every
//! transition and polls [`ScanScheduler::is_due`], so dropping the
//! scheduler cancels everything it was waiting for.

use std::time::{Duration, Instant};

use redline_primitives::BufferVersion;
use tracing::warn;

/// Current phase of a document's scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
	/// No edits pending analysis.
	Idle,
	/// Edits pending, waiting for the quiet period to elapse.
	Countdown,
	/// An analysis call is in flight.
	Scanning,
	/// Results of the in-flight call are being merged.
	ApplyingResults,
}

/// Identifies one launched scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket {
	pub seq: u64,
	/// Buffer version the scanned text was taken from.
	pub version: BufferVersion,
}

/// Metadata about the in-flight scan.
#[derive(Debug, Clone, Copy)]
pub struct InFlightScan {
	pub ticket: ScanTicket,
	pub started_at: Instant,
}

#[derive(Debug)]
pub struct ScanScheduler {
	phase: ScanPhase,
	interval: Duration,
	deadline: Option<Instant>,
	inflight: Option<InFlightScan>,
	/// An edit arrived while a scan was in flight.
	edited_during_scan: bool,
	next_seq: u64,
}

impl ScanScheduler {
	pub fn new(interval: Duration) -> Self {
		Self {
			phase: ScanPhase::Idle,
			interval,
			deadline: None,
			inflight: None,
			edited_during_scan: false,
			next_seq: 0,
		}
	}

	pub fn phase(&self) -> ScanPhase {
		self.phase
	}

	pub fn inflight(&self) -> Option<&InFlightScan> {
		self.inflight.as_ref()
	}

	/// Records a text change.
	pub fn on_text_changed(&mut self, now: Instant) {
		match self.phase {
			ScanPhase::Idle | ScanPhase::Countdown => self.arm(now),
			ScanPhase::Scanning | ScanPhase::ApplyingResults => self.edited_during_scan = true,
		}
	}

	fn arm(&mut self, now: Instant) {
		self.phase = ScanPhase::Countdown;
		self.deadline = Some(now + self.interval);
	}

	/// True once the countdown has run out.
	pub fn is_due(&self, now: Instant) -> bool {
		self.phase == ScanPhase::Countdown && self.deadline.is_some_and(|deadline| now >= deadline)
	}

	/// Time left before the countdown fires, if one is running.
	pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
		if self.phase != ScanPhase::Countdown {
			return None;
		}
		self.deadline.map(|deadline| deadline.saturating_duration_since(now))
	}

	/// Transitions a due countdown to `Scanning`.
	///
	/// Returns `None` when not due, which includes the case of a scan already
	/// in flight.
	pub fn begin_scan(&mut self, now: Instant, version: BufferVersion) -> Option<ScanTicket> {
		if !self.is_due(now) {
			return None;
		}

		self.next_seq += 1;
		let ticket = ScanTicket {
			seq: self.next_seq,
			version,
		};
		self.phase = ScanPhase::Scanning;
		self.deadline = None;
		self.edited_during_scan = false;
		self.inflight = Some(InFlightScan { ticket, started_at: now });
		Some(ticket)
	}

	/// Returns a due countdown to `Idle` without scanning.
	pub fn skip(&mut self) {
		if self.phase == ScanPhase::Countdown {
			self.phase = ScanPhase::Idle;
			self.deadline = None;
		}
	}

	fn is_current(&self, ticket: ScanTicket) -> bool {
		self.inflight.is_some_and(|inflight| inflight.ticket == ticket)
	}

	/// Marks the in-flight scan's results as being merged.
	///
	/// Returns false for a stale ticket; its results must be discarded.
	pub fn begin_applying(&mut self, ticket: ScanTicket) -> bool {
		if self.phase != ScanPhase::Scanning || !self.is_current(ticket) {
			return false;
		}
		self.phase = ScanPhase::ApplyingResults;
		true
	}

	/// Resolves the in-flight scan, successful or not.
	///
	/// Goes back to `Idle`, or re-arms the countdown if the text changed while
	/// the scan was out. Returns false for a stale ticket.
	pub fn finish(&mut self, ticket: ScanTicket, now: Instant) -> bool {
		if !self.is_current(ticket) {
			return false;
		}
		self.inflight = None;
		if std::mem::take(&mut self.edited_during_scan) {
			self.arm(now);
		} else {
			self.phase = ScanPhase::Idle;
			self.deadline = None;
		}
		true
	}

	/// Abandons an in-flight scan older than `timeout`.
	///
	/// Returns the abandoned ticket. A result arriving later no longer matches
	/// and is discarded.
	pub fn check_timeout(&mut self, now: Instant, timeout: Duration) -> Option<ScanTicket> {
		let inflight = self.inflight?;
		if self.phase != ScanPhase::Scanning || now.duration_since(inflight.started_at) <= timeout {
			return None;
		}

		warn!(
			seq = inflight.ticket.seq,
			version = %inflight.ticket.version,
			"scan.scheduler.timeout"
		);
		self.finish(inflight.ticket, now);
		Some(inflight.ticket)
	}
}

//! Scan scheduling for the suggestion engine.
//!
//! [`ScanManager`] owns one session per open document: the latest buffer
//! snapshot, its [`Reconciler`](redline_suggest::Reconciler), and a
//! [`ScanScheduler`] that decides when to call the external [`Analyzer`].
//! The host drives everything through [`ScanManager::tick`]; scans run as
//! tokio tasks and report back over a channel.

mod analysis;
mod config;
mod events;
mod manager;
mod scheduler;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisResponse, Analyzer};
pub use config::{ConfigError, ScanConfig};
pub use events::ScanEvent;
pub use manager::{ScanManager, SessionError, TickStats};
pub use scheduler::{InFlightScan, ScanPhase, ScanScheduler, ScanTicket};

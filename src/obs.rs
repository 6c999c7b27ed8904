//! Optional observability helpers for token fetches and request latency.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run token fetches inside spans named `linkedin_mcp.token` with `flow` and
//!   `grant` fields, and to emit events for absorbed background failures and credential resets.
//! - Enable `metrics` to increment `linkedin_mcp_token_fetch_total` (labeled by `flow` + `outcome`)
//!   and to feed `linkedin_mcp_request_duration_ms` (labeled by `category`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Token fetch kinds observed by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenFlow {
	/// Foreground fetch performed by `authenticate`.
	Authenticate,
	/// Fire-and-forget refresh scheduled by `access_token`.
	BackgroundRefresh,
}
impl TokenFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenFlow::Authenticate => "authenticate",
			TokenFlow::BackgroundRefresh => "background_refresh",
		}
	}
}
impl Display for TokenFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// A fetch was started.
	Attempt,
	/// The fetch stored a new token.
	Success,
	/// The fetch failed.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

// self
use crate::{_prelude::*, auth::GrantType, obs::TokenFlow};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapping a single token fetch.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the flow and grant.
	pub fn new(flow: TokenFlow, grant: GrantType) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("linkedin_mcp.token", flow = flow.as_str(), grant = grant.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (flow, grant);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a background refresh failure; the error is never propagated.
pub fn log_background_refresh_failure(err: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %err, "Background token refresh failed; keeping the current token.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}

/// Logs that a failed foreground fetch cleared the credential.
pub fn log_credential_reset(err: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %err, "Token fetch failed; credential cleared.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}

/// Logs why a token fetch or refresh was skipped.
pub fn log_fetch_skipped(flow: TokenFlow, reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = flow.as_str(), reason, "Token fetch skipped.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (flow, reason);
	}
}

/// Logs that every performance counter was reset.
pub fn log_metrics_reset() {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!("Request metrics reset.");
	}
}

// self
use crate::obs::{FlowOutcome, TokenFlow};

/// Records a token fetch outcome via the global metrics recorder (when enabled).
pub fn record_fetch_outcome(flow: TokenFlow, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"linkedin_mcp_token_fetch_total",
			"flow" => flow.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (flow, outcome);
	}
}

/// Records one request latency sample via the global metrics recorder (when enabled).
pub fn record_request_latency(category: &'static str, elapsed_ms: u64) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("linkedin_mcp_request_duration_ms", "category" => category)
			.record(elapsed_ms as f64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (category, elapsed_ms);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_installed_recorder() {
		record_fetch_outcome(TokenFlow::Authenticate, FlowOutcome::Failure);
		record_request_latency("profile", 42);
	}
}

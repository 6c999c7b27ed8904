//! Walks through a token's lifecycle against a mock LinkedIn token endpoint and reports the
//! latency of a few simulated API calls.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
// self
use linkedin_mcp_core::{
	clock::ManualClock,
	config::TokenManagerConfig,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	perf::{MetricCategory, MetricsCollector},
	token::ReqwestTokenManager,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/accessToken");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"expires_in\":3600}",
			);
		})
		.await;
	let config = TokenManagerConfig::builder()
		.client_id("demo-client")
		.client_secret("super-secret")
		.auth_base_url(server.url("/oauth/v2"))
		.build()?;
	let clock = ManualClock::default();
	let manager = ReqwestTokenManager::with_clock(
		config,
		ReqwestHttpClient::new()?,
		Arc::new(ReqwestTransportErrorMapper),
		Arc::new(clock.clone()),
	);
	let collector = MetricsCollector::new();

	collector.time("/oauth/v2/accessToken", manager.authenticate()).await?;

	println!("after authenticate: state={} token={}", manager.state(), manager.access_token()?);

	for path in ["/people/(id:demo)", "/search/people?keywords=rust", "/messages/42"] {
		let authorization = manager.access_token()?.bearer();

		collector
			.time(path, async {
				// Stand-in for the real API call carrying `authorization`.
				tokio::time::sleep(std::time::Duration::from_millis(15)).await;

				authorization.len()
			})
			.await;
	}

	clock.advance(Duration::seconds(3_400));

	println!("near expiry: state={}", manager.state());

	let _ = manager.access_token()?;

	manager.wait_for_background_refresh().await;

	token_mock.assert_calls_async(2).await;

	println!(
		"after background refresh: state={} scheduled={}",
		manager.state(),
		manager.fetch_metrics().background_refreshes_scheduled(),
	);

	let profile = collector.metrics_for_category(MetricCategory::Profile);

	println!("profile: {profile:?}");
	println!("{}", serde_json::to_string_pretty(&collector.detailed_metrics())?);

	Ok(())
}

#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime, macros};
// self
use linkedin_mcp_core::{
	auth::TokenState,
	clock::ManualClock,
	config::{TokenManagerConfig, TokenManagerConfigBuilder},
	error::{AuthenticationError, Error},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	token::ReqwestTokenManager,
};

const CLIENT_ID: &str = "client-linkedin";
const CLIENT_SECRET: &str = "secret-linkedin";
const TOKEN_PATH: &str = "/oauth/v2/accessToken";

fn config(server: &MockServer) -> TokenManagerConfigBuilder {
	TokenManagerConfig::builder()
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.auth_base_url(server.url("/oauth/v2"))
}

fn manager(config: TokenManagerConfig) -> ReqwestTokenManager {
	ReqwestTokenManager::new(config).expect("Reqwest token manager should build.")
}

fn manual_manager(config: TokenManagerConfig, clock: &ManualClock) -> ReqwestTokenManager {
	let http_client = ReqwestHttpClient::new().expect("Reqwest client should build.");

	ReqwestTokenManager::with_clock(
		config,
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
		Arc::new(clock.clone()),
	)
}

#[tokio::test]
async fn authenticate_fetches_once_while_token_is_valid() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"token-1\",\"expires_in\":3600}");
		})
		.await;
	let manager = manager(config(&server).build().expect("Config should build."));

	assert_eq!(manager.state(), TokenState::NoToken);
	assert!(matches!(manager.access_token(), Err(Error::NotAuthenticated)));

	manager.authenticate().await.expect("First authenticate should succeed.");
	manager.authenticate().await.expect("Second authenticate should be a no-op.");

	mock.assert_calls_async(1).await;

	assert_eq!(manager.access_token().expect("Token should be held.").expose(), "token-1");
	assert_eq!(manager.state(), TokenState::Valid);
	assert_eq!(manager.fetch_metrics().successes(), 1);
}

#[tokio::test]
async fn seeded_token_is_used_without_network() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500);
		})
		.await;
	let manager = manager(
		config(&server)
			.access_token("seeded-token")
			.access_token_expires_in(Duration::hours(1))
			.build()
			.expect("Config should build."),
	);

	manager.authenticate().await.expect("Seeded token should satisfy authenticate.");

	mock.assert_calls_async(0).await;

	assert_eq!(manager.access_token().expect("Seeded token should be held.").expose(), "seeded-token");
}

#[tokio::test]
async fn rejected_credentials_clear_the_credential() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_client\",\"error_description\":\"Client authentication failed\"}",
			);
		})
		.await;
	let manager = manager(config(&server).build().expect("Config should build."));
	let err = manager.authenticate().await.expect_err("401 must fail authentication.");

	mock.assert_async().await;

	assert!(err.is_rejected(), "Unexpected error: {err:?}.");
	assert!(err.to_string().contains("Client authentication failed"));
	assert!(matches!(manager.access_token(), Err(Error::NotAuthenticated)));
	assert_eq!(manager.state(), TokenState::NoToken);
}

#[tokio::test]
async fn upstream_failure_carries_retry_after() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(503).header("retry-after", "7").body("maintenance");
		})
		.await;
	let manager = manager(config(&server).build().expect("Config should build."));
	let err = manager.authenticate().await.expect_err("503 must fail authentication.");

	match err {
		Error::Authentication(AuthenticationError::Upstream { status, retry_after, message }) => {
			assert_eq!(status, 503);
			assert_eq!(retry_after, Some(Duration::seconds(7)));
			assert_eq!(message, "maintenance");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_success_body_fails_authentication() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"token-without-expiry\"}");
		})
		.await;
	let manager = manager(config(&server).build().expect("Config should build."));
	let err = manager.authenticate().await.expect_err("Missing expires_in must fail.");

	assert!(matches!(err, Error::Authentication(AuthenticationError::MalformedResponse { .. })));
	assert_eq!(manager.state(), TokenState::NoToken);
}

#[tokio::test]
async fn missing_client_credentials_never_reach_the_endpoint() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"unused\",\"expires_in\":60}");
		})
		.await;
	let manager = manager(
		TokenManagerConfig::builder()
			.auth_base_url(server.url("/oauth/v2"))
			.build()
			.expect("Config should build."),
	);
	let err = manager.authenticate().await.expect_err("Missing credentials must fail.");

	mock.assert_calls_async(0).await;

	assert!(err.is_config());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.delay(std::time::Duration::from_secs(2))
				.body("{\"access_token\":\"late\",\"expires_in\":60}");
		})
		.await;
	let manager = manager(
		config(&server)
			.request_timeout(Duration::milliseconds(100))
			.build()
			.expect("Config should build."),
	);
	let err = manager.authenticate().await.expect_err("Slow endpoint must time out.");

	assert!(err.is_transport(), "Unexpected error: {err:?}.");
	assert!(matches!(manager.access_token(), Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn expiring_seeded_token_is_refreshed_in_background() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"fresh-token\",\"expires_in\":3600,\"refresh_token\":\"r2\"}");
		})
		.await;
	let clock = ManualClock::new(macros::datetime!(2025-06-01 08:00 UTC));
	let manager = manual_manager(
		config(&server)
			.access_token("seeded-token")
			.refresh_token("seeded-refresh")
			.access_token_expires_in(Duration::seconds(3600))
			.build()
			.expect("Config should build."),
		&clock,
	);

	manager.authenticate().await.expect("Seeded token should satisfy authenticate.");

	assert_eq!(manager.access_token().expect("Seeded token is held.").expose(), "seeded-token");
	assert_eq!(manager.state(), TokenState::Valid);
	assert_eq!(manager.fetch_metrics().background_refreshes_scheduled(), 0);

	clock.advance(Duration::seconds(3596));

	assert_eq!(manager.state(), TokenState::ExpiringSoon);

	for _ in 0..5 {
		let token = manager.access_token().expect("Expiring token is still returned.");

		assert_eq!(token.expose(), "seeded-token");
	}

	assert_eq!(manager.fetch_metrics().background_refreshes_scheduled(), 1);

	manager.wait_for_background_refresh().await;

	mock.assert_calls_async(1).await;

	assert_eq!(manager.access_token().expect("Refreshed token is held.").expose(), "fresh-token");
	assert_eq!(manager.state(), TokenState::Valid);
	assert_eq!(manager.fetch_metrics().background_refreshes_scheduled(), 1);
}

#[tokio::test]
async fn expired_token_is_reacquired_by_authenticate() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"second-token\",\"expires_in\":60}");
		})
		.await;
	let clock = ManualClock::new(OffsetDateTime::UNIX_EPOCH + Duration::days(20_000));
	let manager = manual_manager(
		config(&server)
			.access_token("first-token")
			.access_token_expires_in(Duration::seconds(30))
			.build()
			.expect("Config should build."),
		&clock,
	);

	clock.advance(Duration::seconds(31));

	assert_eq!(manager.state(), TokenState::Expired);

	manager.authenticate().await.expect("Expired token should be reacquired.");

	mock.assert_calls_async(1).await;

	assert_eq!(manager.access_token().expect("New token is held.").expose(), "second-token");
}

#[tokio::test]
async fn rejected_refresh_clears_previously_held_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"The refresh token was revoked\"}",
			);
		})
		.await;
	let clock = ManualClock::new(macros::datetime!(2025-06-01 08:00 UTC));
	let manager = manual_manager(
		config(&server)
			.access_token("held-token")
			.refresh_token("revoked-refresh")
			.access_token_expires_in(Duration::seconds(60))
			.build()
			.expect("Config should build."),
		&clock,
	);

	manager.authenticate().await.expect("Held token should satisfy authenticate.");

	clock.advance(Duration::seconds(61));

	assert_eq!(manager.state(), TokenState::Expired);

	let err = manager.authenticate().await.expect_err("Revoked refresh token must fail.");

	mock.assert_calls_async(1).await;

	assert!(err.is_rejected(), "Unexpected error: {err:?}.");
	assert!(matches!(manager.access_token(), Err(Error::NotAuthenticated)));
	assert_eq!(manager.state(), TokenState::NoToken);
}

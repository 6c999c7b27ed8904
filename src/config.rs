//! Token manager configuration resolved once at construction.
//!
//! [`TokenManagerConfig`] is immutable: every value the manager needs (client credentials,
//! endpoint, pre-seeded token, refresh threshold, request timeout) is a plain field. Build it
//! with [`TokenManagerConfig::builder`] or load it from `LINKEDIN_*` environment variables via
//! [`TokenManagerConfig::from_env`].

// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable holding the OAuth client identifier.
pub const ENV_CLIENT_ID: &str = "LINKEDIN_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "LINKEDIN_CLIENT_SECRET";
/// Environment variable overriding the authorization base URL.
pub const ENV_AUTH_BASE_URL: &str = "LINKEDIN_AUTH_BASE_URL";
/// Environment variable holding a pre-issued access token.
pub const ENV_ACCESS_TOKEN: &str = "LINKEDIN_ACCESS_TOKEN";
/// Environment variable holding a pre-issued refresh token.
pub const ENV_REFRESH_TOKEN: &str = "LINKEDIN_REFRESH_TOKEN";
/// Environment variable holding the pre-issued access token lifetime in seconds.
pub const ENV_ACCESS_TOKEN_EXPIRES_IN: &str = "LINKEDIN_ACCESS_TOKEN_EXPIRES_IN";

/// Validated configuration consumed by [`TokenManager`](crate::token::TokenManager).
#[derive(Clone, PartialEq, Eq)]
pub struct TokenManagerConfig {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<String>,
	/// Authorization base URL, e.g. `https://www.linkedin.com/oauth/v2`.
	pub auth_base_url: Url,
	/// Resolved `{auth_base_url}/accessToken` endpoint.
	pub token_endpoint: Url,
	/// Pre-issued access token that bypasses the first fetch.
	pub access_token: Option<String>,
	/// Pre-issued refresh token.
	pub refresh_token: Option<String>,
	/// Lifetime of the pre-issued access token; `None` means it never expires.
	pub access_token_expires_in: Option<Duration>,
	/// Remaining lifetime at which a background refresh is triggered.
	pub refresh_threshold: Duration,
	/// Upper bound on a single token endpoint call.
	pub request_timeout: Duration,
}
impl TokenManagerConfig {
	/// Default authorization base URL.
	pub const DEFAULT_AUTH_BASE_URL: &'static str = "https://www.linkedin.com/oauth/v2";
	/// Default proactive refresh threshold.
	pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::minutes(5);
	/// Default token request timeout.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);
	/// Largest accepted magnitude for a seeded access token lifetime.
	pub const MAX_SEEDED_LIFETIME: Duration = Duration::days(36_500);

	/// Creates a new builder with defaults applied.
	pub fn builder() -> TokenManagerConfigBuilder {
		TokenManagerConfigBuilder::default()
	}

	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through an arbitrary variable lookup.
	///
	/// Empty values are treated as absent.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let mut builder = Self::builder();

		if let Some(value) = read(ENV_CLIENT_ID) {
			builder = builder.client_id(value);
		}
		if let Some(value) = read(ENV_CLIENT_SECRET) {
			builder = builder.client_secret(value);
		}
		if let Some(value) = read(ENV_AUTH_BASE_URL) {
			builder = builder.auth_base_url(value);
		}
		if let Some(value) = read(ENV_ACCESS_TOKEN) {
			builder = builder.access_token(value);
		}
		if let Some(value) = read(ENV_REFRESH_TOKEN) {
			builder = builder.refresh_token(value);
		}
		if let Some(value) = read(ENV_ACCESS_TOKEN_EXPIRES_IN) {
			let secs = value
				.trim()
				.parse::<i64>()
				.map_err(|_| ConfigError::InvalidEnvValue { name: ENV_ACCESS_TOKEN_EXPIRES_IN })?;

			builder = builder.access_token_expires_in(Duration::seconds(secs));
		}

		builder.build()
	}

	/// Returns both client credentials, or [`ConfigError::MissingClientCredentials`].
	pub fn client_credentials(&self) -> Result<(&str, &str), ConfigError> {
		match (self.client_id.as_deref(), self.client_secret.as_deref()) {
			(Some(id), Some(secret)) => Ok((id, secret)),
			_ => Err(ConfigError::MissingClientCredentials),
		}
	}
}
impl Debug for TokenManagerConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManagerConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("access_token_set", &self.access_token.is_some())
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("access_token_expires_in", &self.access_token_expires_in)
			.field("refresh_threshold", &self.refresh_threshold)
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

/// Builder for [`TokenManagerConfig`] values.
#[derive(Clone, Debug)]
pub struct TokenManagerConfigBuilder {
	client_id: Option<String>,
	client_secret: Option<String>,
	auth_base_url: String,
	access_token: Option<String>,
	refresh_token: Option<String>,
	access_token_expires_in: Option<Duration>,
	refresh_threshold: Duration,
	request_timeout: Duration,
}
impl TokenManagerConfigBuilder {
	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Overrides the authorization base URL.
	pub fn auth_base_url(mut self, value: impl Into<String>) -> Self {
		self.auth_base_url = value.into();

		self
	}

	/// Seeds a pre-issued access token.
	pub fn access_token(mut self, value: impl Into<String>) -> Self {
		self.access_token = Some(value.into());

		self
	}

	/// Seeds a pre-issued refresh token.
	pub fn refresh_token(mut self, value: impl Into<String>) -> Self {
		self.refresh_token = Some(value.into());

		self
	}

	/// Sets the lifetime of the seeded access token, counted from manager construction.
	pub fn access_token_expires_in(mut self, value: Duration) -> Self {
		self.access_token_expires_in = Some(value);

		self
	}

	/// Overrides the proactive refresh threshold (negative values clamp to zero).
	pub fn refresh_threshold(mut self, value: Duration) -> Self {
		self.refresh_threshold = if value.is_negative() { Duration::ZERO } else { value };

		self
	}

	/// Overrides the token request timeout.
	pub fn request_timeout(mut self, value: Duration) -> Self {
		self.request_timeout = value;

		self
	}

	/// Validates the builder and produces a [`TokenManagerConfig`].
	pub fn build(self) -> Result<TokenManagerConfig> {
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout.into());
		}
		if let Some(lifetime) = self
			.access_token_expires_in
			.filter(|lifetime| lifetime.abs() > TokenManagerConfig::MAX_SEEDED_LIFETIME)
		{
			return Err(ConfigError::SeededLifetimeOutOfRange {
				lifetime,
				max: TokenManagerConfig::MAX_SEEDED_LIFETIME,
			}
			.into());
		}

		let auth_base_url = Url::parse(&self.auth_base_url).map_err(|source| {
			ConfigError::InvalidAuthBaseUrl { value: self.auth_base_url.clone(), source }
		})?;
		let token_endpoint = token_endpoint(&self.auth_base_url)?;

		Ok(TokenManagerConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			auth_base_url,
			token_endpoint,
			access_token: self.access_token,
			refresh_token: self.refresh_token,
			access_token_expires_in: self.access_token_expires_in,
			refresh_threshold: self.refresh_threshold,
			request_timeout: self.request_timeout,
		})
	}
}
impl Default for TokenManagerConfigBuilder {
	fn default() -> Self {
		Self {
			client_id: None,
			client_secret: None,
			auth_base_url: TokenManagerConfig::DEFAULT_AUTH_BASE_URL.into(),
			access_token: None,
			refresh_token: None,
			access_token_expires_in: None,
			refresh_threshold: TokenManagerConfig::DEFAULT_REFRESH_THRESHOLD,
			request_timeout: TokenManagerConfig::DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

fn token_endpoint(base: &str) -> Result<Url, ConfigError> {
	let joined = format!("{}/accessToken", base.trim_end_matches('/'));

	Url::parse(&joined).map_err(|source| ConfigError::InvalidAuthBaseUrl { value: base.into(), source })
}

//! Crate-level error types shared by the token manager and its transports.

// self
use crate::{_prelude::*, auth::GrantType};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fix the configuration instead of retrying.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token acquisition failed; the held credential has been cleared.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// No access token is held; call `authenticate` first.
	#[error("No access token is available; authenticate before issuing requests.")]
	NotAuthenticated,
}
impl Error {
	/// Returns `true` when the failure stems from missing or invalid local configuration.
	pub fn is_config(&self) -> bool {
		matches!(self, Self::Config(_))
	}

	/// Returns `true` when the token endpoint rejected the presented credentials.
	pub fn is_rejected(&self) -> bool {
		matches!(self, Self::Authentication(AuthenticationError::Rejected { .. }))
	}

	/// Returns `true` when the token endpoint could not be reached.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Authentication(AuthenticationError::Transport(_)))
	}
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		Self::Authentication(e.into())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client identifier or secret is absent when a token fetch is attempted.
	#[error("LinkedIn client credentials are not configured; set the client id and secret.")]
	MissingClientCredentials,
	/// Authorization base URL cannot be parsed.
	#[error("Authorization base URL `{value}` is invalid.")]
	InvalidAuthBaseUrl {
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Environment value could not be parsed.
	#[error("Environment variable `{name}` has an invalid value.")]
	InvalidEnvValue {
		/// Variable name.
		name: &'static str,
	},
	/// Seeded access token lifetime exceeds the supported range.
	#[error("Seeded access token lifetime {lifetime} exceeds the supported maximum of {max}.")]
	SeededLifetimeOutOfRange {
		/// Configured lifetime.
		lifetime: Duration,
		/// Largest accepted magnitude.
		max: Duration,
	},
	/// Token request timeout must be positive.
	#[error("Token request timeout must be positive.")]
	NonPositiveTimeout,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint failures surfaced by a foreground fetch.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Token endpoint rejected the credentials or refresh token.
	#[error("LinkedIn rejected the {grant} grant (HTTP {status}): {reason}.")]
	Rejected {
		/// Grant that was attempted.
		grant: GrantType,
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Token endpoint failed temporarily (5xx, 408, 429).
	#[error("Token endpoint is unavailable (HTTP {status}): {message}.")]
	Upstream {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Provider- or crate-supplied message.
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Response parsed but lacks required fields.
	#[error("Token endpoint returned an unusable response: {reason}.")]
	MalformedResponse {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// What was wrong with the body.
		reason: String,
	},
	/// Response body is not valid JSON for the token contract.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Network or IO failure while calling the endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Token endpoint did not answer within the configured timeout.
	#[error("Token endpoint did not respond within {after}.")]
	Timeout {
		/// Configured timeout that elapsed.
		after: Duration,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

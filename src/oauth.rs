//! Token endpoint exchange: request encoding, response decoding, and error classification.
//!
//! The contract is LinkedIn's `POST {auth_base_url}/accessToken`, sent as an urlencoded form
//! carrying `client_id`, `client_secret`, `grant_type`, and `refresh_token` when refreshing.
//! A 2xx answer must be JSON with `access_token` and `expires_in` (and optionally a rotated
//! `refresh_token`); anything else is a fetch failure.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{GrantType, IssuedToken, TokenSecret},
	error::{AuthenticationError, ConfigError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

type ExchangeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_grant: GrantType,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Io(std::io::Error::other(message)).into(),
			_ => TransportError::Io(std::io::Error::other("unrecognized HTTP client failure")).into(),
		}
	}
}

/// Grant to perform, carrying the refresh secret when refreshing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrantRequest {
	/// `grant_type=client_credentials`.
	ClientCredentials,
	/// `grant_type=refresh_token` with the held refresh token.
	RefreshToken(TokenSecret),
}
impl GrantRequest {
	/// Returns the grant label.
	pub fn grant(&self) -> GrantType {
		match self {
			Self::ClientCredentials => GrantType::ClientCredentials,
			Self::RefreshToken(_) => GrantType::RefreshToken,
		}
	}
}

/// Client for the token endpoint bound to one transport + mapper pair.
pub struct TokenEndpoint<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	url: Url,
	timeout: Duration,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenEndpoint<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an endpoint client; `timeout` bounds every exchange.
	pub fn new(
		url: Url,
		timeout: Duration,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Self {
		Self { url, timeout, http_client: http_client.into(), error_mapper: error_mapper.into() }
	}

	/// Returns the endpoint URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Performs one token exchange.
	pub fn exchange<'a>(
		&'a self,
		client_id: &'a str,
		client_secret: &'a str,
		request: &'a GrantRequest,
	) -> ExchangeFuture<'a, IssuedToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let grant = request.grant();
			let http_request = self.build_request(client_id, client_secret, request)?;
			let handle = self.http_client.with_metadata(meta.clone());
			let response =
				match tokio::time::timeout(self.timeout.unsigned_abs(), handle.call(http_request))
					.await
				{
					Ok(Ok(response)) => response,
					Ok(Err(err)) => {
						let meta = meta.take();

						return Err(self.error_mapper.map_transport_error(grant, meta.as_ref(), err));
					},
					Err(_) => return Err(TransportError::Timeout { after: self.timeout }.into()),
				};
			let retry_after = meta.take().and_then(|meta| meta.retry_after);

			map_token_response(grant, response, retry_after)
		})
	}

	fn build_request(
		&self,
		client_id: &str,
		client_secret: &str,
		request: &GrantRequest,
	) -> Result<HttpRequest> {
		let mut form = Serializer::new(String::new());

		form.append_pair("grant_type", request.grant().as_str())
			.append_pair("client_id", client_id)
			.append_pair("client_secret", client_secret);

		if let GrantRequest::RefreshToken(secret) = request {
			form.append_pair("refresh_token", secret.expose());
		}

		Request::builder()
			.method(Method::POST)
			.uri(self.url.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(form.finish().into_bytes())
			.map_err(|err| ConfigError::from(err).into())
	}
}
impl<C, M> Debug for TokenEndpoint<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpoint")
			.field("url", &self.url.as_str())
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenEndpointResponse {
	access_token: Option<String>,
	expires_in: Option<i64>,
	refresh_token: Option<String>,
}

#[derive(Default, Deserialize)]
struct ErrorBody {
	error: Option<String>,
	error_description: Option<String>,
	message: Option<String>,
}

fn map_token_response(
	grant: GrantType,
	response: HttpResponse,
	retry_after: Option<Duration>,
) -> Result<IssuedToken> {
	let status = response.status();
	let code = status.as_u16();

	if !status.is_success() {
		return Err(map_error_status(grant, code, response.body(), retry_after).into());
	}

	let deserializer = &mut serde_json::Deserializer::from_slice(response.body());
	let body: TokenEndpointResponse = serde_path_to_error::deserialize(deserializer)
		.map_err(|source| AuthenticationError::ResponseParse { source, status: Some(code) })?;
	let malformed = |reason: &str| AuthenticationError::MalformedResponse {
		status: Some(code),
		reason: reason.into(),
	};
	let access_token = body
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or_else(|| malformed("access_token is missing"))?;
	let expires_in = body.expires_in.ok_or_else(|| malformed("expires_in is missing"))?;

	if expires_in <= 0 {
		return Err(malformed("expires_in must be positive").into());
	}

	Ok(IssuedToken {
		access_token: TokenSecret::new(access_token),
		refresh_token: body.refresh_token.filter(|token| !token.is_empty()).map(TokenSecret::new),
		expires_in: Duration::seconds(expires_in),
	})
}

fn map_error_status(
	grant: GrantType,
	status: u16,
	body: &[u8],
	retry_after: Option<Duration>,
) -> AuthenticationError {
	let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
	let reason = parsed
		.error_description
		.or(parsed.message)
		.or(parsed.error)
		.unwrap_or_else(|| body_preview(body));

	match status {
		408 | 429 | 500..=599 => AuthenticationError::Upstream { status, message: reason, retry_after },
		_ => AuthenticationError::Rejected { grant, status, reason },
	}
}

fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return "no details provided".into();
	}

	let mut preview = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
		preview.push('…');
	}

	preview
}

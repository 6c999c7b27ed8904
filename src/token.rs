//! Bearer token lifecycle: acquisition, validity checks, proactive refresh, failure recovery.
//!
//! [`TokenManager::authenticate`] is an idempotent gate: it returns immediately while the held
//! token is unexpired and otherwise performs a foreground fetch (`refresh_token` grant when a
//! refresh token is held, `client_credentials` otherwise). Any foreground failure clears the
//! credential before surfacing the error.
//!
//! [`TokenManager::access_token`] is synchronous. When the held token is within the refresh
//! threshold of its expiry it spawns a background refresh and still returns the current token.
//! Background refreshes are deduplicated: while one is in flight further triggers are ignored.
//! Their failures are logged and absorbed, leaving the current token in place.
//!
//! Foreground and background fetches share one single-flight guard and re-check the credential
//! after acquiring it, so concurrent callers never stampede the token endpoint.

mod metrics;

pub use metrics::FetchMetrics;

// crates.io
use tokio::{runtime::Handle, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret, TokenState},
	clock::{Clock, SystemClock},
	config::TokenManagerConfig,
	http::TokenHttpClient,
	oauth::{GrantRequest, TokenEndpoint, TransportErrorMapper},
	obs::{self, FlowOutcome, FlowSpan, TokenFlow},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Token manager specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestTokenManager = TokenManager<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Owner of the single bearer credential used for outbound API calls.
///
/// Cloning is cheap and yields a handle to the same credential.
pub struct TokenManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	inner: Arc<Inner<C, M>>,
}
impl<C, M> TokenManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a manager that uses the caller-provided transport + mapper pair and the wall clock.
	pub fn with_http_client(
		config: TokenManagerConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self::with_clock(config, http_client, mapper, Arc::new(SystemClock))
	}

	/// Creates a manager driven by an explicit [`Clock`].
	///
	/// A pre-seeded token's expiry is measured from the clock's current instant; a lifetime that
	/// overflows the representable range is treated as never expiring.
	pub fn with_clock(
		config: TokenManagerConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
		clock: Arc<dyn Clock>,
	) -> Self {
		let now = clock.now();
		let credential = Credential::seeded(
			config.access_token.as_deref().map(TokenSecret::new),
			config.refresh_token.as_deref().map(TokenSecret::new),
			config.access_token_expires_in.and_then(|lifetime| now.checked_add(lifetime)),
		);
		let endpoint = TokenEndpoint::new(
			config.token_endpoint.clone(),
			config.request_timeout,
			http_client,
			mapper,
		);

		Self {
			inner: Arc::new(Inner {
				config,
				endpoint,
				clock,
				credential: RwLock::new(credential),
				fetch_guard: AsyncMutex::new(()),
				background: Mutex::new(None),
				metrics: FetchMetrics::default(),
			}),
		}
	}

	/// Ensures a usable token is held, fetching one in the foreground when needed.
	///
	/// Returns immediately while the token is present and unexpired. On failure the credential
	/// is cleared and the error is returned: [`Error::Config`] for missing client credentials,
	/// [`Error::Authentication`] for endpoint or transport failures.
	pub async fn authenticate(&self) -> Result<()> {
		if self.inner.credential.read().is_valid_at(self.inner.clock.now()) {
			return Ok(());
		}

		let _singleflight = self.inner.fetch_guard.lock().await;
		let request = {
			let credential = self.inner.credential.read();

			if credential.is_valid_at(self.inner.clock.now()) {
				obs::log_fetch_skipped(TokenFlow::Authenticate, "token renewed by a concurrent fetch");

				return Ok(());
			}

			credential.grant_request()
		};
		let result = self.inner.fetch(TokenFlow::Authenticate, request).await;

		if let Err(err) = &result {
			self.inner.credential.write().clear();
			obs::log_credential_reset(err);
		}

		result
	}

	/// Returns the held access token.
	///
	/// Fails with [`Error::NotAuthenticated`] when no token is held. When the token expires
	/// within the refresh threshold a background refresh is scheduled; this call never waits
	/// for it and never observes its failure.
	pub fn access_token(&self) -> Result<TokenSecret> {
		let now = self.inner.clock.now();
		let (token, needs_refresh) = {
			let credential = self.inner.credential.read();
			let token = credential.access_token.clone().ok_or(Error::NotAuthenticated)?;

			(token, credential.needs_refresh_at(now, self.inner.config.refresh_threshold))
		};

		if needs_refresh {
			self.schedule_background_refresh();
		}

		Ok(token)
	}

	/// Reports the observable lifecycle state.
	pub fn state(&self) -> TokenState {
		if self.background_refresh_pending() || self.inner.fetch_guard.try_lock().is_none() {
			return TokenState::Refreshing;
		}

		self.inner
			.credential
			.read()
			.state_at(self.inner.clock.now(), self.inner.config.refresh_threshold)
	}

	/// Returns `true` while a background refresh task is running.
	pub fn background_refresh_pending(&self) -> bool {
		self.inner.background.lock().as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Waits for the tracked background refresh, if any, to finish.
	pub async fn wait_for_background_refresh(&self) {
		let task = self.inner.background.lock().take();

		if let Some(task) = task {
			// Refresh failures are absorbed inside the task; a join error means it panicked.
			let _ = task.await;
		}
	}

	/// Drops the held credential, forcing a fresh acquisition on the next `authenticate`.
	pub fn clear(&self) {
		self.inner.credential.write().clear();
	}

	/// Returns the fetch counters.
	pub fn fetch_metrics(&self) -> &FetchMetrics {
		&self.inner.metrics
	}

	/// Returns the configuration the manager was built with.
	pub fn config(&self) -> &TokenManagerConfig {
		&self.inner.config
	}

	/// Spawns a background refresh unless one is already in flight.
	fn schedule_background_refresh(&self) -> bool {
		let mut slot = self.inner.background.lock();

		if slot.as_ref().is_some_and(|task| !task.is_finished()) {
			obs::log_fetch_skipped(TokenFlow::BackgroundRefresh, "refresh already in flight");

			return false;
		}

		let Ok(runtime) = Handle::try_current() else {
			obs::log_fetch_skipped(TokenFlow::BackgroundRefresh, "no async runtime available");

			return false;
		};
		let inner = Arc::clone(&self.inner);

		self.inner.metrics.record_background_scheduled();

		*slot = Some(runtime.spawn(async move { inner.background_refresh().await }));

		true
	}
}
#[cfg(feature = "reqwest")]
impl TokenManager<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a manager backed by its own reqwest transport.
	pub fn new(config: TokenManagerConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(config, http_client, Arc::new(ReqwestTransportErrorMapper)))
	}
}
impl<C, M> Clone for TokenManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}
impl<C, M> Debug for TokenManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("endpoint", &self.inner.endpoint)
			.field("credential", &*self.inner.credential.read())
			.field("background_refresh_pending", &self.background_refresh_pending())
			.finish()
	}
}

struct Inner<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: TokenManagerConfig,
	endpoint: TokenEndpoint<C, M>,
	clock: Arc<dyn Clock>,
	credential: RwLock<Credential>,
	fetch_guard: AsyncMutex<()>,
	background: Mutex<Option<JoinHandle<()>>>,
	metrics: FetchMetrics,
}
impl<C, M> Inner<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	async fn background_refresh(&self) {
		let _singleflight = self.fetch_guard.lock().await;
		let request = {
			let credential = self.credential.read();

			if !credential.has_token() {
				obs::log_fetch_skipped(TokenFlow::BackgroundRefresh, "credential was cleared");

				return;
			}
			if !credential.needs_refresh_at(self.clock.now(), self.config.refresh_threshold) {
				obs::log_fetch_skipped(TokenFlow::BackgroundRefresh, "token already renewed");

				return;
			}

			credential.grant_request()
		};

		if let Err(err) = self.fetch(TokenFlow::BackgroundRefresh, request).await {
			obs::log_background_refresh_failure(&err);
		}
	}

	/// Calls the token endpoint and stores the result; callers hold `fetch_guard`.
	async fn fetch(&self, flow: TokenFlow, request: GrantRequest) -> Result<()> {
		let span = FlowSpan::new(flow, request.grant());

		obs::record_fetch_outcome(flow, FlowOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span
			.instrument(async {
				let (client_id, client_secret) = self.config.client_credentials()?;
				let issued = self.endpoint.exchange(client_id, client_secret, &request).await?;
				let now = self.clock.now();

				self.credential.write().apply(issued, now)?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_fetch_outcome(flow, FlowOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_fetch_outcome(flow, FlowOutcome::Failure);
			},
		}

		result
	}
}

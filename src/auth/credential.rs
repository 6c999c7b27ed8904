//! The single bearer credential owned by the token manager, plus its lifecycle helpers.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::AuthenticationError,
	oauth::GrantRequest,
};

/// Observable lifecycle state of the managed credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
	/// No access token is held; callers must authenticate first.
	NoToken,
	/// Token is held and outside the refresh threshold (or never expires).
	Valid,
	/// Token is still usable but expires within the refresh threshold.
	ExpiringSoon,
	/// Token passed its expiry instant; the next `authenticate` fetches a new one.
	Expired,
	/// A token fetch is in flight.
	Refreshing,
}
impl TokenState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenState::NoToken => "no_token",
			TokenState::Valid => "valid",
			TokenState::ExpiringSoon => "expiring_soon",
			TokenState::Expired => "expired",
			TokenState::Refreshing => "refreshing",
		}
	}
}
impl Display for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Freshly issued token material returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
	/// New access token.
	pub access_token: TokenSecret,
	/// Rotated refresh token, when the endpoint supplied one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime reported by the endpoint.
	pub expires_in: Duration,
}
impl Debug for IssuedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuedToken")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Mutable bearer credential record.
///
/// An absent `expires_at` means the token never expires, which matches long-lived tokens
/// supplied through configuration.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
	/// Current access token, if any.
	pub access_token: Option<TokenSecret>,
	/// Refresh token retained across fetches.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant of the access token.
	pub expires_at: Option<OffsetDateTime>,
}
impl Credential {
	/// Builds a pre-seeded credential.
	pub fn seeded(
		access_token: Option<TokenSecret>,
		refresh_token: Option<TokenSecret>,
		expires_at: Option<OffsetDateTime>,
	) -> Self {
		Self { access_token, refresh_token, expires_at }
	}

	/// Returns `true` when an access token is held.
	pub fn has_token(&self) -> bool {
		self.access_token.is_some()
	}

	/// Returns `true` when a token is held and has not reached its expiry instant.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		self.has_token() && self.expires_at.is_none_or(|expires_at| now < expires_at)
	}

	/// Returns `true` when the held token expires within `threshold` of `now`.
	pub fn needs_refresh_at(&self, now: OffsetDateTime, threshold: Duration) -> bool {
		match (&self.access_token, self.expires_at) {
			(Some(_), Some(expires_at)) => expires_at - now <= threshold,
			_ => false,
		}
	}

	/// Computes the lifecycle state at `now` (never [`TokenState::Refreshing`]).
	pub fn state_at(&self, now: OffsetDateTime, threshold: Duration) -> TokenState {
		if !self.has_token() {
			TokenState::NoToken
		} else if !self.is_valid_at(now) {
			TokenState::Expired
		} else if self.needs_refresh_at(now, threshold) {
			TokenState::ExpiringSoon
		} else {
			TokenState::Valid
		}
	}

	/// Request for the next fetch: `refresh_token` when one is held, `client_credentials` otherwise.
	pub fn grant_request(&self) -> GrantRequest {
		match &self.refresh_token {
			Some(refresh) => GrantRequest::RefreshToken(refresh.clone()),
			None => GrantRequest::ClientCredentials,
		}
	}

	/// Stores freshly issued material, keeping the old refresh token if none was returned.
	///
	/// Fails without touching the record when `now + expires_in` is not a representable instant.
	pub fn apply(
		&mut self,
		issued: IssuedToken,
		now: OffsetDateTime,
	) -> Result<(), AuthenticationError> {
		let expires_at = now.checked_add(issued.expires_in).ok_or_else(|| {
			AuthenticationError::MalformedResponse {
				status: None,
				reason: format!("expires_in of {} is out of range", issued.expires_in),
			}
		})?;

		self.access_token = Some(issued.access_token);

		if let Some(refresh) = issued.refresh_token {
			self.refresh_token = Some(refresh);
		}

		self.expires_at = Some(expires_at);

		Ok(())
	}

	/// Drops every field, returning to [`TokenState::NoToken`].
	pub fn clear(&mut self) {
		*self = Self::default();
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

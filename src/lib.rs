//! Token lifecycle management and per-request latency instrumentation for LinkedIn API
//! clients.
//!
//! Two independent components live here:
//!
//! - [`token::TokenManager`] owns a single OAuth 2.0 bearer credential, acquires it through the
//!   `client_credentials`/`refresh_token` grants, and refreshes it proactively in the background
//!   shortly before it expires.
//! - [`perf::MetricsCollector`] buckets outbound calls into categories by endpoint prefix and keeps
//!   a bounded window of response times per category for percentile reporting.
//!
//! A request executor composes them: it authenticates, reads the bearer token, performs the call,
//! and records the elapsed time. Neither component references the other.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod perf;
pub mod token;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

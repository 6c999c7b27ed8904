// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token fetches.
#[derive(Debug, Default)]
pub struct FetchMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	background_scheduled: AtomicU64,
}
impl FetchMetrics {
	/// Returns the number of token endpoint calls attempted (foreground and background).
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of fetches that stored a new token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed fetches.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how many background refresh tasks were spawned.
	pub fn background_refreshes_scheduled(&self) -> u64 {
		self.background_scheduled.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_background_scheduled(&self) {
		self.background_scheduled.fetch_add(1, Ordering::Relaxed);
	}
}

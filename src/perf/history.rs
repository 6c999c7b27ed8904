//! Bounded response-time window and the statistics derived from it.

// self
use crate::_prelude::*;

/// FIFO window of the most recent response times, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseTimeHistory {
	samples: VecDeque<u64>,
	capacity: usize,
}
impl ResponseTimeHistory {
	/// Window size used when none is configured.
	pub const DEFAULT_CAPACITY: usize = 100;

	/// Creates an empty window holding at most `capacity` samples (minimum one).
	pub fn with_capacity(capacity: usize) -> Self {
		let capacity = capacity.max(1);

		Self { samples: VecDeque::with_capacity(capacity), capacity }
	}

	/// Appends a sample, evicting the oldest one when full.
	pub fn push(&mut self, elapsed_ms: u64) {
		if self.samples.len() == self.capacity {
			self.samples.pop_front();
		}

		self.samples.push_back(elapsed_ms);
	}

	/// Number of retained samples.
	pub fn len(&self) -> usize {
		self.samples.len()
	}

	/// Whether the window is empty.
	pub fn is_empty(&self) -> bool {
		self.samples.is_empty()
	}

	/// Maximum number of retained samples.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Iterates samples from oldest to newest.
	pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
		self.samples.iter().copied()
	}

	/// Drops every sample.
	pub fn clear(&mut self) {
		self.samples.clear();
	}

	/// Computes statistics over the retained samples.
	pub fn stats(&self) -> SampleStats {
		SampleStats::from_samples(self.iter())
	}
}
impl Default for ResponseTimeHistory {
	fn default() -> Self {
		Self::with_capacity(Self::DEFAULT_CAPACITY)
	}
}

/// Summary statistics over a sample window; all zero when the window is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleStats {
	/// Arithmetic mean rounded to the nearest millisecond.
	pub average: u64,
	/// 50th percentile.
	pub p50: f64,
	/// 90th percentile.
	pub p90: f64,
	/// 95th percentile.
	pub p95: f64,
	/// 99th percentile.
	pub p99: f64,
	/// Smallest sample.
	pub min: u64,
	/// Largest sample.
	pub max: u64,
}
impl SampleStats {
	/// Sorts the samples and derives the statistics.
	pub fn from_samples<I>(samples: I) -> Self
	where
		I: IntoIterator<Item = u64>,
	{
		let mut sorted = samples.into_iter().collect::<Vec<_>>();

		if sorted.is_empty() {
			return Self::default();
		}

		sorted.sort_unstable();

		let sum = sorted.iter().map(|&v| u128::from(v)).sum::<u128>();

		Self {
			average: (sum as f64 / sorted.len() as f64).round() as u64,
			p50: percentile(&sorted, 50.),
			p90: percentile(&sorted, 90.),
			p95: percentile(&sorted, 95.),
			p99: percentile(&sorted, 99.),
			min: sorted[0],
			max: sorted[sorted.len() - 1],
		}
	}
}

/// Linearly interpolated percentile over an ascending, non-empty slice.
///
/// The rank is `p / 100 * (n - 1)`; the result blends the elements at its floor and ceiling.
pub fn percentile(sorted: &[u64], p: f64) -> f64 {
	match sorted.len() {
		0 => 0.,
		1 => sorted[0] as f64,
		n => {
			let rank = (p.clamp(0., 100.) / 100.) * (n - 1) as f64;
			let lower = rank.floor() as usize;
			let upper = rank.ceil() as usize;
			let weight = rank - lower as f64;

			sorted[lower] as f64 + (sorted[upper] as f64 - sorted[lower] as f64) * weight
		},
	}
}

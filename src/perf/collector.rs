//! Thread-safe per-category request metrics.

// std
use std::time::{Duration as StdDuration, Instant};
// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	obs,
	perf::{CategoryTable, MetricCategory, ResponseTimeHistory, SampleStats},
};

/// Snapshot of one category (or of all categories combined).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricData {
	/// All-time number of recorded requests; never reduced by window eviction.
	pub request_count: u64,
	/// Time of the latest recorded request.
	#[serde(with = "time::serde::rfc3339::option")]
	pub last_request_timestamp: Option<OffsetDateTime>,
	/// Mean of the retained response times, rounded to whole milliseconds.
	pub average_response_time: u64,
	/// 50th percentile of the retained response times.
	pub p50: f64,
	/// 90th percentile.
	pub p90: f64,
	/// 95th percentile.
	pub p95: f64,
	/// 99th percentile.
	pub p99: f64,
	/// Fastest retained response time.
	pub min: u64,
	/// Slowest retained response time.
	pub max: u64,
}
impl MetricData {
	/// Snapshot for a category with no recorded traffic.
	pub fn empty() -> Self {
		Self::default()
	}

	fn from_parts<I>(
		request_count: u64,
		last_request_timestamp: Option<OffsetDateTime>,
		samples: I,
	) -> Self
	where
		I: IntoIterator<Item = u64>,
	{
		let stats = SampleStats::from_samples(samples);

		Self {
			request_count,
			last_request_timestamp,
			average_response_time: stats.average,
			p50: stats.p50,
			p90: stats.p90,
			p95: stats.p95,
			p99: stats.p99,
			min: stats.min,
			max: stats.max,
		}
	}
}

/// Overall aggregate plus one entry per category.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMetrics {
	/// Aggregate across every category; percentiles use the union of all retained samples.
	pub overall: MetricData,
	/// Per-category snapshots keyed by category, always covering every category.
	pub by_category: BTreeMap<MetricCategory, MetricData>,
}

#[derive(Debug)]
struct CategoryState {
	request_count: u64,
	last_request_timestamp: Option<OffsetDateTime>,
	history: ResponseTimeHistory,
}
impl CategoryState {
	fn new(capacity: usize) -> Self {
		Self {
			request_count: 0,
			last_request_timestamp: None,
			history: ResponseTimeHistory::with_capacity(capacity),
		}
	}

	fn snapshot(&self) -> MetricData {
		MetricData::from_parts(self.request_count, self.last_request_timestamp, self.history.iter())
	}
}

/// Records request latencies by category and reports windowed statistics.
///
/// Every operation takes one internal lock, so concurrent recorders never lose an update and
/// readers always see a consistent snapshot.
pub struct MetricsCollector {
	table: CategoryTable,
	capacity: usize,
	clock: Arc<dyn Clock>,
	state: Mutex<HashMap<MetricCategory, CategoryState>>,
}
impl MetricsCollector {
	/// Creates a collector with the LinkedIn category table and a 100-sample window.
	pub fn new() -> Self {
		Self {
			table: CategoryTable::default(),
			capacity: ResponseTimeHistory::DEFAULT_CAPACITY,
			clock: Arc::new(SystemClock),
			state: Default::default(),
		}
	}

	/// Overrides the per-category window size.
	pub fn with_capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity.max(1);

		self
	}

	/// Replaces the category table.
	pub fn with_table(mut self, table: CategoryTable) -> Self {
		self.table = table;

		self
	}

	/// Replaces the clock used for request timestamps.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Returns the category table in use.
	pub fn table(&self) -> &CategoryTable {
		&self.table
	}

	/// Resolves `path` to its category without recording anything.
	pub fn categorize(&self, path: &str) -> MetricCategory {
		self.table.resolve(path)
	}

	/// Records one completed request and returns the category it was filed under.
	pub fn record_request(&self, path: &str, elapsed_ms: u64) -> MetricCategory {
		let category = self.table.resolve(path);
		let now = self.clock.now();

		{
			let mut state = self.state.lock();
			let entry = state.entry(category).or_insert_with(|| CategoryState::new(self.capacity));

			entry.request_count += 1;
			entry.last_request_timestamp = Some(now);
			entry.history.push(elapsed_ms);
		}

		obs::record_request_latency(category.as_str(), elapsed_ms);

		category
	}

	/// Records a request whose duration was measured by the caller.
	pub fn record_duration(&self, path: &str, elapsed: StdDuration) -> MetricCategory {
		self.record_request(path, u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
	}

	/// Awaits `fut`, recording its wall time under `path` whatever it returns.
	pub async fn time<F>(&self, path: &str, fut: F) -> F::Output
	where
		F: Future,
	{
		let started = Instant::now();
		let output = fut.await;

		self.record_duration(path, started.elapsed());

		output
	}

	/// Snapshot for one category; [`MetricData::empty`] when it has no traffic.
	pub fn metrics_for_category(&self, category: MetricCategory) -> MetricData {
		self.state.lock().get(&category).map_or_else(MetricData::empty, CategoryState::snapshot)
	}

	/// Snapshot of every category plus the overall aggregate, taken under one lock.
	pub fn detailed_metrics(&self) -> DetailedMetrics {
		let state = self.state.lock();
		let by_category = MetricCategory::ALL
			.into_iter()
			.map(|category| {
				(category, state.get(&category).map_or_else(MetricData::empty, CategoryState::snapshot))
			})
			.collect();
		let request_count = state.values().map(|entry| entry.request_count).sum();
		let last_request_timestamp =
			state.values().filter_map(|entry| entry.last_request_timestamp).max();
		let overall = MetricData::from_parts(
			request_count,
			last_request_timestamp,
			state.values().flat_map(|entry| entry.history.iter()),
		);

		DetailedMetrics { overall, by_category }
	}

	/// Drops all counters, timestamps, and windows atomically.
	pub fn reset_metrics(&self) {
		self.state.lock().clear();

		obs::log_metrics_reset();
	}
}
impl Default for MetricsCollector {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for MetricsCollector {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MetricsCollector")
			.field("capacity", &self.capacity)
			.field("categories_seen", &self.state.lock().len())
			.finish()
	}
}

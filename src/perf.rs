//! Per-request performance instrumentation.
//!
//! Every outbound call is bucketed into a [`MetricCategory`] by longest-prefix match of its
//! endpoint path against a [`CategoryTable`]. Each category keeps an all-time request counter,
//! the timestamp of its latest request, and a bounded FIFO window of response times from which
//! [`MetricData`] (mean, p50/p90/p95/p99, min, max) is derived on read.

pub mod category;
pub mod collector;
pub mod history;

pub use category::*;
pub use collector::*;
pub use history::*;

//! Statistics for offload dispatch

pub mod metrics;

pub use metrics::{OffloadStats, StatsCollector};

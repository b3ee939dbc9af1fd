//! Statistics for streaming sessions

pub mod metrics;

pub use metrics::SessionStats;

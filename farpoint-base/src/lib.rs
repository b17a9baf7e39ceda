pub mod perf_counters;
pub mod progress;
pub mod types;

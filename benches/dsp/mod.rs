//! Benchmarks for the per-sound signal models.

mod models;

pub use models::bench_models;

//! Real-world scenario benchmarks.
//!
//! These model the audio callback with a full scene of ambient sounds playing.

mod render;

pub use render::bench_render;

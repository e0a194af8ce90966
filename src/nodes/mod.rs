//! Built-in graph nodes.
//!
//! The synth itself is the source; these are the sinks that take its output
//! somewhere:
//! - [`RtrbSink`] - interleave into a ring buffer (offline capture, tests, bridging)
//! - [`CpalSink`] - play on an audio device (requires `cpal_sink` feature)
//!
//! Sinks have `()` as their message type.

pub mod sink;

pub use sink::RtrbSink;

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;

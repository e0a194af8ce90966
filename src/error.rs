//! Error types.

use alloc::string::String;

/// Contract violations on a [`DelayLine`](crate::dsp::DelayLine).
///
/// A correctly sized string model never produces these under paired
/// dequeue/enqueue calls; seeing one means the line was misused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DelayLineError {
    #[error("dequeue from an empty delay line")]
    Empty,

    #[error("enqueue into a full delay line")]
    Full,
}

/// Errors raised by the synthesizer and its control surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    #[error("invalid frequency {0} Hz (must be finite and > 0)")]
    InvalidFrequency(f32),

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("voice pool exhausted ({capacity} voices in use)")]
    PoolExhausted { capacity: usize },

    #[error("command queue full")]
    QueueFull,

    #[error("delay line: {0}")]
    DelayLine(#[from] DelayLineError),
}

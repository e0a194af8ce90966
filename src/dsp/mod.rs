//! Sample-level building blocks.
//!
//! Nothing in here allocates after construction, so everything is safe to
//! drive from the audio thread.

mod additive;
mod delay_line;
mod envelope;
mod pan;
mod string;

pub use additive::{Additive, HARMONICS};
pub use delay_line::DelayLine;
pub use envelope::{Envelope, Phase};
pub use pan::Panner;
pub use string::{max_period, period_for, KarplusString, DEFAULT_DAMPING, MIN_FREQUENCY};

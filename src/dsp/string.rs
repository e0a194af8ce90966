//! Karplus-Strong plucked string.

use alloc::vec::Vec;

use rand::Rng;

use crate::dsp::DelayLine;
use crate::error::{DelayLineError, SynthError};
use crate::node::AudioContext;

/// Loss applied on every recirculation step.
pub const DEFAULT_DAMPING: f32 = 0.996;

/// Lowest pitch a string can be built for, in Hz.
pub const MIN_FREQUENCY: f32 = 20.0;

/// Delay line length for `frequency`: `round(sample_rate / frequency)`, at least 2.
///
/// The achieved pitch is therefore only an approximation of the requested one.
/// A tic reads two cells, so a one-cell line cannot recirculate.
pub fn period_for(ctx: &AudioContext, frequency: f32) -> Result<usize, SynthError> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(SynthError::InvalidFrequency(frequency));
    }
    let period = (ctx.sample_rate as f64 / frequency as f64).round() as usize;
    Ok(period.max(2))
}

/// Longest period any string can need at this sample rate.
pub fn max_period(ctx: &AudioContext) -> usize {
    (ctx.sample_rate as f64 / MIN_FREQUENCY as f64).round() as usize
}

/// One plucked string: a delay line one pitch period long, recirculated
/// through a damped two-tap average.
///
/// The period is fixed for the string's lifetime; build a new string to change pitch.
#[derive(Clone, Debug)]
pub struct KarplusString {
    line: DelayLine,
    damping: f32,
}

impl KarplusString {
    /// A silent string tuned to `frequency`.
    pub fn new(ctx: &AudioContext, frequency: f32) -> Result<Self, SynthError> {
        Self::with_storage(ctx, frequency, Vec::new())
    }

    /// Like [`new`](Self::new), reusing `storage` for the delay line.
    pub fn with_storage(
        ctx: &AudioContext,
        frequency: f32,
        storage: Vec<f32>,
    ) -> Result<Self, SynthError> {
        let period = period_for(ctx, frequency)?;
        let mut line = DelayLine::from_storage(storage, period);
        line.fill_with(|| 0.0);
        Ok(Self {
            line,
            damping: DEFAULT_DAMPING,
        })
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Fill the line with white noise uniformly drawn from [-0.5, 0.5).
    pub fn pluck<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.line.fill_with(|| rng.gen::<f32>() - 0.5);
    }

    /// Advance one sample: `y = damping * (x[n] + x[n+1]) / 2`.
    #[inline]
    pub fn tic(&mut self) -> Result<(), DelayLineError> {
        let first = self.line.dequeue()?;
        let second = self.line.peek()?;
        self.line.enqueue(self.damping * (first + second) * 0.5)
    }

    /// Current output; calling it again gives the same value until the next [`tic`](Self::tic).
    #[inline]
    pub fn sample(&self) -> f32 {
        debug_assert!(!self.line.is_empty(), "string delay line drained");
        self.line.peek().unwrap_or(0.0)
    }

    #[inline]
    pub fn period(&self) -> usize {
        self.line.capacity()
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// RMS of the samples currently circulating.
    pub fn rms(&self) -> f32 {
        let n = self.line.size();
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.line.iter().map(|x| x * x).sum();
        (sum / n as f32).sqrt()
    }

    pub fn into_storage(self) -> Vec<f32> {
        self.line.into_storage()
    }
}

//! Sine bank with a 1/n harmonic series.

use core::f32::consts::TAU;

use crate::node::AudioContext;

/// Number of partials, fundamental included.
pub const HARMONICS: usize = 6;

/// Six sine partials at `f, 2f, .. 6f` with amplitudes `1, 1/2, .. 1/6`.
///
/// Partials at or above Nyquist are muted rather than aliased.
#[derive(Debug, Clone)]
pub struct Additive {
    sample_rate: f32,
    phases: [f32; HARMONICS],
    incs: [f32; HARMONICS],
    gains: [f32; HARMONICS],
}

impl Additive {
    pub fn new(ctx: &AudioContext) -> Self {
        Self {
            sample_rate: ctx.sample_rate as f32,
            phases: [0.0; HARMONICS],
            incs: [0.0; HARMONICS],
            gains: [0.0; HARMONICS],
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        let nyquist = self.sample_rate * 0.5;
        for n in 0..HARMONICS {
            let f = frequency * (n + 1) as f32;
            if f.is_finite() && f > 0.0 && f < nyquist {
                self.incs[n] = f / self.sample_rate;
                self.gains[n] = 1.0 / (n + 1) as f32;
            } else {
                self.incs[n] = 0.0;
                self.gains[n] = 0.0;
            }
        }
    }

    /// Restart every partial at phase 0.
    pub fn reset(&mut self) {
        self.phases = [0.0; HARMONICS];
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut out = 0.0;
        for n in 0..HARMONICS {
            out += (self.phases[n] * TAU).sin() * self.gains[n];
            self.phases[n] += self.incs[n];
            self.phases[n] -= (self.phases[n] >= 1.0) as u32 as f32;
        }
        out
    }
}

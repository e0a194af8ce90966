//! Per-voice parameters and their names at the control boundary.

use core::fmt;
use core::str::FromStr;

use alloc::string::ToString;

use crate::error::SynthError;

/// One of the five voice parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Amplitude,
    Frequency,
    AttackTime,
    ReleaseTime,
    Pan,
}

impl Param {
    pub const ALL: [Param; 5] = [
        Param::Amplitude,
        Param::Frequency,
        Param::AttackTime,
        Param::ReleaseTime,
        Param::Pan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::Amplitude => "amplitude",
            Param::Frequency => "frequency",
            Param::AttackTime => "attackTime",
            Param::ReleaseTime => "releaseTime",
            Param::Pan => "pan",
        }
    }

    /// `(min, max)` accepted for this parameter.
    pub fn range(self) -> (f32, f32) {
        match self {
            Param::Amplitude => (0.0, 1.0),
            Param::Frequency => (20.0, 5000.0),
            Param::AttackTime => (0.01, 3.0),
            Param::ReleaseTime => (0.1, 10.0),
            Param::Pan => (-1.0, 1.0),
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            Param::Amplitude => 0.3,
            Param::Frequency => 60.0,
            Param::AttackTime => 0.1,
            Param::ReleaseTime => 0.1,
            Param::Pan => 0.0,
        }
    }

    /// Clamp into range; NaN falls back to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| SynthError::UnknownParameter(s.to_string()))
    }
}

/// Strongly typed voice settings, always within range.
///
/// The only way to change a field is through [`set`](Self::set) (or the
/// `with_*` builders, which call it), so every value is clamped at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    amplitude: f32,
    frequency: f32,
    attack_time: f32,
    release_time: f32,
    pan: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            amplitude: Param::Amplitude.default_value(),
            frequency: Param::Frequency.default_value(),
            attack_time: Param::AttackTime.default_value(),
            release_time: Param::ReleaseTime.default_value(),
            pan: Param::Pan.default_value(),
        }
    }
}

impl VoiceParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amplitude(mut self, v: f32) -> Self {
        self.set(Param::Amplitude, v);
        self
    }

    pub fn with_frequency(mut self, v: f32) -> Self {
        self.set(Param::Frequency, v);
        self
    }

    pub fn with_attack_time(mut self, v: f32) -> Self {
        self.set(Param::AttackTime, v);
        self
    }

    pub fn with_release_time(mut self, v: f32) -> Self {
        self.set(Param::ReleaseTime, v);
        self
    }

    pub fn with_pan(mut self, v: f32) -> Self {
        self.set(Param::Pan, v);
        self
    }

    /// Store `value` clamped to the parameter's range; returns what was stored.
    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        let v = param.clamp(value);
        match param {
            Param::Amplitude => self.amplitude = v,
            Param::Frequency => self.frequency = v,
            Param::AttackTime => self.attack_time = v,
            Param::ReleaseTime => self.release_time = v,
            Param::Pan => self.pan = v,
        }
        v
    }

    /// `value + delta`, clamped.
    pub fn adjust(&mut self, param: Param, delta: f32) -> f32 {
        self.set(param, self.get(param) + delta)
    }

    pub fn get(&self, param: Param) -> f32 {
        match param {
            Param::Amplitude => self.amplitude,
            Param::Frequency => self.frequency,
            Param::AttackTime => self.attack_time,
            Param::ReleaseTime => self.release_time,
            Param::Pan => self.pan,
        }
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn attack_time(&self) -> f32 {
        self.attack_time
    }

    #[inline]
    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }
}

//! Synth construction settings.

use crate::dsp::DEFAULT_DAMPING;

/// Which sound every voice in the pool makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceKind {
    /// Karplus-Strong plucked strings.
    Plucked,
    /// Six-partial sine bank.
    Additive,
}

impl Default for VoiceKind {
    fn default() -> Self {
        VoiceKind::Plucked
    }
}

/// Settings fixed at [`Synth`](crate::Synth) construction.
///
/// ```
/// use zupfen::{SynthConfig, VoiceKind};
///
/// let config = SynthConfig::default()
///     .with_polyphony(32)
///     .with_max_layers(2)
///     .with_seed(7);
/// assert_eq!(config.voice_kind, VoiceKind::Plucked);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Number of pre-allocated voices.
    pub polyphony: usize,
    /// String layers a plucked voice keeps before evicting the oldest.
    pub max_layers: usize,
    /// Karplus-Strong loss factor.
    pub damping: f32,
    pub voice_kind: VoiceKind,
    /// Fixed seed for the excitation noise; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Make-up gain applied after envelope and amplitude.
    pub output_gain: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            polyphony: 16,
            max_layers: 4,
            damping: DEFAULT_DAMPING,
            voice_kind: VoiceKind::Plucked,
            seed: None,
            output_gain: 1.0,
        }
    }
}

impl SynthConfig {
    pub fn with_polyphony(mut self, voices: usize) -> Self {
        self.polyphony = voices.max(1);
        self
    }

    pub fn with_max_layers(mut self, layers: usize) -> Self {
        self.max_layers = layers.max(1);
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn with_voice_kind(mut self, kind: VoiceKind) -> Self {
        self.voice_kind = kind;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_output_gain(mut self, gain: f32) -> Self {
        self.output_gain = gain.max(0.0);
        self
    }
}

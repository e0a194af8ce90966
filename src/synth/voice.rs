//! A single sounding note.

use alloc::vec::Vec;

use delegate::delegate;
use itertools::izip;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dsp::{max_period, period_for, Additive, Envelope, KarplusString, Panner, Phase};
use crate::error::{DelayLineError, SynthError};
use crate::node::AudioContext;
use crate::synth::config::{SynthConfig, VoiceKind};
use crate::synth::params::{Param, VoiceParams};

/// Host-chosen key for a voice (a MIDI note, a sequence slot, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u32);

/// Named set of voices that can be edited together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GroupId(pub u8);

/// Up to `max` decaying strings sharing one voice.
///
/// Delay line storage for every layer is allocated up front for the lowest
/// pitch, so re-plucking only recycles buffers.
#[derive(Debug, Clone)]
struct StringLayers {
    strings: Vec<KarplusString>,
    spare: Vec<Vec<f32>>,
    max: usize,
    damping: f32,
}

impl StringLayers {
    fn new(ctx: &AudioContext, max: usize, damping: f32) -> Self {
        let max = max.max(1);
        let period = max_period(ctx);
        Self {
            strings: Vec::with_capacity(max),
            spare: (0..max).map(|_| Vec::with_capacity(period)).collect(),
            max,
            damping,
        }
    }

    fn pluck<R: Rng>(&mut self, ctx: &AudioContext, frequency: f32, rng: &mut R) -> Result<(), SynthError> {
        // validate before taking storage so a bad frequency can't leak a buffer
        period_for(ctx, frequency)?;

        if self.strings.len() >= self.max {
            let oldest = self.strings.remove(0);
            self.spare.push(oldest.into_storage());
        }
        let storage = self.spare.pop().unwrap_or_default();
        let mut string = KarplusString::with_storage(ctx, frequency, storage)?.with_damping(self.damping);
        string.pluck(rng);
        self.strings.push(string);
        Ok(())
    }

    /// Sum of every layer's output, then advance each layer one tic.
    #[inline]
    fn next_sample(&mut self) -> Result<f32, DelayLineError> {
        let mut sum = 0.0;
        for string in self.strings.iter() {
            sum += string.sample();
        }
        for string in self.strings.iter_mut() {
            string.tic()?;
        }
        Ok(sum)
    }

    fn clear(&mut self) {
        for string in self.strings.drain(..) {
            self.spare.push(string.into_storage());
        }
    }
}

/// The sound source behind a voice. Matched once per block.
#[derive(Debug, Clone)]
enum Timbre {
    Plucked(StringLayers),
    Additive(Additive),
}

/// One independently triggerable note: a timbre shaped by an envelope and panned to stereo.
#[derive(Debug, Clone)]
pub struct Voice {
    ctx: AudioContext,
    id: VoiceId,
    group: GroupId,
    params: VoiceParams,
    envelope: Envelope,
    panner: Panner,
    timbre: Timbre,
    rng: SmallRng,
    output_gain: f32,
}

impl Voice {
    /// Build an idle voice. `seed` only matters when the config has a fixed seed.
    pub fn new(ctx: &AudioContext, config: &SynthConfig, seed: u64) -> Self {
        let params = VoiceParams::default();
        let timbre = match config.voice_kind {
            VoiceKind::Plucked => Timbre::Plucked(StringLayers::new(ctx, config.max_layers, config.damping)),
            VoiceKind::Additive => Timbre::Additive(Additive::new(ctx)),
        };
        let rng = match config.seed {
            Some(base) => SmallRng::seed_from_u64(base.wrapping_add(seed)),
            None => SmallRng::from_entropy(),
        };

        let mut voice = Self {
            ctx: *ctx,
            id: VoiceId(0),
            group: GroupId::default(),
            params,
            envelope: Envelope::new(ctx, params.attack_time(), params.release_time()),
            panner: Panner::new(params.pan()),
            timbre,
            rng,
            output_gain: config.output_gain,
        };
        voice.init(params);
        voice
    }

    delegate! {
        to self.envelope {
            #[call(done)]
            pub fn is_done(&self) -> bool;
            pub fn phase(&self) -> Phase;
        }
        to self.params {
            pub fn amplitude(&self) -> f32;
            pub fn frequency(&self) -> f32;
            pub fn attack_time(&self) -> f32;
            pub fn release_time(&self) -> f32;
            pub fn pan(&self) -> f32;
        }
    }

    #[inline]
    pub fn id(&self) -> VoiceId {
        self.id
    }

    #[inline]
    pub fn group(&self) -> GroupId {
        self.group
    }

    #[inline]
    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub(crate) fn assign(&mut self, id: VoiceId, group: GroupId) {
        self.id = id;
        self.group = group;
    }

    /// Take a whole parameter set. Values are already clamped by [`VoiceParams`].
    pub fn init(&mut self, params: VoiceParams) {
        for param in Param::ALL.iter() {
            self.set_param(*param, params.get(*param));
        }
    }

    /// Store one parameter (clamped) and push it into the DSP stages.
    ///
    /// A frequency change retunes an additive voice at once; strings already
    /// ringing keep their pitch and the next pluck uses the new one.
    pub fn set_param(&mut self, param: Param, value: f32) -> f32 {
        let v = self.params.set(param, value);
        match param {
            Param::AttackTime => self.envelope.set_attack(v),
            Param::ReleaseTime => self.envelope.set_release(v),
            Param::Pan => self.panner.set_pos(v),
            Param::Frequency => {
                if let Timbre::Additive(osc) = &mut self.timbre {
                    osc.set_frequency(v);
                }
            }
            Param::Amplitude => {}
        }
        v
    }

    pub fn adjust_param(&mut self, param: Param, delta: f32) -> f32 {
        self.set_param(param, self.params.get(param) + delta)
    }

    /// Restart the envelope and excite a new string at the current frequency.
    ///
    /// Earlier strings keep ringing underneath until the layer cap evicts them.
    pub fn trigger_on(&mut self) -> Result<(), SynthError> {
        self.envelope.reset();
        let frequency = self.params.frequency();
        match &mut self.timbre {
            Timbre::Plucked(layers) => layers.pluck(&self.ctx, frequency, &mut self.rng)?,
            Timbre::Additive(osc) => osc.reset(),
        }
        Ok(())
    }

    /// Begin the release. Repeated calls are no-ops.
    pub fn trigger_off(&mut self) {
        self.envelope.release();
    }

    /// Number of strings currently layered in this voice (0 for additive voices).
    pub fn layers(&self) -> usize {
        match &self.timbre {
            Timbre::Plucked(layers) => layers.strings.len(),
            Timbre::Additive(_) => 0,
        }
    }

    /// Add this voice's output for `left.len()` frames into `left`/`right`.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), DelayLineError> {
        let gain = self.params.amplitude() * self.output_gain;
        let gains = self.panner.gains();
        let envelope = &mut self.envelope;

        match &mut self.timbre {
            Timbre::Plucked(layers) => render_with(|| layers.next_sample(), envelope, gain, gains, left, right),
            Timbre::Additive(osc) => render_with(|| Ok(osc.next_sample()), envelope, gain, gains, left, right),
        }
    }

    /// Silence the voice and return its strings' storage for reuse.
    pub(crate) fn recycle(&mut self) {
        self.envelope.stop();
        if let Timbre::Plucked(layers) = &mut self.timbre {
            layers.clear();
        }
    }
}

#[inline]
fn render_with<F>(
    mut source: F,
    envelope: &mut Envelope,
    gain: f32,
    (pan_l, pan_r): (f32, f32),
    left: &mut [f32],
    right: &mut [f32],
) -> Result<(), DelayLineError>
where
    F: FnMut() -> Result<f32, DelayLineError>,
{
    for (l, r) in izip!(left.iter_mut(), right.iter_mut()) {
        let s = source()? * envelope.process() * gain;
        *l += s * pan_l;
        *r += s * pan_r;
    }
    Ok(())
}

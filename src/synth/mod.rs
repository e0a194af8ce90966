//! The polyphonic synthesizer node and its control surface.
//!
//! [`Synth`] lives on the audio thread inside an [`Engine`](crate::Engine)
//! graph. The control thread talks to it only through [`SynthCommand`]s,
//! usually via a [`SynthController`].

mod config;
mod control;
mod params;
mod pool;
mod scheduler;
mod voice;

pub use config::{SynthConfig, VoiceKind};
pub use control::SynthController;
pub use params::{Param, VoiceParams};
pub use pool::VoicePool;
pub use scheduler::{EntryState, ScheduledEvent, Scheduler, Sequence, SequenceEntry, Transition};
pub use voice::{GroupId, Voice, VoiceId};

use dasp_graph::{Buffer, Input};
use tracing::{debug, warn};

use crate::error::SynthError;
use crate::node::{AudioContext, AudioNode};

/// Messages accepted by a [`Synth`], applied at the start of the next block.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthCommand {
    /// Start (or re-pluck) the voice keyed by `id`.
    TriggerOn {
        id: VoiceId,
        group: GroupId,
        params: VoiceParams,
    },
    TriggerOff {
        id: VoiceId,
    },
    SetParameter {
        id: VoiceId,
        param: Param,
        value: f32,
    },
    /// Add `delta` to `param` on every voice in `group`, sounding or still pending.
    AdjustGroup {
        group: GroupId,
        param: Param,
        delta: f32,
    },
    /// Replace the current sequence; time zero is the start of the next block.
    PlaySequence(Sequence),
    StopSequence,
    ReleaseAll,
}

/// Polyphonic Karplus-Strong synthesizer.
///
/// A source node with two outputs (left, right). Every block it drains its
/// commands, fires any scheduled transitions at their exact sample, and mixes
/// all sounding voices.
///
/// ```
/// use zupfen::{AudioContext, GroupId, Synth, SynthConfig, VoiceId, VoiceParams};
///
/// let mut synth = Synth::new(&AudioContext::new(44_100, 512), &SynthConfig::default());
/// synth
///     .trigger_on(VoiceId(60), GroupId(0), VoiceParams::new().with_frequency(261.63))
///     .unwrap();
///
/// let mut left = vec![0.0; 512];
/// let mut right = vec![0.0; 512];
/// synth.render(&mut left, &mut right);
/// assert!(left.iter().any(|s| *s != 0.0));
/// ```
#[derive(Debug)]
pub struct Synth {
    ctx: AudioContext,
    pool: VoicePool,
    scheduler: Option<Scheduler>,
    /// Global sample clock: frames rendered since construction.
    clock: u64,
}

impl Synth {
    pub fn new(ctx: &AudioContext, config: &SynthConfig) -> Self {
        debug!(
            sample_rate = ctx.sample_rate,
            polyphony = config.polyphony,
            kind = ?config.voice_kind,
            "synth created"
        );
        Self {
            ctx: *ctx,
            pool: VoicePool::new(ctx, config),
            scheduler: None,
            clock: 0,
        }
    }

    pub fn handle_command(&mut self, command: SynthCommand) {
        match command {
            SynthCommand::TriggerOn { id, group, params } => {
                if let Err(e) = self.trigger_on(id, group, params) {
                    warn!(voice = id.0, error = %e, "trigger dropped");
                }
            }
            SynthCommand::TriggerOff { id } => {
                self.trigger_off(id);
            }
            SynthCommand::SetParameter { id, param, value } => {
                if !self.set_parameter(id, param, value) {
                    debug!(voice = id.0, %param, "no such voice");
                }
            }
            SynthCommand::AdjustGroup { group, param, delta } => {
                self.adjust_group(group, param, delta);
            }
            SynthCommand::PlaySequence(sequence) => self.play_sequence(sequence),
            SynthCommand::StopSequence => self.stop_sequence(),
            SynthCommand::ReleaseAll => self.release_all(),
        }
    }

    /// Start the voice keyed by `id`.
    ///
    /// If `id` is already sounding its voice is retriggered (envelope restart
    /// plus a new string layer); otherwise a free voice is claimed.
    pub fn trigger_on(&mut self, id: VoiceId, group: GroupId, params: VoiceParams) -> Result<(), SynthError> {
        if let Some(voice) = self.pool.find_mut(id) {
            voice.assign(id, group);
            voice.init(params);
            return voice.trigger_on();
        }

        let voice = self.pool.allocate(id, group)?;
        voice.init(params);
        if let Err(e) = voice.trigger_on() {
            self.pool.free(id);
            return Err(e);
        }
        Ok(())
    }

    /// Release the voice keyed by `id`. Returns false if nothing was sounding.
    pub fn trigger_off(&mut self, id: VoiceId) -> bool {
        match self.pool.find_mut(id) {
            Some(voice) => {
                voice.trigger_off();
                true
            }
            None => false,
        }
    }

    pub fn set_parameter(&mut self, id: VoiceId, param: Param, value: f32) -> bool {
        match self.pool.find_mut(id) {
            Some(voice) => {
                voice.set_param(param, value);
                true
            }
            None => false,
        }
    }

    pub fn get_parameter(&self, id: VoiceId, param: Param) -> Option<f32> {
        self.pool.find(id).map(|v| v.params().get(param))
    }

    /// Returns the number of voices and pending sequence entries touched.
    pub fn adjust_group(&mut self, group: GroupId, param: Param, delta: f32) -> usize {
        let sounding = self.pool.for_each_in_group(group, |v| {
            v.adjust_param(param, delta);
        });
        let pending = self
            .scheduler
            .as_mut()
            .map_or(0, |s| s.adjust_pending(group, param, delta));
        sounding + pending
    }

    /// Start `sequence` at the current clock, stopping any sequence in progress.
    pub fn play_sequence(&mut self, sequence: Sequence) {
        self.stop_sequence();
        debug!(entries = sequence.len(), origin = self.clock, "sequence started");
        self.scheduler = Some(Scheduler::new(&self.ctx, sequence, self.clock));
    }

    /// Drop the current sequence and release the notes it left sounding.
    pub fn stop_sequence(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            for id in scheduler.sounding() {
                self.trigger_off(id);
            }
        }
    }

    pub fn release_all(&mut self) {
        self.pool.for_each_active(|v| v.trigger_off());
    }

    /// Add the next `min(left.len(), right.len())` frames into `left`/`right`.
    ///
    /// Scheduled transitions land on their exact sample: the block is split at
    /// every event offset.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let end = self.clock + frames as u64;
        let mut rendered = 0;

        while let Some(event) = self.scheduler.as_mut().and_then(|s| s.next_event(end)) {
            let offset = (event.sample.saturating_sub(self.clock) as usize).min(frames);
            if offset > rendered {
                self.pool.render(&mut left[rendered..offset], &mut right[rendered..offset]);
                rendered = offset;
            }
            self.fire(event);
        }
        if rendered < frames {
            self.pool.render(&mut left[rendered..frames], &mut right[rendered..frames]);
        }

        self.clock = end;
        self.pool.free_finished();
    }

    fn fire(&mut self, event: ScheduledEvent) {
        match event.transition {
            Transition::TriggerOn => {
                if let Err(e) = self.trigger_on(event.id, event.group, event.params) {
                    warn!(voice = event.id.0, sample = event.sample, error = %e, "scheduled trigger dropped");
                }
            }
            Transition::TriggerOff => {
                self.trigger_off(event.id);
            }
        }
    }

    #[inline]
    pub fn clock(&self) -> u64 {
        self.clock
    }

    #[inline]
    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    #[inline]
    pub fn active_voices(&self) -> usize {
        self.pool.active_count()
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }
}

impl AudioNode for Synth {
    type Message = SynthCommand;

    fn process(
        &mut self,
        _ctx: &AudioContext,
        messages: impl Iterator<Item = SynthCommand>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            self.handle_command(msg);
        }

        for buffer in outputs.iter_mut() {
            buffer.iter_mut().for_each(|s| *s = 0.0);
        }
        if let [left, right, ..] = outputs {
            self.render(left, right);
        }
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        2
    }
}

//! Control-thread side of the synth.

use hashbrown::HashMap;

use crate::engine::Handle;
use crate::error::SynthError;
use crate::synth::params::{Param, VoiceParams};
use crate::synth::scheduler::Sequence;
use crate::synth::voice::{GroupId, VoiceId};
use crate::synth::SynthCommand;

/// Typed front end to a [`Synth`](crate::Synth) running in an engine.
///
/// Values are clamped here before they are queued, and the last value sent
/// for every voice is kept locally, so reads never touch the audio thread.
/// A command that does not fit in the queue is rejected with
/// [`SynthError::QueueFull`] and leaves the local copy unchanged.
pub struct SynthController {
    handle: Handle<SynthCommand>,
    voices: HashMap<VoiceId, (GroupId, VoiceParams)>,
}

impl SynthController {
    pub fn new(handle: Handle<SynthCommand>) -> Self {
        Self {
            handle,
            voices: HashMap::new(),
        }
    }

    fn send(&mut self, command: SynthCommand) -> Result<(), SynthError> {
        self.handle.send(command).map_err(|_| SynthError::QueueFull)
    }

    pub fn trigger_on(&mut self, id: VoiceId, group: GroupId, params: VoiceParams) -> Result<(), SynthError> {
        self.send(SynthCommand::TriggerOn { id, group, params })?;
        self.voices.insert(id, (group, params));
        Ok(())
    }

    pub fn trigger_off(&mut self, id: VoiceId) -> Result<(), SynthError> {
        self.send(SynthCommand::TriggerOff { id })
    }

    /// Returns the clamped value that was sent.
    pub fn set_parameter(&mut self, id: VoiceId, param: Param, value: f32) -> Result<f32, SynthError> {
        let value = param.clamp(value);
        self.send(SynthCommand::SetParameter { id, param, value })?;
        if let Some((_, params)) = self.voices.get_mut(&id) {
            params.set(param, value);
        }
        Ok(value)
    }

    /// Like [`set_parameter`](Self::set_parameter), addressing the parameter
    /// by its control name (`"amplitude"`, `"attackTime"`, ...).
    pub fn set_parameter_by_name(&mut self, id: VoiceId, name: &str, value: f32) -> Result<f32, SynthError> {
        let param: Param = name.parse()?;
        self.set_parameter(id, param, value)
    }

    /// Last value sent for `param` on `id`, or `None` for a voice never triggered.
    pub fn get_parameter(&self, id: VoiceId, param: Param) -> Option<f32> {
        self.voices.get(&id).map(|(_, params)| params.get(param))
    }

    pub fn get_parameter_by_name(&self, id: VoiceId, name: &str) -> Result<Option<f32>, SynthError> {
        let param: Param = name.parse()?;
        Ok(self.get_parameter(id, param))
    }

    pub fn adjust_group(&mut self, group: GroupId, param: Param, delta: f32) -> Result<(), SynthError> {
        self.send(SynthCommand::AdjustGroup { group, param, delta })?;
        for (g, params) in self.voices.values_mut() {
            if *g == group {
                params.adjust(param, delta);
            }
        }
        Ok(())
    }

    /// Queue `sequence`. Each entry's parameters become readable through
    /// [`get_parameter`](Self::get_parameter) at once.
    pub fn play_sequence(&mut self, sequence: Sequence) -> Result<(), SynthError> {
        let entries: Vec<(VoiceId, GroupId, VoiceParams)> =
            sequence.entries().iter().map(|e| (e.id, e.group, e.params)).collect();
        self.send(SynthCommand::PlaySequence(sequence))?;
        for (id, group, params) in entries {
            self.voices.insert(id, (group, params));
        }
        Ok(())
    }

    pub fn stop_sequence(&mut self) -> Result<(), SynthError> {
        self.send(SynthCommand::StopSequence)
    }

    pub fn release_all(&mut self) -> Result<(), SynthError> {
        self.send(SynthCommand::ReleaseAll)
    }

    pub fn handle(&self) -> &Handle<SynthCommand> {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::synth::{Synth, SynthConfig};

    fn controller(queue: usize) -> (Engine, SynthController) {
        let mut engine = Engine::new(44_100);
        let ctx = *engine.context();
        let synth = Synth::new(&ctx, &SynthConfig::default().with_seed(1));
        let handle = engine.add_with_queue_size(synth, queue);
        (engine, SynthController::new(handle))
    }

    #[test]
    fn mirrors_clamped_values() {
        let (_engine, mut ctl) = controller(16);
        ctl.trigger_on(VoiceId(1), GroupId(0), VoiceParams::new()).unwrap();

        assert_eq!(ctl.set_parameter(VoiceId(1), Param::Pan, -4.0).unwrap(), -1.0);
        assert_eq!(ctl.get_parameter(VoiceId(1), Param::Pan), Some(-1.0));
        assert_eq!(ctl.set_parameter_by_name(VoiceId(1), "frequency", 1.0).unwrap(), 20.0);
        assert_eq!(ctl.get_parameter_by_name(VoiceId(1), "frequency").unwrap(), Some(20.0));
        assert_eq!(ctl.get_parameter(VoiceId(2), Param::Pan), None);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let (_engine, mut ctl) = controller(16);
        assert_eq!(
            ctl.set_parameter_by_name(VoiceId(1), "cutoff", 0.5),
            Err(SynthError::UnknownParameter("cutoff".into()))
        );
        assert!(ctl.get_parameter_by_name(VoiceId(1), "Amplitude").is_err());
        // nothing was queued
        assert_eq!(ctl.handle().slots(), 16);
    }

    #[test]
    fn full_queue_leaves_the_mirror_alone() {
        let (_engine, mut ctl) = controller(2);
        ctl.trigger_on(VoiceId(1), GroupId(0), VoiceParams::new()).unwrap();
        ctl.set_parameter(VoiceId(1), Param::Amplitude, 0.7).unwrap();

        assert_eq!(
            ctl.set_parameter(VoiceId(1), Param::Amplitude, 0.1),
            Err(SynthError::QueueFull)
        );
        assert_eq!(ctl.get_parameter(VoiceId(1), Param::Amplitude), Some(0.7));
        assert_eq!(
            ctl.trigger_on(VoiceId(2), GroupId(0), VoiceParams::new()),
            Err(SynthError::QueueFull)
        );
        assert_eq!(ctl.get_parameter(VoiceId(2), Param::Amplitude), None);
    }

    #[test]
    fn group_adjust_updates_the_mirror() {
        let (_engine, mut ctl) = controller(16);
        let p = VoiceParams::new().with_amplitude(0.5);
        ctl.trigger_on(VoiceId(1), GroupId(1), p).unwrap();
        ctl.trigger_on(VoiceId(2), GroupId(2), p).unwrap();
        ctl.adjust_group(GroupId(1), Param::Amplitude, 0.6).unwrap();

        assert_eq!(ctl.get_parameter(VoiceId(1), Param::Amplitude), Some(1.0));
        assert_eq!(ctl.get_parameter(VoiceId(2), Param::Amplitude), Some(0.5));
    }

    #[test]
    fn sequence_entries_are_readable() {
        let (_engine, mut ctl) = controller(16);
        let mut seq = Sequence::new();
        seq.add(VoiceId(5), GroupId(0), VoiceParams::new().with_frequency(392.0), 1.0, 1.0);
        ctl.play_sequence(seq).unwrap();
        assert_eq!(ctl.get_parameter(VoiceId(5), Param::Frequency), Some(392.0));
    }
}

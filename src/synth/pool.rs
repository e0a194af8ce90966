//! Fixed-size voice pool.

use alloc::vec::Vec;

use tracing::error;

use crate::error::SynthError;
use crate::node::AudioContext;
use crate::synth::config::SynthConfig;
use crate::synth::voice::{GroupId, Voice, VoiceId};

/// All voices are built up front; allocation on the audio thread only moves
/// slot indices between the free list and the active list.
#[derive(Debug, Clone)]
pub struct VoicePool {
    voices: Vec<Voice>,
    /// Slots ready for reuse, popped from the back.
    free: Vec<usize>,
    /// Sounding slots in allocation order.
    active: Vec<usize>,
}

impl VoicePool {
    pub fn new(ctx: &AudioContext, config: &SynthConfig) -> Self {
        let size = config.polyphony.max(1);
        Self {
            voices: (0..size).map(|i| Voice::new(ctx, config, i as u64)).collect(),
            free: (0..size).rev().collect(),
            active: Vec::with_capacity(size),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Claim a free voice for `id`, or fail with [`SynthError::PoolExhausted`].
    pub fn allocate(&mut self, id: VoiceId, group: GroupId) -> Result<&mut Voice, SynthError> {
        let slot = self.free.pop().ok_or(SynthError::PoolExhausted {
            capacity: self.voices.len(),
        })?;
        self.active.push(slot);
        let voice = &mut self.voices[slot];
        voice.assign(id, group);
        Ok(voice)
    }

    /// Return the voice playing `id` to the pool. Returns false if none was.
    pub fn free(&mut self, id: VoiceId) -> bool {
        let voices = &mut self.voices;
        match self.active.iter().position(|&slot| voices[slot].id() == id) {
            Some(pos) => {
                let slot = self.active.remove(pos);
                voices[slot].recycle();
                self.free.push(slot);
                true
            }
            None => false,
        }
    }

    pub fn find(&self, id: VoiceId) -> Option<&Voice> {
        self.active
            .iter()
            .map(|&slot| &self.voices[slot])
            .find(|v| v.id() == id)
    }

    pub fn find_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        let voices = &mut self.voices;
        let slot = self.active.iter().copied().find(|&slot| voices[slot].id() == id)?;
        Some(&mut voices[slot])
    }

    /// Sounding voices, oldest allocation first.
    pub fn active(&self) -> impl Iterator<Item = &Voice> + '_ {
        self.active.iter().map(move |&slot| &self.voices[slot])
    }

    pub fn for_each_active(&mut self, mut f: impl FnMut(&mut Voice)) {
        for &slot in self.active.iter() {
            f(&mut self.voices[slot]);
        }
    }

    /// Apply `f` to every sounding voice in `group`; returns how many were touched.
    pub fn for_each_in_group(&mut self, group: GroupId, mut f: impl FnMut(&mut Voice)) -> usize {
        let mut touched = 0;
        for &slot in self.active.iter() {
            let voice = &mut self.voices[slot];
            if voice.group() == group {
                f(voice);
                touched += 1;
            }
        }
        touched
    }

    /// Mix every sounding voice into `left`/`right`.
    ///
    /// A voice whose strings break their delay line contract is silenced; the
    /// rest of the block still renders.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for &slot in self.active.iter() {
            let voice = &mut self.voices[slot];
            if let Err(e) = voice.render(left, right) {
                error!(voice = voice.id().0, error = %e, "voice failed, silencing");
                voice.recycle();
            }
        }
    }

    /// Move every voice whose envelope has finished back to the free list.
    pub fn free_finished(&mut self) -> usize {
        let voices = &mut self.voices;
        let free = &mut self.free;
        let before = self.active.len();
        self.active.retain(|&slot| {
            if voices[slot].is_done() {
                voices[slot].recycle();
                free.push(slot);
                false
            } else {
                true
            }
        });
        before - self.active.len()
    }
}

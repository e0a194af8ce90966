//! Sample-accurate note sequencing.

use alloc::vec::Vec;

use crate::node::AudioContext;
use crate::synth::params::{Param, VoiceParams};
use crate::synth::voice::{GroupId, VoiceId};

/// One note of a [`Sequence`]: when it starts and how long it is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceEntry {
    pub id: VoiceId,
    pub group: GroupId,
    pub params: VoiceParams,
    /// Seconds after the sequence starts playing.
    pub start: f64,
    /// Seconds between trigger-on and trigger-off.
    pub duration: f64,
}

/// An ordered list of notes, built on the control thread and handed to the
/// synth whole.
///
/// ```
/// use zupfen::{GroupId, Sequence, VoiceId, VoiceParams};
///
/// let mut seq = Sequence::new();
/// let c = VoiceParams::new().with_frequency(261.63);
/// seq.add(VoiceId(0), GroupId(0), c, 0.0, 2.0)
///    .add(VoiceId(1), GroupId(0), c.with_frequency(293.66), 2.0, 2.0);
/// assert_eq!(seq.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    entries: Vec<SequenceEntry>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note starting `start` seconds after playback begins.
    ///
    /// Negative or non-finite times are treated as 0.
    pub fn add(
        &mut self,
        id: VoiceId,
        group: GroupId,
        params: VoiceParams,
        start: f64,
        duration: f64,
    ) -> &mut Self {
        let sane = |t: f64| if t.is_finite() { t.max(0.0) } else { 0.0 };
        self.entries.push(SequenceEntry {
            id,
            group,
            params,
            start: sane(start),
            duration: sane(duration),
        });
        self
    }

    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lifecycle of one scheduled note. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Sounding,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    TriggerOn,
    TriggerOff,
}

/// A transition due at an absolute sample position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub sample: u64,
    pub transition: Transition,
    pub id: VoiceId,
    pub group: GroupId,
    pub params: VoiceParams,
}

#[derive(Debug, Clone)]
struct Slot {
    entry: SequenceEntry,
    start: u64,
    stop: u64,
    state: EntryState,
}

/// Plays a [`Sequence`] against the global sample clock.
///
/// Entries fire in start order, ties in insertion order. At equal sample
/// positions a note that is already sounding is stopped before another
/// starts, while a zero-length note still starts before it stops.
#[derive(Debug, Clone)]
pub struct Scheduler {
    slots: Vec<Slot>,
    /// Slot indices ordered by stop sample.
    stop_order: Vec<usize>,
    next_start: usize,
    next_stop: usize,
}

impl Scheduler {
    /// Schedule `sequence` with its time zero at sample `origin`.
    pub fn new(ctx: &AudioContext, sequence: Sequence, origin: u64) -> Self {
        let mut slots: Vec<Slot> = sequence
            .entries
            .into_iter()
            .map(|entry| Slot {
                // far-future times pin to u64::MAX and never fire
                start: origin.saturating_add(ctx.seconds_to_samples(entry.start)),
                stop: origin.saturating_add(ctx.seconds_to_samples(entry.start + entry.duration)),
                entry,
                state: EntryState::Pending,
            })
            .collect();
        // stable sorts keep insertion order for ties
        slots.sort_by_key(|s| s.start);
        let mut stop_order: Vec<usize> = (0..slots.len()).collect();
        stop_order.sort_by_key(|&i| slots[i].stop);

        Self {
            slots,
            stop_order,
            next_start: 0,
            next_stop: 0,
        }
    }

    /// Take the next transition due strictly before sample `before`, if any.
    ///
    /// Call repeatedly until it returns `None` to drain a block.
    pub fn next_event(&mut self, before: u64) -> Option<ScheduledEvent> {
        let start = self
            .slots
            .get(self.next_start)
            .map(|s| s.start)
            .filter(|&t| t < before);
        let stop = self
            .stop_order
            .get(self.next_stop)
            .map(|&i| (i, self.slots[i].stop))
            .filter(|&(_, t)| t < before);

        let stop_first = match (start, stop) {
            (None, None) => return None,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(s), Some((i, t))) => t < s || (t == s && self.slots[i].state == EntryState::Sounding),
        };

        if stop_first {
            let i = self.stop_order[self.next_stop];
            self.next_stop += 1;
            let slot = &mut self.slots[i];
            slot.state = EntryState::Finished;
            Some(Self::event(slot, slot.stop, Transition::TriggerOff))
        } else {
            let slot = &mut self.slots[self.next_start];
            self.next_start += 1;
            slot.state = EntryState::Sounding;
            Some(Self::event(slot, slot.start, Transition::TriggerOn))
        }
    }

    fn event(slot: &Slot, sample: u64, transition: Transition) -> ScheduledEvent {
        ScheduledEvent {
            sample,
            transition,
            id: slot.entry.id,
            group: slot.entry.group,
            params: slot.entry.params,
        }
    }

    /// Apply `value + delta` to every not-yet-started entry in `group`.
    pub fn adjust_pending(&mut self, group: GroupId, param: Param, delta: f32) -> usize {
        let mut touched = 0;
        for slot in self.slots.iter_mut() {
            if slot.state == EntryState::Pending && slot.entry.group == group {
                slot.entry.params.adjust(param, delta);
                touched += 1;
            }
        }
        touched
    }

    /// Ids of entries currently between their start and stop.
    pub fn sounding(&self) -> impl Iterator<Item = VoiceId> + '_ {
        self.slots
            .iter()
            .filter(|s| s.state == EntryState::Sounding)
            .map(|s| s.entry.id)
    }

    /// States in start order.
    pub fn states(&self) -> impl Iterator<Item = EntryState> + '_ {
        self.slots.iter().map(|s| s.state)
    }

    pub fn is_finished(&self) -> bool {
        self.next_stop == self.slots.len()
    }
}

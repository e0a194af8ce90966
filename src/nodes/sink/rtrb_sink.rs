//! Ring buffer sink

use dasp_graph::{Buffer, Input};
use rtrb::Producer;

use crate::node::{AudioContext, AudioNode};

use super::interleave_sum;

/// A sink that pushes the sum of its inputs into an rtrb ring buffer as
/// interleaved samples.
///
/// Useful for offline rendering, tests, and handing audio to another thread.
/// A block that doesn't fit whole is dropped and counted.
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
    dropped_blocks: u64,
}

impl RtrbSink {
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            dropped_blocks: 0,
        }
    }

    pub fn stereo(producer: Producer<f32>) -> Self {
        Self::new(producer, 2)
    }

    /// Free sample slots in the ring.
    #[inline]
    pub fn available(&self) -> usize {
        self.producer.slots()
    }

    #[inline]
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks
    }
}

impl AudioNode for RtrbSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &AudioContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let frames = Buffer::LEN;
        if self.producer.slots() < frames * self.channels {
            self.dropped_blocks += 1;
            return;
        }

        let producer = &mut self.producer;
        interleave_sum(inputs, frames, self.channels, |s| {
            // room was checked above
            let _ = producer.push(s);
        });
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        self.channels
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        0
    }
}

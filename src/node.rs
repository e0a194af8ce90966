//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Fixed audio settings shared by every component of a graph.
///
/// There is no ambient sample rate anywhere in the crate: each DSP component
/// receives an `AudioContext` when it is built, and every [`AudioNode::process`]
/// call gets the graph's context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of frames per block (64 inside an [`AudioGraph`](crate::graph::AudioGraph))
    pub block_size: usize,
}

impl AudioContext {
    pub fn new(sample_rate: u32, block_size: usize) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            block_size: block_size.max(1),
        }
    }

    /// Convert a duration in seconds to a whole number of samples (rounded).
    ///
    /// Negative and non-finite durations map to 0.
    #[inline]
    pub fn seconds_to_samples(&self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * self.sample_rate as f64).round() as u64
    }

    /// Wall-clock length of one block in seconds; the render deadline.
    #[inline]
    pub fn block_duration(&self) -> f64 {
        self.block_size as f64 / self.sample_rate as f64
    }
}

impl Default for AudioContext {
    /// 44.1 kHz with 512-frame host blocks.
    fn default() -> Self {
        Self::new(44_100, 512)
    }
}

/// Unique identifier for a node within a graph.
///
/// You typically don't interact with this directly - use [`Handle`](crate::Handle) instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: Generate audio (0 inputs, 1+ outputs) - the [`Synth`](crate::Synth)
/// - **Sinks**: Consume audio (1+ inputs, 0 outputs) - device outputs, ring buffers
///
/// # Message-Based Parameters
///
/// Instead of shared mutable state, nodes receive parameter updates via messages
/// sent from another thread through a lock-free queue. Handle them at the start
/// of `process()`:
///
/// ```
/// use zupfen::{AudioNode, AudioContext};
/// use dasp_graph::{Buffer, Input};
///
/// enum DcMessage {
///     SetLevel(f32),
/// }
///
/// struct Dc {
///     level: f32,
/// }
///
/// impl AudioNode for Dc {
///     type Message = DcMessage;
///
///     fn process(
///         &mut self,
///         _ctx: &AudioContext,
///         messages: impl Iterator<Item = DcMessage>,
///         _inputs: &[Input],
///         outputs: &mut [Buffer],
///     ) {
///         for msg in messages {
///             match msg {
///                 DcMessage::SetLevel(l) => self.level = l,
///             }
///         }
///
///         for sample in outputs[0].iter_mut() {
///             *sample = self.level;
///         }
///     }
/// }
/// ```
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates.
    ///
    /// Use a custom enum for nodes with parameters, or `()` for nodes without.
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// Called once per audio block. Implementations must:
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write to `outputs`
    ///
    /// Nothing in here may allocate, block, or do I/O.
    fn process(
        &mut self,
        ctx: &AudioContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize { 0 }

    /// Number of audio output channels.
    fn num_outputs(&self) -> usize { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_round_to_samples() {
        let ctx = AudioContext::new(44_100, 512);
        assert_eq!(ctx.seconds_to_samples(2.0), 88_200);
        assert_eq!(ctx.seconds_to_samples(3.0), 132_300);
        assert_eq!(ctx.seconds_to_samples(-1.0), 0);
        assert_eq!(ctx.seconds_to_samples(f64::NAN), 0);
    }

    #[test]
    fn block_duration_is_the_deadline() {
        let ctx = AudioContext::new(44_100, 441);
        assert!((ctx.block_duration() - 0.01).abs() < 1e-12);
    }
}

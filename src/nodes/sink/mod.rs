//! Output sinks.

#[cfg(feature = "cpal_sink")]
mod cpal_sink;
mod rtrb_sink;

#[cfg(feature = "cpal_sink")]
pub use cpal_sink::CpalSink;
pub use rtrb_sink::RtrbSink;

use dasp_graph::Input;

/// Mix every connected input and emit the block as interleaved frames.
///
/// Each input contributes its channel `ch`, or its last channel if it has
/// fewer, so a mono source lands in both sides of a stereo sink.
pub(crate) fn interleave_sum(inputs: &[Input], frames: usize, channels: usize, mut emit: impl FnMut(f32)) {
    for i in 0..frames {
        for ch in 0..channels {
            let mut sum = 0.0;
            for input in inputs {
                let buffers = input.buffers();
                if let Some(last) = buffers.len().checked_sub(1) {
                    sum += buffers[ch.min(last)][i];
                }
            }
            emit(sum);
        }
    }
}

//! Polyphonic plucked-string synthesis on a lock-free audio graph.
//!
//! Every voice is a Karplus-Strong string: a delay line one period long,
//! filled with noise and fed back through a damped two-point average. Voices
//! are shaped by a linear attack/sustain/release envelope, panned at constant
//! power, and summed into a stereo block.
//!
//! Design principles:
//! - Each graph has a fixed sample rate, carried by an explicit [`AudioContext`]
//! - The audio thread never locks or allocates; voices and string storage are
//!   built up front
//! - Control reaches the audio thread only as [`SynthCommand`] messages over an
//!   SPSC ring buffer
//! - Scheduled notes fire on their exact sample, whatever the block size
//!
//! ```
//! use rtrb::RingBuffer;
//! use zupfen::nodes::RtrbSink;
//! use zupfen::{Engine, GroupId, Synth, SynthConfig, SynthController, VoiceId, VoiceParams};
//!
//! // capture interleaved stereo instead of playing it
//! let (producer, mut consumer) = RingBuffer::new(8192);
//! let mut engine = Engine::new(44_100).with_output(RtrbSink::stereo(producer));
//! let ctx = *engine.context();
//!
//! let synth = engine.add(Synth::new(&ctx, &SynthConfig::default()));
//! engine.output(&synth);
//!
//! let mut synth = SynthController::new(synth);
//! synth.trigger_on(VoiceId(0), GroupId(0), VoiceParams::new().with_frequency(196.0)).unwrap();
//!
//! for _ in 0..16 {
//!     engine.process();
//! }
//! assert_eq!(consumer.slots(), 16 * 64 * 2);
//! # let _ = consumer.pop();
//! ```
//!
//! With the `cpal_sink` feature, `Engine::default_output()` plays on the
//! system's default device instead.

extern crate alloc;

mod device;
mod engine;
mod error;
mod graph;
mod node;

pub mod dsp;
pub mod nodes;
pub mod synth;

pub use device::CpalDevice;
pub use engine::{Engine, Handle, DEFAULT_QUEUE_SIZE};
pub use error::{DelayLineError, SynthError};
pub use node::{AudioContext, AudioNode, NodeId};
pub use synth::{
    GroupId, Param, Scheduler, Sequence, Synth, SynthCommand, SynthConfig, SynthController, VoiceId, VoiceKind,
    VoiceParams,
};

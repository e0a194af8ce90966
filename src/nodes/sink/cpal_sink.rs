//! CPAL audio output sink

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, warn};

use crate::node::{AudioContext, AudioNode};

use super::interleave_sum;

/// Plays the sum of its inputs on a CPAL device.
///
/// The CPAL stream runs on its own thread; this node feeds interleaved
/// samples into a ring buffer that the stream drains.
pub struct CpalSink {
    buffer: Producer<f32>,
    channels: usize,
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
}

impl CpalSink {
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Self {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();

        // ~100ms of audio absorbs scheduling jitter on the producing side
        let buffer_samples = ((stream_config.sample_rate.0 as f32 * 0.1) as usize) * channels;
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_samples.next_power_of_two().max(8192));

        let samples_consumed = Arc::new(AtomicUsize::new(0));
        let had_underrun = Arc::new(AtomicBool::new(false));
        let stream_state = StreamState {
            consumer,
            samples_consumed: samples_consumed.clone(),
            had_underrun: had_underrun.clone(),
        };

        let device = device.clone();
        std::thread::spawn(move || {
            let stream = match build_stream(&device, sample_format, &stream_config, stream_state) {
                Ok(stream) => stream,
                Err(e) => {
                    error!(error = %e, format = ?sample_format, "failed to build output stream");
                    return;
                }
            };
            if let Err(e) = stream.play() {
                error!(error = %e, "failed to start output stream");
                return;
            }
            debug!(channels = stream_config.channels, rate = stream_config.sample_rate.0, "output stream running");

            // the stream lives as long as this thread
            loop {
                std::thread::park();
            }
        });

        Self {
            buffer: producer,
            channels,
            samples_consumed,
            had_underrun,
        }
    }

    /// Samples the device has pulled so far.
    #[inline]
    pub fn samples_consumed(&self) -> usize {
        self.samples_consumed.load(Ordering::Relaxed)
    }

    /// Free space in the ring, in samples.
    #[inline]
    pub fn buffer_available(&self) -> usize {
        self.buffer.slots()
    }

    /// Check and clear the underrun flag.
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }
}

struct StreamState {
    consumer: Consumer<f32>,
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
}

impl StreamState {
    fn fill<T>(&mut self, data: &mut [T])
    where
        T: SizedSample + FromSample<f32>,
    {
        let mut underrun = false;
        for sample in data.iter_mut() {
            let s = self.consumer.pop().unwrap_or_else(|_| {
                underrun = true;
                0.0
            });
            *sample = T::from_sample(s.clamp(-1.0, 1.0));
        }
        if underrun {
            self.had_underrun.store(true, Ordering::Relaxed);
        }
        self.samples_consumed.fetch_add(data.len(), Ordering::Relaxed);
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &cpal::StreamConfig,
    state: StreamState,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    match sample_format {
        SampleFormat::F32 => build_typed::<f32>(device, stream_config, state),
        SampleFormat::I16 => build_typed::<i16>(device, stream_config, state),
        SampleFormat::U16 => build_typed::<u16>(device, stream_config, state),
        _ => Err(cpal::BuildStreamError::StreamConfigNotSupported),
    }
}

fn build_typed<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut state: StreamState,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _| state.fill(data),
        |err| error!(error = %err, "output stream error"),
        None,
    )
}

impl AudioNode for CpalSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &AudioContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let frames = Buffer::LEN;
        // generating faster than the device consumes: skip rather than write half a block
        if self.buffer.slots() < frames * self.channels {
            return;
        }

        let buffer = &mut self.buffer;
        interleave_sum(inputs, frames, self.channels, |s| {
            let _ = buffer.push(s);
        });

        if self.check_underrun() {
            warn!("output underrun");
        }
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

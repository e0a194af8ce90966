//! High-level engine API

use rtrb::Producer;
use tracing::trace;

use crate::graph::AudioGraph;
use crate::node::{AudioContext, AudioNode, NodeId};

#[cfg(feature = "cpal_sink")]
use crate::device::CpalDevice;

/// Default number of queued messages per node.
pub const DEFAULT_QUEUE_SIZE: usize = 64;

/// A handle for sending messages to a node in the engine's graph.
///
/// Handles are returned when you add a node to an [`Engine`]. Pass them to
/// [`Engine::connect`] or [`Engine::output`] to wire the graph, and use
/// [`send`](Self::send) to deliver messages.
///
/// Messages are buffered in a lock-free ring buffer and handled at the start
/// of the node's next block. If the buffer is full, `send` hands the message
/// back as `Err(msg)`.
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) sender: Producer<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Queue a message for the node. Lock-free; safe on any one thread.
    ///
    /// ```
    /// use zupfen::{Engine, GroupId, Synth, SynthCommand, VoiceId, VoiceParams};
    ///
    /// let mut engine = Engine::new(48_000);
    /// let ctx = *engine.context();
    /// let mut synth = engine.add(Synth::new(&ctx, &Default::default()));
    ///
    /// let cmd = SynthCommand::TriggerOn {
    ///     id: VoiceId(64),
    ///     group: GroupId(0),
    ///     params: VoiceParams::new().with_frequency(329.63),
    /// };
    /// if synth.send(cmd).is_err() {
    ///     eprintln!("queue full");
    /// }
    /// ```
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    /// Free message slots right now.
    #[inline]
    pub fn slots(&self) -> usize {
        self.sender.slots()
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.node_id
    }
}

/// The audio engine: owns the graph, its output sink, and the block counter.
///
/// The engine does not pace itself. Call [`process`](Self::process) from the
/// thread that owns it, staying a few blocks ahead of the device:
///
/// ```no_run
/// # use zupfen::{nodes::RtrbSink, Engine};
/// use std::time::{Duration, Instant};
///
/// # let (producer, _consumer) = rtrb::RingBuffer::new(8192);
/// let mut engine = Engine::new(48_000).with_output(RtrbSink::stereo(producer));
/// let start = Instant::now();
/// let rate = engine.sample_rate() as f64;
///
/// loop {
///     let target = (start.elapsed().as_secs_f64() * rate / 64.0) as u64 + 4;
///     while engine.blocks_processed() < target {
///         engine.process();
///     }
///     std::thread::sleep(Duration::from_micros(500));
/// }
/// ```
pub struct Engine {
    graph: AudioGraph,
    sink_node: Option<NodeId>,
    blocks_processed: u64,
}

impl Engine {
    /// An engine at `sample_rate` with no output; add one with
    /// [`with_output`](Self::with_output).
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: AudioGraph::new(sample_rate),
            sink_node: None,
            blocks_processed: 0,
        }
    }

    /// An engine feeding the system's default output device, or `None`
    /// if there is none.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Option<Self> {
        let device = CpalDevice::default_output()?;
        tracing::debug!(device = device.name(), sample_rate = device.sample_rate(), "default output");
        Some(Self::new(device.sample_rate()).with_output(device.create_sink()))
    }

    /// Use `sink` as the terminal node (builder pattern).
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        let (id, _) = self.graph.add(sink, 1);
        self.graph.set_terminal(id);
        self.sink_node = Some(id);
        self
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.graph.context().sample_rate
    }

    /// Sample rate and the fixed 64-frame block size.
    #[inline]
    pub fn context(&self) -> &AudioContext {
        self.graph.context()
    }

    #[inline]
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Add a node with the default message queue size.
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        self.add_with_queue_size(node, DEFAULT_QUEUE_SIZE)
    }

    pub fn add_with_queue_size<N: AudioNode>(&mut self, node: N, queue_size: usize) -> Handle<N::Message> {
        let (node_id, sender) = self.graph.add(node, queue_size);
        trace!(node = node_id.0, queue_size, "node added");
        Handle { node_id, sender }
    }

    /// Feed the output of `from` into `to`. A node with several inputs sums them.
    pub fn connect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>)
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        self.graph.connect(from.node_id, to.node_id);
    }

    /// Connect a node straight to the output sink.
    ///
    /// # Panics
    ///
    /// Panics if no output sink is configured.
    pub fn output<M: Send + 'static>(&mut self, handle: &Handle<M>) {
        let sink = self
            .sink_node
            .expect("No output sink configured. Use default_output() or with_output().");
        self.graph.connect(handle.node_id, sink);
    }

    /// Render one 64-frame block through the graph.
    pub fn process(&mut self) {
        self.graph.process();
        self.blocks_processed += 1;
    }
}

//! Audio graph - owns nodes and message queues

use alloc::boxed::Box;

use dasp_graph::{Buffer, Input, NodeData, Processor};
use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioContext, AudioNode, NodeId};

// Type-erased wrapper so we can store heterogeneous nodes
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &AudioContext, inputs: &[Input], outputs: &mut [Buffer]);
}

struct NodeWrapper<N: AudioNode> {
    node: N,
    receiver: Consumer<N::Message>,
}

impl<N: AudioNode> ErasedNode for NodeWrapper<N> {
    fn process_erased(&mut self, ctx: &AudioContext, inputs: &[Input], outputs: &mut [Buffer]) {
        let receiver = &mut self.receiver;
        // drains the queue in place, no allocation
        let messages = core::iter::from_fn(|| receiver.pop().ok());
        self.node.process(ctx, messages, inputs, outputs);
    }
}

struct DaspAdapter {
    node: Box<dyn ErasedNode>,
    ctx: AudioContext,
}

impl dasp_graph::Node for DaspAdapter {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        self.node.process_erased(&self.ctx, inputs, outputs);
    }
}

type InnerGraph = petgraph::graph::Graph<NodeData<DaspAdapter>, ()>;

/// A pull graph of [`AudioNode`]s at one fixed sample rate.
///
/// Every node gets its own SPSC message queue; the producer half is handed
/// back from [`add`](Self::add) and the consumer half is drained at the start
/// of the node's `process` call. Blocks are always [`Buffer::LEN`] frames.
pub(crate) struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    ctx: AudioContext,

    node_indices: HashMap<NodeId, NodeIndex>,
    next_node_id: u32,

    terminal: Option<NodeIndex>,
}

impl AudioGraph {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: InnerGraph::with_capacity(64, 64),
            processor: Processor::with_capacity(64),
            ctx: AudioContext::new(sample_rate, Buffer::LEN),
            node_indices: HashMap::new(),
            next_node_id: 0,
            terminal: None,
        }
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    /// Add a node with a message queue of `queue_size` slots.
    pub fn add<N: AudioNode>(&mut self, node: N, queue_size: usize) -> (NodeId, Producer<N::Message>) {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let (producer, consumer) = RingBuffer::new(queue_size.max(1));

        let num_outputs = node.num_outputs();
        let adapter = DaspAdapter {
            node: Box::new(NodeWrapper { node, receiver: consumer }),
            ctx: self.ctx,
        };

        let node_data = match num_outputs {
            2 => NodeData::new2(adapter),
            // sinks have no outputs, but dasp_graph still wants one buffer
            _ => NodeData::new1(adapter),
        };

        let idx = self.graph.add_node(node_data);
        self.node_indices.insert(id, idx);
        (id, producer)
    }

    /// Route the output of `from` into `to`.
    ///
    /// # Panics
    ///
    /// Panics if either id was not added to this graph.
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        let from_idx = self.node_indices[&from];
        let to_idx = self.node_indices[&to];
        self.graph.add_edge(from_idx, to_idx, ());
    }

    /// Set which node to pull from (typically a sink).
    pub fn set_terminal(&mut self, id: NodeId) {
        self.terminal = Some(self.node_indices[&id]);
    }

    /// Render one block up to the terminal node.
    pub fn process(&mut self) {
        if let Some(terminal) = self.terminal {
            self.processor.process(&mut self.graph, terminal);
        }
    }
}

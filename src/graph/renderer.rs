use std::sync::Arc;

use rtrb::{Consumer, Producer, PushError};

use crate::{dsp::AtomicGain, graph::voice::PlaybackNode, MAX_VOICES};

/// The realtime half of the voice graph, owned by the audio callback.
///
/// `render` never blocks, allocates or frees. Nodes live in a pool reserved
/// for `MAX_VOICES`; halted nodes go back to the owner thread over the retire
/// ring and are dropped there. A node that finds the pool full waits in the
/// incoming ring for a later block.
pub struct GraphRenderer {
    incoming: Consumer<PlaybackNode>,
    retired: Producer<PlaybackNode>,
    nodes: Vec<PlaybackNode>,
    master: Arc<AtomicGain>,
}

impl GraphRenderer {
    pub(crate) fn new(
        incoming: Consumer<PlaybackNode>,
        retired: Producer<PlaybackNode>,
        master: Arc<AtomicGain>,
    ) -> Self {
        Self {
            incoming,
            retired,
            nodes: Vec::with_capacity(MAX_VOICES),
            master,
        }
    }

    /// Render one interleaved block with `channels` channels.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        self.sync();

        out.fill(0.0);
        let master = self.master.get();
        for node in self.nodes.iter_mut().filter(|node| !node.is_halted()) {
            node.render_add(out, channels, master);
        }
    }

    /// Take in new nodes and retire halted ones without mixing anything.
    pub fn sync(&mut self) {
        // Detach stopped voices
        let mut i = 0;
        while i < self.nodes.len() {
            if self.nodes[i].is_halted() && !self.retired.is_full() {
                let node = self.nodes.swap_remove(i);
                self.retire(node);
            } else {
                i += 1;
            }
        }

        // Pick up voices started since the last block
        while let Ok(halted) = self.incoming.peek().map(PlaybackNode::is_halted) {
            let retire = halted && !self.retired.is_full();
            if !retire && self.nodes.len() >= MAX_VOICES {
                break;
            }
            let Ok(node) = self.incoming.pop() else {
                break;
            };
            if retire {
                self.retire(node);
            } else {
                self.nodes.push(node);
            }
        }
    }

    /// Hand a halted node back to the owner thread. Callers check for a free
    /// slot first; this side is the only writer, so the slot stays free.
    fn retire(&mut self, node: PlaybackNode) {
        if let Err(PushError::Full(node)) = self.retired.push(node) {
            self.nodes.push(node);
        }
    }

    /// Nodes still playing after the last block.
    pub fn active_nodes(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_halted()).count()
    }
}

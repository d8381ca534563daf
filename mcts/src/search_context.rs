use common::create_rng_from_seed;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::NodeId;

/// Scratch state owned by a single search worker and threaded through every `select` call.
pub struct SearchContext {
    rng: StdRng,
    grave_reference: Option<NodeId>,
    pub path: Vec<NodeId>,
}

impl SearchContext {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            grave_reference: None,
            path: Vec::with_capacity(64),
        }
    }

    pub fn from_seed(seed: u64, worker: usize) -> Self {
        Self::new(create_rng_from_seed(seed, worker))
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// The ancestor whose AMAF table the GRAVE strategies currently read.
    pub fn grave_reference(&self) -> Option<NodeId> {
        self.grave_reference
    }

    pub fn set_grave_reference(&mut self, node_id: Option<NodeId>) {
        self.grave_reference = node_id;
    }

    /// Prepares the context for the next cycle. The generator keeps its position.
    pub fn clear(&mut self) {
        self.path.clear();
        self.grave_reference = None;
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::MoveKey;

/// Accumulated evidence for one move key.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStatistics {
    pub accumulated_score: f64,
    pub visit_count: u32,
}

impl NodeStatistics {
    pub fn new(accumulated_score: f64, visit_count: u32) -> Self {
        Self {
            accumulated_score,
            visit_count,
        }
    }

    /// Mean score, `None` while there is no evidence.
    pub fn mean(&self) -> Option<f64> {
        if self.visit_count == 0 {
            None
        } else {
            Some(self.accumulated_score / self.visit_count as f64)
        }
    }

    pub fn record(&mut self, score: f64) {
        self.accumulated_score += score;
        self.visit_count += 1;
    }

    pub fn merge(&mut self, other: &NodeStatistics) {
        self.accumulated_score += other.accumulated_score;
        self.visit_count += other.visit_count;
    }
}

/// Move-keyed statistics shared between search workers.
///
/// Writers take the lock once per backpropagated path, readers once per lookup. A missing
/// entry means no evidence has been recorded yet.
#[derive(Debug)]
pub struct MoveStatsTable<A> {
    entries: RwLock<HashMap<MoveKey<A>, NodeStatistics>>,
}

impl<A> Default for MoveStatsTable<A> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<A> MoveStatsTable<A>
where
    A: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MoveKey<A>) -> Option<NodeStatistics> {
        self.entries.read().get(key).copied()
    }

    pub fn record(&self, key: MoveKey<A>, score: f64) {
        self.entries.write().entry(key).or_default().record(score);
    }

    pub fn record_all<'a, I>(&self, scores: I)
    where
        I: IntoIterator<Item = (&'a MoveKey<A>, f64)>,
        A: 'a,
    {
        let mut entries = self.entries.write();
        for (key, score) in scores {
            match entries.get_mut(key) {
                Some(stats) => stats.record(score),
                None => {
                    let mut stats = NodeStatistics::default();
                    stats.record(score);
                    entries.insert(key.clone(), stats);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

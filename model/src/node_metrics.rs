use serde::{Deserialize, Serialize};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetrics<A> {
    /// The number of real visits of the node.
    pub visits: usize,
    /// One entry per legal action of the node, in legal action order.
    pub children: Vec<EdgeMetrics<A>>,
}

impl<A> NodeMetrics<A> {
    /// The most visited child. Ties keep the earliest legal action.
    pub fn child_max_visits(&self) -> Option<&EdgeMetrics<A>> {
        self.children.iter().rev().max_by_key(|c| c.visits)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EdgeMetrics<A> {
    /// The action that this edge represents.
    action: A,
    /// The number of real visits of the child reached through this edge.
    visits: usize,
    /// Mean outcome of the child from the perspective of the agent choosing the edge.
    value: f64,
}

impl<A> EdgeMetrics<A> {
    pub fn new(action: A, visits: usize, value: f64) -> Self {
        Self {
            action,
            visits,
            value,
        }
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn visits(&self) -> usize {
        self.visits
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

use std::hash::Hash;

/// Structural key for move-keyed statistics: the move plus the ply it was played at.
///
/// The same move at two different depths yields two distinct keys. Tables that want to pool
/// a move across depths build their keys with [`MoveKey::depth_agnostic`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MoveKey<A> {
    action: A,
    depth: Option<usize>,
}

impl<A> MoveKey<A> {
    pub fn new(action: A, depth: usize) -> Self {
        Self {
            action,
            depth: Some(depth),
        }
    }

    pub fn depth_agnostic(action: A) -> Self {
        Self {
            action,
            depth: None,
        }
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn depth(&self) -> Option<usize> {
        self.depth
    }
}

/// Bounds shared by every move type the search can key statistics on.
pub trait SearchAction: Clone + Eq + Hash + Send + Sync {}

impl<T> SearchAction for T where T: Clone + Eq + Hash + Send + Sync {}

use std::ops::{BitOr, BitOrAssign};

/// Optional statistics a selection strategy needs the backpropagation pass to maintain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BackpropFlags(u32);

impl BackpropFlags {
    pub const NONE: Self = Self(0);
    /// Per-node AMAF tables keyed by move and depth.
    pub const GRAVE_STATS: Self = Self(0x1);
    /// A single tree-wide table keyed by move only.
    pub const GLOBAL_ACTION_STATS: Self = Self(0x2);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for BackpropFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BackpropFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Optional per-child state a selection strategy needs filled in when a child is expanded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExpansionFlags(u32);

impl ExpansionFlags {
    pub const NONE: Self = Self(0);
    /// Heuristic value estimates for every agent.
    pub const HEURISTIC_INIT: Self = Self(0x1);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ExpansionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExpansionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

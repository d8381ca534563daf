/// Static bounds `[alpha, beta]` on a node's value, from the perspective of the agent to move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaBetaBounds {
    pub alpha: f64,
    pub beta: f64,
}

impl AlphaBetaBounds {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    pub fn unbounded() -> Self {
        Self {
            alpha: f64::NEG_INFINITY,
            beta: f64::INFINITY,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite()
    }

    pub fn width(&self) -> f64 {
        self.beta - self.alpha
    }
}

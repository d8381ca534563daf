use rand::Rng;

/// Running argmax that breaks ties uniformly at random by reservoir sampling.
///
/// Candidates are offered in order. The `k`-th candidate tying the incumbent replaces it with
/// probability `1/k`, so every tied candidate ends up chosen with equal probability. `NaN`
/// values are never chosen; if nothing else is offered the index stays `0`.
#[derive(Clone, Copy, Debug)]
pub struct BestChild {
    index: usize,
    value: f64,
    num_best_found: usize,
}

impl BestChild {
    pub fn new() -> Self {
        Self {
            index: 0,
            value: f64::NEG_INFINITY,
            num_best_found: 0,
        }
    }

    pub fn offer<R: Rng + ?Sized>(&mut self, index: usize, value: f64, rng: &mut R) {
        if value.is_nan() {
            return;
        }

        if value > self.value || self.num_best_found == 0 {
            self.index = index;
            self.value = value;
            self.num_best_found = 1;
        } else if value == self.value {
            self.num_best_found += 1;
            if rng.gen_range(0..self.num_best_found) == 0 {
                self.index = index;
            }
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn num_best_found(&self) -> usize {
        self.num_best_found
    }
}

impl Default for BestChild {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the largest value, ties broken uniformly at random.
pub fn select_best<I, R>(values: I, rng: &mut R) -> usize
where
    I: IntoIterator<Item = f64>,
    R: Rng + ?Sized,
{
    let mut best = BestChild::new();
    for (index, value) in values.into_iter().enumerate() {
        best.offer(index, value, rng);
    }
    best.index()
}

/// Outcome or estimate for every agent of a game, each normalized to [-1, 1].
pub trait Value: Clone {
    fn get_value_for_agent(&self, agent: usize) -> f64;

    fn num_agents(&self) -> usize;

    fn utilities(&self) -> Vec<f64> {
        (0..self.num_agents())
            .map(|agent| self.get_value_for_agent(agent))
            .collect()
    }
}

impl Value for Vec<f64> {
    fn get_value_for_agent(&self, agent: usize) -> f64 {
        self[agent]
    }

    fn num_agents(&self) -> usize {
        self.len()
    }
}

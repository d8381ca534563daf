use rand::prelude::{SeedableRng, StdRng};

/// Seeds a worker's generator from a base seed. Each worker gets a distinct, reproducible stream.
pub fn create_rng_from_seed(seed: u64, worker: usize) -> StdRng {
    let mut bytes = [0; 32];
    bytes[..8].clone_from_slice(&seed.to_le_bytes());
    bytes[8..16].clone_from_slice(&(worker as u64).to_le_bytes());
    bytes[16..24].clone_from_slice(&seed.rotate_left(32).to_le_bytes());
    bytes[24..32].clone_from_slice(&(!(worker as u64)).to_le_bytes());

    StdRng::from_seed(bytes)
}

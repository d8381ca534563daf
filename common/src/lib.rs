pub mod atomic_f64;
pub mod config;
pub mod math;
pub mod rng;

pub use atomic_f64::*;
pub use config::*;
pub use math::*;
pub use rng::*;

pub mod analytics;
pub mod bounds;
pub mod node_metrics;

pub use analytics::*;
pub use bounds::*;
pub use node_metrics::*;

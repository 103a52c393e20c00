pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod stats;

pub use error::StatsError;
pub use stats::{Computation, StatsEngine, StatsResult, compute};

pub mod aggregator;
pub mod error;

pub use aggregator::*;
pub use error::*;

pub mod handlers;
pub mod models;
pub mod report;

pub use handlers::*;
pub use models::*;
pub use report::*;

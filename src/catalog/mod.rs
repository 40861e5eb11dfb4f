pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod seed;

pub use handlers::*;
pub use models::*;
pub use pricing::*;
pub use repository::*;

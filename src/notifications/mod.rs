pub mod dispatcher;
pub mod error;
pub mod mailer;
pub mod summary;
pub mod whatsapp;

pub use dispatcher::*;
pub use error::*;
pub use mailer::*;
pub use summary::*;
pub use whatsapp::*;

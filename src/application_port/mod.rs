mod error;
mod relationship_service;
mod user_service;

pub use error::*;
pub use relationship_service::*;
pub use user_service::*;

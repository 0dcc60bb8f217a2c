mod auth;
mod error;
mod resolver;

pub use auth::*;
pub use error::*;
pub use resolver::*;

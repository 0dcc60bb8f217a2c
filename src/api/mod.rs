mod client;
mod error;
mod transport;

pub use client::*;
pub use error::*;
pub use transport::*;

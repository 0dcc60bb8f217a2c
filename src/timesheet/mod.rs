mod apply;
mod dates;
mod error;
mod report;
mod request;

pub use apply::*;
pub use dates::*;
pub use error::*;
pub use report::*;
pub use request::*;

#![forbid(unsafe_code)]

pub mod error;
pub mod grading;
pub mod model;
pub mod time;

pub use error::ValidationError;
pub use time::Clock;

#![forbid(unsafe_code)]

pub mod error;
pub mod mastery;
pub mod model;
pub mod session;
pub mod time;

pub use error::Error;
pub use time::Clock;

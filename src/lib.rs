pub mod app;
pub mod diagram;
pub mod error;
pub mod rules;

pub use error::{ConfigError, Error, Result};

pub mod config;
pub mod convert;

pub use config::Config;
pub use convert::{convert, ConvertOptions};

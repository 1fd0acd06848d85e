mod error;
mod model;
mod parse;

pub use crate::error::ConfigError;
pub use crate::model::{Config, DEFAULT_SERVER_URL};
pub use crate::parse::{interpolate, parse_config, parse_seconds};

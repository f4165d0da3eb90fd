pub mod config;
pub mod error;
pub mod resolve;
pub mod types;

pub use config::ConfigPaths;
pub use error::{Error, Result};
pub use resolve::{Resolver, ZoneLookup};
pub use types::*;

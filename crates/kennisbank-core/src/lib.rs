//! Kennisbank core: error taxonomy and configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, KennisbankConfig};
pub use error::{Error, Result};

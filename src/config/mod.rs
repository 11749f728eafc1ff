//! Configuration for the fee engine: process settings and chain profiles.
mod error;
pub use error::*;

pub mod config_file;
pub use config_file::{load_chains, parse_chains, ChainProfile, FeeModel};

mod settings;
pub use settings::*;

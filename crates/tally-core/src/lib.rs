//! Tally Core - Shared configuration and error handling
//!
//! This crate provides the configuration file model and the common error
//! type used by the Tally shard aggregation tools.

pub mod config;
pub mod error;

pub use config::{Config, PollConfig, ProfilesConfig};
pub use error::{ConfigError, Result, TallyError};

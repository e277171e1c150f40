//! # CourtWatch Core
//!
//! Shared vocabulary for the CourtWatch crates: the error type, the
//! configuration file model, the tournament/class entity types, and the
//! traits behind which the booking API, the notification sinks and the
//! clock sit.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::WatchConfig;
pub use error::{CourtWatchError, Result};

//! # CourtWatch Watch
//!
//! The engine behind a polling run: filter fetched entities, diff them
//! against the last run's observations, and collect the text to announce.

pub mod filter;
pub mod format;
pub mod runner;
pub mod state;

pub use filter::Matches;
pub use format::Render;
pub use runner::{Dispatch, Run, SweepReport};
pub use state::{Observation, ObservationStore};

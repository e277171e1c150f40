//! # CourtWatch Client
//! Thin client for the Playtomic booking API. Implements
//! [`Source`](courtwatch_core::traits::Source) for tournaments and classes.

pub mod client;
pub mod params;

pub use client::PlaytomicClient;
pub use params::{ClassQuery, Coordinate, TournamentQuery};

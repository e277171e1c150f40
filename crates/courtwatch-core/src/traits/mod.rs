//! Seams between the watcher and its external collaborators.

pub mod channel;
pub mod clock;
pub mod source;

pub use channel::Channel;
pub use clock::{Clock, FixedClock, SystemClock};
pub use source::Source;

//! Utility functions and injectable capabilities.
//!
//! - [`id`] - Ticket identifier generation
//! - [`time`] - Clock and timestamp text format

pub mod id;
pub mod time;

pub use id::{IdSource, SequentialIds, UuidIds};
pub use time::{Clock, FixedClock, SystemClock};

//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for the streaming drivers.
//!
//! Industry notes:
//! - Overhead bytes (header, framing, tags, trailer) are tracked apart from
//!   ciphertext so size expansion can be read straight off a snapshot.
//! - Snapshots are plain data and serde-serializable for benchmark reports.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;

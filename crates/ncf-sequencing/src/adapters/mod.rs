//! # Adapters
//!
//! Implementations of the outbound ports.

pub mod clock;
pub mod memory_store;

pub use clock::{FixedClock, SystemClock};
pub use memory_store::{InMemorySequenceStore, InMemoryTransaction};

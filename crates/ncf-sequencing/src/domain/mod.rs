//! # Domain Module
//!
//! Core domain types for NCF sequencing.

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use catalog::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;

//! # Domain Module
//!
//! Core types of the query layer. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod messages;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use messages::*;
pub use value_objects::*;

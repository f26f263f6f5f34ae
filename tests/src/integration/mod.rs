//! Cross-layer flows: service, adapter and wire format together.

pub mod fixtures;

mod queries;
mod resolution;

//! Core domain entities.
//!
//! - [`Mapping`] - A persisted URL to short code association
//! - [`NewMapping`] - Input for creating a mapping; identity and timestamp
//!   are assigned by the store

pub mod mapping;

pub use mapping::{Mapping, NewMapping};

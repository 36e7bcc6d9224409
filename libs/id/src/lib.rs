//! # gamification-id
//!
//! Typed identifiers for the gamification event model.
//!
//! ## Design Principles
//!
//! - IDs are UUIDs on the wire, in their canonical hyphenated form
//! - IDs are typed so an event ID can never be passed where a transaction ID
//!   is expected
//! - Parsing is strict and roundtrips (parse → format → parse)
//!
//! ## ID Format
//!
//! Examples:
//! - `3f2b8c1e-9a4d-4c6e-8f0a-1b2c3d4e5f60`
//!
//! Fresh IDs are random (v4). Any well-formed UUID is accepted when parsing,
//! since IDs produced by other services may use a different version.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for consumers that need raw UUID operations
pub use uuid::Uuid;

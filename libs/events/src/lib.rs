//! # gamification-events
//!
//! Domain events exchanged between the services of the points and
//! achievements platform.
//!
//! ## Design Principles
//!
//! - The set of events is closed: [`GamificationEvent`] is an enum, and the
//!   registry maps each discriminator to exactly one variant
//! - Events are immutable and valid from the moment they exist; every
//!   constructor validates before returning
//! - The wire format is flat JSON with the discriminator under `type`
//!
//! ## Wire Format
//!
//! ```json
//! {
//!   "type": "TASK_COMPLETED",
//!   "eventId": "3f2b8c1e-9a4d-4c6e-8f0a-1b2c3d4e5f60",
//!   "userId": "user-42",
//!   "occurredAt": "2024-03-01T10:15:30",
//!   "taskId": "task-7",
//!   "score": 85
//! }
//! ```
//!
//! `occurredAt` is a local date-time without offset.
//!
//! ## Event Types
//!
//! - Learning activity: `TASK_COMPLETED`, `TEST_PASSED`, `COURSE_ENROLLED`,
//!   `FORUM_POST_CREATED`, `ASSIGNMENT_SUBMITTED`
//! - Progress: `POINTS_CHANGED`, `LEVEL_UP`, `ACHIEVEMENT_UNLOCKED`

mod codec;
mod envelope;
mod error;
mod event;
mod kind;
mod registry;
mod types;
mod validation;

pub use codec::{
    decode, decode_slice, decode_str, encode, encode_to_string, encode_to_vec, FieldReader,
};
pub use envelope::{Envelope, EventVariant, ENVELOPE_FIELDS};
pub use error::{
    Constraint, DecodeError, EncodeError, FieldViolation, RegistryError, ValidationError,
};
pub use event::GamificationEvent;
pub use kind::*;
pub use registry::{registry, DecodeFn, Registry, RegistryEntry};
pub use types::*;

/// Re-export ID types so producers need a single dependency.
pub use gamification_id::{EventId, TransactionId};

//! Typed ID definitions for gamification events.

use crate::define_id;

define_id!(
    /// Identity of a single event instance, unique per event.
    EventId
);

define_id!(
    /// Identity of the points transaction behind a balance change.
    TransactionId
);

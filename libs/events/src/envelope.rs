//! Event envelope - the fields common to every variant.

use chrono::{Local, NaiveDateTime};
use gamification_id::EventId;
use serde::Serialize;
use validator::Validate;

use crate::codec::FieldReader;
use crate::error::DecodeError;
use crate::event::GamificationEvent;
use crate::kind::{fields, EventKind};
use crate::validation::{not_blank, not_in_future};

/// Wire names of the envelope fields.
pub const ENVELOPE_FIELDS: [&str; 3] = [fields::EVENT_ID, fields::USER_ID, fields::OCCURRED_AT];

/// The event envelope - identity, actor and time of an occurrence.
///
/// Flattened into every variant on the wire, next to the discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Unique per event instance.
    event_id: EventId,

    /// The user who caused the event.
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    user_id: String,

    /// Local time in the source system; never in the future.
    #[validate(custom(function = "not_in_future"))]
    occurred_at: NaiveDateTime,
}

impl Envelope {
    /// Builds an envelope without checking it; variants validate it together
    /// with their payload.
    pub(crate) fn new(event_id: EventId, user_id: String, occurred_at: NaiveDateTime) -> Self {
        Self {
            event_id,
            user_id,
            occurred_at,
        }
    }

    /// Stamps a fresh event ID and the current local time.
    pub(crate) fn fresh(user_id: String) -> Self {
        Self::new(EventId::new(), user_id, Local::now().naive_local())
    }

    /// Reads the envelope fields of a payload.
    pub(crate) fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self::new(
            reader.required(fields::EVENT_ID)?,
            reader.required(fields::USER_ID)?,
            reader.required(fields::OCCURRED_AT)?,
        ))
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn occurred_at(&self) -> NaiveDateTime {
        self.occurred_at
    }
}

/// The contract every concrete variant satisfies.
///
/// Ties a payload struct to its discriminator and its decoder; the registry
/// is built from implementations of this trait.
pub trait EventVariant: Serialize + Into<GamificationEvent> + Sized {
    /// The variant's discriminator, fixed per type.
    const KIND: EventKind;

    /// Wire names of the payload fields (envelope excluded).
    const FIELDS: &'static [&'static str];

    fn envelope(&self) -> &Envelope;

    /// Decodes and validates the variant from payload fields.
    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError>;

    /// Returns the discriminator string.
    fn event_type(&self) -> &'static str {
        Self::KIND.as_str()
    }

    fn event_id(&self) -> EventId {
        self.envelope().event_id()
    }

    fn user_id(&self) -> &str {
        self.envelope().user_id()
    }

    fn occurred_at(&self) -> NaiveDateTime {
        self.envelope().occurred_at()
    }

    /// Returns true if `event_type` is this variant's discriminator.
    fn is_type(&self, event_type: &str) -> bool {
        self.event_type() == event_type
    }

    fn into_event(self) -> GamificationEvent {
        self.into()
    }
}

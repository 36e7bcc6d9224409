//! Discriminator registry - the fixed mapping between `type` strings and
//! variants.
//!
//! The table is written out by hand and checked when it is built: a key
//! registered twice, or a key that disagrees with the discriminator its
//! variant reports, is rejected instead of silently shadowing another entry.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::codec::FieldReader;
use crate::envelope::EventVariant;
use crate::error::{DecodeError, RegistryError};
use crate::event::GamificationEvent;
use crate::kind::{event_types, EventKind};
use crate::types::*;

/// Decodes a payload into one concrete variant.
pub type DecodeFn = fn(&FieldReader<'_>) -> Result<GamificationEvent, DecodeError>;

/// One registered variant.
#[derive(Clone, Copy)]
pub struct RegistryEntry {
    kind: EventKind,
    payload_fields: &'static [&'static str],
    decode: DecodeFn,
}

impl RegistryEntry {
    /// Builds the entry for variant `V`.
    pub fn of<V: EventVariant>() -> Self {
        Self {
            kind: V::KIND,
            payload_fields: V::FIELDS,
            decode: decode_variant::<V>,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Wire names of the variant's payload fields.
    pub fn payload_fields(&self) -> &'static [&'static str] {
        self.payload_fields
    }

    pub fn decode(&self, reader: &FieldReader<'_>) -> Result<GamificationEvent, DecodeError> {
        (self.decode)(reader)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("kind", &self.kind)
            .field("payload_fields", &self.payload_fields)
            .finish_non_exhaustive()
    }
}

fn decode_variant<V: EventVariant>(
    reader: &FieldReader<'_>,
) -> Result<GamificationEvent, DecodeError> {
    V::decode(reader).map(V::into_event)
}

/// Read-only mapping from discriminator to variant.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: HashMap<&'static str, RegistryEntry>,
}

impl Registry {
    /// Builds a registry, rejecting duplicate or mismatched discriminators.
    pub fn from_entries<I>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (&'static str, RegistryEntry)>,
    {
        let mut map = HashMap::new();
        for (key, entry) in entries {
            let declared = entry.kind.as_str();
            if key != declared {
                return Err(RegistryError::MismatchedDiscriminator {
                    key: key.to_string(),
                    declared,
                });
            }
            if map.insert(key, entry).is_some() {
                return Err(RegistryError::DuplicateDiscriminator(key.to_string()));
            }
        }
        Ok(Self { entries: map })
    }

    /// The registry of every built-in variant.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_entries([
            (event_types::TASK_COMPLETED, RegistryEntry::of::<TaskCompleted>()),
            (event_types::TEST_PASSED, RegistryEntry::of::<TestPassed>()),
            (event_types::COURSE_ENROLLED, RegistryEntry::of::<CourseEnrolled>()),
            (event_types::FORUM_POST_CREATED, RegistryEntry::of::<ForumPostCreated>()),
            (event_types::ASSIGNMENT_SUBMITTED, RegistryEntry::of::<AssignmentSubmitted>()),
            (event_types::POINTS_CHANGED, RegistryEntry::of::<PointsChanged>()),
            (event_types::LEVEL_UP, RegistryEntry::of::<LevelUp>()),
            (event_types::ACHIEVEMENT_UNLOCKED, RegistryEntry::of::<AchievementUnlocked>()),
        ])
    }

    pub fn lookup(&self, event_type: &str) -> Option<&RegistryEntry> {
        self.entries.get(event_type)
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.entries.contains_key(event_type)
    }

    /// Returns the discriminator a kind is registered under.
    pub fn discriminator_of(&self, kind: EventKind) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.kind == kind)
            .map(|(key, _)| *key)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<_> = self.entries.values().map(RegistryEntry::kind).collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The process-wide registry, built once on first use.
pub fn registry() -> Result<&'static Registry, RegistryError> {
    static REGISTRY: OnceLock<Result<Registry, RegistryError>> = OnceLock::new();
    REGISTRY
        .get_or_init(Registry::builtin)
        .as_ref()
        .map_err(RegistryError::clone)
}

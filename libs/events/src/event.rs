//! The closed union of gamification events.

use chrono::NaiveDateTime;
use gamification_id::EventId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::envelope::{Envelope, EventVariant};
use crate::error::ValidationError;
use crate::kind::EventKind;
use crate::types::*;

/// Any gamification event.
///
/// Matching on this enum is exhaustive: a new variant is a compile error at
/// every consumer until it is handled.
#[derive(Debug, Clone, PartialEq)]
pub enum GamificationEvent {
    TaskCompleted(TaskCompleted),
    TestPassed(TestPassed),
    CourseEnrolled(CourseEnrolled),
    ForumPostCreated(ForumPostCreated),
    AssignmentSubmitted(AssignmentSubmitted),
    PointsChanged(PointsChanged),
    LevelUp(LevelUp),
    AchievementUnlocked(AchievementUnlocked),
}

impl GamificationEvent {
    /// Creates a `TaskCompleted` event with a fresh ID and the current time.
    pub fn task_completed(
        user_id: impl Into<String>,
        task_id: impl Into<String>,
        score: i32,
    ) -> Result<TaskCompleted, ValidationError> {
        TaskCompleted::create(user_id, task_id, score)
    }

    /// Creates a `TestPassed` event with a fresh ID and the current time.
    pub fn test_passed(
        user_id: impl Into<String>,
        test_id: impl Into<String>,
        percentage: f64,
    ) -> Result<TestPassed, ValidationError> {
        TestPassed::create(user_id, test_id, percentage)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            GamificationEvent::TaskCompleted(_) => TaskCompleted::KIND,
            GamificationEvent::TestPassed(_) => TestPassed::KIND,
            GamificationEvent::CourseEnrolled(_) => CourseEnrolled::KIND,
            GamificationEvent::ForumPostCreated(_) => ForumPostCreated::KIND,
            GamificationEvent::AssignmentSubmitted(_) => AssignmentSubmitted::KIND,
            GamificationEvent::PointsChanged(_) => PointsChanged::KIND,
            GamificationEvent::LevelUp(_) => LevelUp::KIND,
            GamificationEvent::AchievementUnlocked(_) => AchievementUnlocked::KIND,
        }
    }

    /// Returns the discriminator carried under the `type` key.
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn envelope(&self) -> &Envelope {
        match self {
            GamificationEvent::TaskCompleted(e) => e.envelope(),
            GamificationEvent::TestPassed(e) => e.envelope(),
            GamificationEvent::CourseEnrolled(e) => e.envelope(),
            GamificationEvent::ForumPostCreated(e) => e.envelope(),
            GamificationEvent::AssignmentSubmitted(e) => e.envelope(),
            GamificationEvent::PointsChanged(e) => e.envelope(),
            GamificationEvent::LevelUp(e) => e.envelope(),
            GamificationEvent::AchievementUnlocked(e) => e.envelope(),
        }
    }

    pub fn event_id(&self) -> EventId {
        self.envelope().event_id()
    }

    pub fn user_id(&self) -> &str {
        self.envelope().user_id()
    }

    pub fn occurred_at(&self) -> NaiveDateTime {
        self.envelope().occurred_at()
    }

    /// Returns true if `event_type` is this event's discriminator.
    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type() == event_type
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for GamificationEvent {
                fn from(event: $variant) -> Self {
                    GamificationEvent::$variant(event)
                }
            }
        )*
    };
}

impl_from_variant!(
    TaskCompleted,
    TestPassed,
    CourseEnrolled,
    ForumPostCreated,
    AssignmentSubmitted,
    PointsChanged,
    LevelUp,
    AchievementUnlocked,
);

/// Flat wire shape: discriminator next to envelope and payload fields.
#[derive(Serialize)]
struct Tagged<'a, V> {
    #[serde(rename = "type")]
    event_type: &'static str,
    #[serde(flatten)]
    event: &'a V,
}

impl<'a, V: EventVariant> Tagged<'a, V> {
    /// Tags with `V::KIND`. `Registry::from_entries` only accepts an entry
    /// whose key equals its variant's `KIND`, so this is the registered
    /// discriminator.
    fn new(event: &'a V) -> Self {
        Self {
            event_type: V::KIND.as_str(),
            event,
        }
    }
}

impl Serialize for GamificationEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            GamificationEvent::TaskCompleted(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::TestPassed(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::CourseEnrolled(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::ForumPostCreated(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::AssignmentSubmitted(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::PointsChanged(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::LevelUp(e) => Tagged::new(e).serialize(serializer),
            GamificationEvent::AchievementUnlocked(e) => Tagged::new(e).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for GamificationEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        crate::codec::decode(&value).map_err(serde::de::Error::custom)
    }
}

//! Discriminators, enumerated values and bounds shared by all variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Constraint, DecodeError, ValidationError};

// =============================================================================
// Event Type Constants
// =============================================================================

/// All event type names as constants.
pub mod event_types {
    // Learning activity
    pub const TASK_COMPLETED: &str = "TASK_COMPLETED";
    pub const TEST_PASSED: &str = "TEST_PASSED";
    pub const COURSE_ENROLLED: &str = "COURSE_ENROLLED";
    pub const FORUM_POST_CREATED: &str = "FORUM_POST_CREATED";
    pub const ASSIGNMENT_SUBMITTED: &str = "ASSIGNMENT_SUBMITTED";

    // Progress
    pub const POINTS_CHANGED: &str = "POINTS_CHANGED";
    pub const LEVEL_UP: &str = "LEVEL_UP";
    pub const ACHIEVEMENT_UNLOCKED: &str = "ACHIEVEMENT_UNLOCKED";
}

/// Wire names of every field, as they appear in an encoded payload.
pub mod fields {
    /// Key carrying the discriminator.
    pub const TYPE: &str = "type";

    // Envelope
    pub const EVENT_ID: &str = "eventId";
    pub const USER_ID: &str = "userId";
    pub const OCCURRED_AT: &str = "occurredAt";

    // Payloads
    pub const TASK_ID: &str = "taskId";
    pub const SCORE: &str = "score";
    pub const TEST_ID: &str = "testId";
    pub const PERCENTAGE: &str = "percentage";
    pub const COURSE_ID: &str = "courseId";
    pub const POST_ID: &str = "postId";
    pub const TOPIC_ID: &str = "topicId";
    pub const ASSIGNMENT_ID: &str = "assignmentId";
    pub const ON_TIME: &str = "onTime";
    pub const POINTS_DELTA: &str = "pointsDelta";
    pub const NEW_BALANCE: &str = "newBalance";
    pub const NEW_TOTAL_BALANCE: &str = "newTotalBalance";
    pub const NEW_LEVEL: &str = "newLevel";
    pub const TRANSACTION_ID: &str = "transactionId";
    pub const RULE_ID: &str = "ruleId";
    pub const OLD_LEVEL: &str = "oldLevel";
    pub const TOTAL_POINTS: &str = "totalPoints";
    pub const ACHIEVEMENT_ID: &str = "achievementId";
    pub const ACHIEVEMENT_NAME: &str = "achievementName";
    pub const DESCRIPTION: &str = "description";
    pub const POINTS_REWARD: &str = "pointsReward";
    pub const RARITY: &str = "rarity";
    pub const ICON_URL: &str = "iconUrl";
}

// =============================================================================
// Bounds
// =============================================================================

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

pub const MIN_PERCENTAGE: f64 = 0.0;
pub const MAX_PERCENTAGE: f64 = 100.0;

/// Lowest level a user can hold.
pub const MIN_LEVEL: i32 = 1;

pub const MAX_USER_ID_LEN: u64 = 100;
pub const MAX_ENTITY_ID_LEN: u64 = 50;
pub const MAX_ACHIEVEMENT_NAME_LEN: u64 = 100;
pub const MAX_DESCRIPTION_LEN: u64 = 500;
pub const MAX_ICON_URL_LEN: u64 = 500;

// =============================================================================
// Event Kind
// =============================================================================

/// The closed set of event variants, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    TaskCompleted,
    TestPassed,
    CourseEnrolled,
    ForumPostCreated,
    AssignmentSubmitted,
    PointsChanged,
    LevelUp,
    AchievementUnlocked,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 8] = [
        EventKind::TaskCompleted,
        EventKind::TestPassed,
        EventKind::CourseEnrolled,
        EventKind::ForumPostCreated,
        EventKind::AssignmentSubmitted,
        EventKind::PointsChanged,
        EventKind::LevelUp,
        EventKind::AchievementUnlocked,
    ];

    /// Returns the wire discriminator for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::TaskCompleted => event_types::TASK_COMPLETED,
            EventKind::TestPassed => event_types::TEST_PASSED,
            EventKind::CourseEnrolled => event_types::COURSE_ENROLLED,
            EventKind::ForumPostCreated => event_types::FORUM_POST_CREATED,
            EventKind::AssignmentSubmitted => event_types::ASSIGNMENT_SUBMITTED,
            EventKind::PointsChanged => event_types::POINTS_CHANGED,
            EventKind::LevelUp => event_types::LEVEL_UP,
            EventKind::AchievementUnlocked => event_types::ACHIEVEMENT_UNLOCKED,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownDiscriminator(s.to_string()))
    }
}

// =============================================================================
// Rarity
// =============================================================================

/// Achievement rarity tier, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = ValidationError;

    /// Parses the exact upper-case wire value; `"epic"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|rarity| rarity.as_str() == s)
            .ok_or_else(|| ValidationError::single(fields::RARITY, Constraint::OneOf))
    }
}

impl TryFrom<&str> for Rarity {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_event_kind_unknown() {
        let err = "UNKNOWN_X".parse::<EventKind>().unwrap_err();
        assert_eq!(err, DecodeError::UnknownDiscriminator("UNKNOWN_X".to_string()));
    }

    #[test]
    fn test_all_discriminators_unique() {
        let tags: std::collections::HashSet<_> =
            EventKind::ALL.iter().map(EventKind::as_str).collect();
        assert_eq!(tags.len(), EventKind::ALL.len(), "Duplicate discriminators found!");
    }

    #[test]
    fn test_rarity_serialization() {
        assert_eq!(serde_json::to_string(&Rarity::Epic).unwrap(), "\"EPIC\"");
        assert_eq!(
            serde_json::to_string(&Rarity::Legendary).unwrap(),
            "\"LEGENDARY\""
        );
    }

    #[test]
    fn test_rarity_parse_is_case_sensitive() {
        assert_eq!("RARE".parse::<Rarity>().unwrap(), Rarity::Rare);

        let err = "mythic".parse::<Rarity>().unwrap_err();
        assert_eq!(err.field(), fields::RARITY);
        assert_eq!(err.constraint(), &Constraint::OneOf);
        assert!("epic".parse::<Rarity>().is_err());
    }

    #[test]
    fn test_rarity_tiers_are_ordered() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }
}

//! Event variant definitions.
//!
//! Each variant owns its payload plus the common [`Envelope`]. Fields are
//! private and only reachable through constructors that validate first, so
//! an invalid event never exists in memory.
//!
//! Every variant has two ways in:
//! - `new` takes every field, including identity and timestamp. Use it for
//!   replay and deserialization.
//! - `create` (and the points factories) take business fields only and stamp
//!   a fresh [`EventId`] and the current local time. Never use them to replay
//!   historical events.

use chrono::NaiveDateTime;
use gamification_id::{EventId, TransactionId};
use serde::Serialize;
use validator::Validate;

use crate::codec::FieldReader;
use crate::envelope::{Envelope, EventVariant};
use crate::error::{Constraint, DecodeError, ValidationError};
use crate::kind::{fields, EventKind, Rarity};
use crate::validation::{not_blank, validated};

// =============================================================================
// Learning Activity Events
// =============================================================================

// -----------------------------------------------------------------------------
// Task Completed
// -----------------------------------------------------------------------------

/// A user completed a task and received a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompleted {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    task_id: String,

    /// Inclusive `MIN_SCORE..=MAX_SCORE`.
    #[validate(range(min = 0, max = 100))]
    score: i32,
}

impl TaskCompleted {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        task_id: impl Into<String>,
        score: i32,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            task_id.into(),
            score,
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        task_id: impl Into<String>,
        score: i32,
    ) -> Result<Self, ValidationError> {
        Self::build(Envelope::fresh(user_id.into()), task_id.into(), score)
    }

    fn build(envelope: Envelope, task_id: String, score: i32) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                task_id,
                score,
            },
            |_, _| {},
        )
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn is_perfect_score(&self) -> bool {
        self.score == crate::kind::MAX_SCORE
    }
}

impl EventVariant for TaskCompleted {
    const KIND: EventKind = EventKind::TaskCompleted;
    const FIELDS: &'static [&'static str] = &[fields::TASK_ID, fields::SCORE];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::build(
            Envelope::decode(reader)?,
            reader.required(fields::TASK_ID)?,
            reader.required(fields::SCORE)?,
        )
        .map_err(DecodeError::from)
    }
}

// -----------------------------------------------------------------------------
// Test Passed
// -----------------------------------------------------------------------------

/// A user passed a test with the given percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestPassed {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    test_id: String,

    /// Inclusive `MIN_PERCENTAGE..=MAX_PERCENTAGE`, never NaN.
    #[validate(range(min = 0.0, max = 100.0))]
    percentage: f64,
}

impl TestPassed {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        test_id: impl Into<String>,
        percentage: f64,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            test_id.into(),
            percentage,
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        test_id: impl Into<String>,
        percentage: f64,
    ) -> Result<Self, ValidationError> {
        Self::build(Envelope::fresh(user_id.into()), test_id.into(), percentage)
    }

    fn build(
        envelope: Envelope,
        test_id: String,
        percentage: f64,
    ) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                test_id,
                percentage,
            },
            |event, violations| {
                // Range checks let NaN through.
                violations.check(
                    event.percentage.is_finite(),
                    fields::PERCENTAGE,
                    Constraint::Finite,
                );
            },
        )
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

impl EventVariant for TestPassed {
    const KIND: EventKind = EventKind::TestPassed;
    const FIELDS: &'static [&'static str] = &[fields::TEST_ID, fields::PERCENTAGE];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::build(
            Envelope::decode(reader)?,
            reader.required(fields::TEST_ID)?,
            reader.required(fields::PERCENTAGE)?,
        )
        .map_err(DecodeError::from)
    }
}

// -----------------------------------------------------------------------------
// Course Enrolled
// -----------------------------------------------------------------------------

/// A user enrolled in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrolled {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    course_id: String,
}

impl CourseEnrolled {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        course_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            course_id.into(),
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(Envelope::fresh(user_id.into()), course_id.into())
    }

    fn build(envelope: Envelope, course_id: String) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                course_id,
            },
            |_, _| {},
        )
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }
}

impl EventVariant for CourseEnrolled {
    const KIND: EventKind = EventKind::CourseEnrolled;
    const FIELDS: &'static [&'static str] = &[fields::COURSE_ID];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::build(Envelope::decode(reader)?, reader.required(fields::COURSE_ID)?)
            .map_err(DecodeError::from)
    }
}

// -----------------------------------------------------------------------------
// Forum Post Created
// -----------------------------------------------------------------------------

/// A user created a post in a forum topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForumPostCreated {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    post_id: String,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    topic_id: String,
}

impl ForumPostCreated {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        post_id: impl Into<String>,
        topic_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            post_id.into(),
            topic_id.into(),
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        post_id: impl Into<String>,
        topic_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::fresh(user_id.into()),
            post_id.into(),
            topic_id.into(),
        )
    }

    fn build(
        envelope: Envelope,
        post_id: String,
        topic_id: String,
    ) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                post_id,
                topic_id,
            },
            |_, _| {},
        )
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }
}

impl EventVariant for ForumPostCreated {
    const KIND: EventKind = EventKind::ForumPostCreated;
    const FIELDS: &'static [&'static str] = &[fields::POST_ID, fields::TOPIC_ID];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::build(
            Envelope::decode(reader)?,
            reader.required(fields::POST_ID)?,
            reader.required(fields::TOPIC_ID)?,
        )
        .map_err(DecodeError::from)
    }
}

// -----------------------------------------------------------------------------
// Assignment Submitted
// -----------------------------------------------------------------------------

/// A user submitted an assignment, on time or late.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSubmitted {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    assignment_id: String,

    on_time: bool,
}

impl AssignmentSubmitted {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        assignment_id: impl Into<String>,
        on_time: bool,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            assignment_id.into(),
            on_time,
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        assignment_id: impl Into<String>,
        on_time: bool,
    ) -> Result<Self, ValidationError> {
        Self::build(Envelope::fresh(user_id.into()), assignment_id.into(), on_time)
    }

    fn build(
        envelope: Envelope,
        assignment_id: String,
        on_time: bool,
    ) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                assignment_id,
                on_time,
            },
            |_, _| {},
        )
    }

    pub fn assignment_id(&self) -> &str {
        &self.assignment_id
    }

    pub fn on_time(&self) -> bool {
        self.on_time
    }
}

impl EventVariant for AssignmentSubmitted {
    const KIND: EventKind = EventKind::AssignmentSubmitted;
    const FIELDS: &'static [&'static str] = &[fields::ASSIGNMENT_ID, fields::ON_TIME];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::build(
            Envelope::decode(reader)?,
            reader.required(fields::ASSIGNMENT_ID)?,
            reader.required(fields::ON_TIME)?,
        )
        .map_err(DecodeError::from)
    }
}

// =============================================================================
// Progress Events
// =============================================================================

// -----------------------------------------------------------------------------
// Points Changed
// -----------------------------------------------------------------------------

/// A user's points balance changed.
///
/// A positive `points_delta` is an award, a negative one a deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PointsChanged {
    #[serde(flatten)]
    envelope: Envelope,

    points_delta: i64,

    /// Balance of the active account after the change.
    #[validate(range(min = 0))]
    new_balance: i64,

    /// Lifetime balance, including historical awards.
    #[validate(range(min = 0))]
    new_total_balance: i64,

    #[validate(range(min = 1))]
    new_level: i32,

    transaction_id: TransactionId,

    /// Gamification rule that caused the change.
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    rule_id: String,
}

impl PointsChanged {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        points_delta: i64,
        new_balance: i64,
        new_total_balance: i64,
        new_level: i32,
        transaction_id: TransactionId,
        rule_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            Some(points_delta),
            new_balance,
            new_total_balance,
            new_level,
            transaction_id,
            rule_id.into(),
        )
    }

    /// Records an award of `points`.
    pub fn award_points(
        user_id: impl Into<String>,
        points: i64,
        new_balance: i64,
        new_total_balance: i64,
        new_level: i32,
        transaction_id: TransactionId,
        rule_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::fresh(user_id.into()),
            Some(points),
            new_balance,
            new_total_balance,
            new_level,
            transaction_id,
            rule_id.into(),
        )
    }

    /// Records a deduction of `points`; the stored delta is `-points`.
    ///
    /// `i64::MIN` has no negation and is reported as a range violation on
    /// `pointsDelta`, together with any other violation.
    pub fn deduct_points(
        user_id: impl Into<String>,
        points: i64,
        new_balance: i64,
        new_total_balance: i64,
        new_level: i32,
        transaction_id: TransactionId,
        rule_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::fresh(user_id.into()),
            points.checked_neg(),
            new_balance,
            new_total_balance,
            new_level,
            transaction_id,
            rule_id.into(),
        )
    }

    /// `None` for `points_delta` marks a delta that could not be represented.
    fn build(
        envelope: Envelope,
        points_delta: Option<i64>,
        new_balance: i64,
        new_total_balance: i64,
        new_level: i32,
        transaction_id: TransactionId,
        rule_id: String,
    ) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                points_delta: points_delta.unwrap_or_default(),
                new_balance,
                new_total_balance,
                new_level,
                transaction_id,
                rule_id,
            },
            |_, violations| {
                violations.check(
                    points_delta.is_some(),
                    fields::POINTS_DELTA,
                    Constraint::Range,
                );
            },
        )
    }

    pub fn points_delta(&self) -> i64 {
        self.points_delta
    }

    pub fn new_balance(&self) -> i64 {
        self.new_balance
    }

    pub fn new_total_balance(&self) -> i64 {
        self.new_total_balance
    }

    pub fn new_level(&self) -> i32 {
        self.new_level
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn is_award(&self) -> bool {
        self.points_delta > 0
    }

    pub fn is_deduction(&self) -> bool {
        self.points_delta < 0
    }

    pub fn absolute_delta(&self) -> u64 {
        self.points_delta.unsigned_abs()
    }
}

impl EventVariant for PointsChanged {
    const KIND: EventKind = EventKind::PointsChanged;
    const FIELDS: &'static [&'static str] = &[
        fields::POINTS_DELTA,
        fields::NEW_BALANCE,
        fields::NEW_TOTAL_BALANCE,
        fields::NEW_LEVEL,
        fields::TRANSACTION_ID,
        fields::RULE_ID,
    ];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        let envelope = Envelope::decode(reader)?;
        Self::new(
            envelope.event_id(),
            envelope.user_id(),
            envelope.occurred_at(),
            reader.required(fields::POINTS_DELTA)?,
            reader.required(fields::NEW_BALANCE)?,
            reader.required(fields::NEW_TOTAL_BALANCE)?,
            reader.required(fields::NEW_LEVEL)?,
            reader.required(fields::TRANSACTION_ID)?,
            reader.required::<String>(fields::RULE_ID)?,
        )
        .map_err(DecodeError::from)
    }
}

// -----------------------------------------------------------------------------
// Level Up
// -----------------------------------------------------------------------------

/// A user reached a higher level.
///
/// `new_level > old_level` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LevelUp {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(range(min = 1))]
    old_level: i32,

    #[validate(range(min = 1))]
    new_level: i32,

    #[validate(range(min = 0))]
    total_points: i64,
}

impl LevelUp {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        old_level: i32,
        new_level: i32,
        total_points: i64,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            old_level,
            new_level,
            total_points,
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        old_level: i32,
        new_level: i32,
        total_points: i64,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::fresh(user_id.into()),
            old_level,
            new_level,
            total_points,
        )
    }

    fn build(
        envelope: Envelope,
        old_level: i32,
        new_level: i32,
        total_points: i64,
    ) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                old_level,
                new_level,
                total_points,
            },
            |event, violations| {
                violations.check(
                    event.new_level > event.old_level,
                    fields::NEW_LEVEL,
                    Constraint::LevelOrder,
                );
            },
        )
    }

    pub fn old_level(&self) -> i32 {
        self.old_level
    }

    pub fn new_level(&self) -> i32 {
        self.new_level
    }

    pub fn total_points(&self) -> i64 {
        self.total_points
    }

    /// Number of levels gained; always at least 1.
    pub fn level_difference(&self) -> i32 {
        self.new_level - self.old_level
    }
}

impl EventVariant for LevelUp {
    const KIND: EventKind = EventKind::LevelUp;
    const FIELDS: &'static [&'static str] =
        &[fields::OLD_LEVEL, fields::NEW_LEVEL, fields::TOTAL_POINTS];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::build(
            Envelope::decode(reader)?,
            reader.required(fields::OLD_LEVEL)?,
            reader.required(fields::NEW_LEVEL)?,
            reader.required(fields::TOTAL_POINTS)?,
        )
        .map_err(DecodeError::from)
    }
}

// -----------------------------------------------------------------------------
// Achievement Unlocked
// -----------------------------------------------------------------------------

/// A user unlocked an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AchievementUnlocked {
    #[serde(flatten)]
    envelope: Envelope,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    achievement_id: String,

    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    achievement_name: String,

    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    description: String,

    #[validate(range(min = 0))]
    points_reward: i64,

    rarity: Rarity,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    icon_url: Option<String>,
}

/// Business fields of an achievement, shared by `new` and `create`.
#[derive(Debug, Clone)]
pub struct AchievementDetails {
    pub achievement_id: String,
    pub achievement_name: String,
    pub description: String,
    pub points_reward: i64,
    pub rarity: Rarity,
    pub icon_url: Option<String>,
}

impl AchievementUnlocked {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        details: AchievementDetails,
    ) -> Result<Self, ValidationError> {
        Self::build(
            Envelope::new(event_id, user_id.into(), occurred_at),
            details,
        )
    }

    pub fn create(
        user_id: impl Into<String>,
        details: AchievementDetails,
    ) -> Result<Self, ValidationError> {
        Self::build(Envelope::fresh(user_id.into()), details)
    }

    fn build(envelope: Envelope, details: AchievementDetails) -> Result<Self, ValidationError> {
        validated(
            Self {
                envelope,
                achievement_id: details.achievement_id,
                achievement_name: details.achievement_name,
                description: details.description,
                points_reward: details.points_reward,
                rarity: details.rarity,
                icon_url: details.icon_url,
            },
            |_, _| {},
        )
    }

    pub fn achievement_id(&self) -> &str {
        &self.achievement_id
    }

    pub fn achievement_name(&self) -> &str {
        &self.achievement_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn points_reward(&self) -> i64 {
        self.points_reward
    }

    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }

    pub fn is_rare_or_above(&self) -> bool {
        self.rarity >= Rarity::Rare
    }

    pub fn is_epic_or_legendary(&self) -> bool {
        self.rarity >= Rarity::Epic
    }

    pub fn has_points_reward(&self) -> bool {
        self.points_reward > 0
    }

    /// Message shown to the user when the achievement is unlocked.
    pub fn notification_message(&self) -> String {
        format!(
            "Congratulations! You unlocked the achievement \"{}\" ({}). {} points awarded.",
            self.achievement_name, self.rarity, self.points_reward
        )
    }
}

impl EventVariant for AchievementUnlocked {
    const KIND: EventKind = EventKind::AchievementUnlocked;
    const FIELDS: &'static [&'static str] = &[
        fields::ACHIEVEMENT_ID,
        fields::ACHIEVEMENT_NAME,
        fields::DESCRIPTION,
        fields::POINTS_REWARD,
        fields::RARITY,
        fields::ICON_URL,
    ];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn decode(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        let envelope = Envelope::decode(reader)?;
        let rarity: String = reader.required(fields::RARITY)?;
        let mut details = AchievementDetails {
            achievement_id: reader.required(fields::ACHIEVEMENT_ID)?,
            achievement_name: reader.required(fields::ACHIEVEMENT_NAME)?,
            description: reader.required(fields::DESCRIPTION)?,
            points_reward: reader.required(fields::POINTS_REWARD)?,
            rarity: Rarity::Common,
            icon_url: reader.optional(fields::ICON_URL)?,
        };

        match rarity.parse::<Rarity>() {
            Ok(rarity) => {
                details.rarity = rarity;
                Self::build(envelope, details).map_err(DecodeError::from)
            }
            // Report the other violations alongside the rarity.
            Err(rarity_err) => Err(match Self::build(envelope, details) {
                Ok(_) => rarity_err,
                Err(other) => rarity_err.merge(other),
            }
            .into()),
        }
    }
}

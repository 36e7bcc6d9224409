//! Property tests: every valid event survives encode then decode unchanged.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use gamification_events::{
    decode, decode_slice, decode_str, encode, encode_to_string, encode_to_vec,
    AchievementDetails, AchievementUnlocked, AssignmentSubmitted, CourseEnrolled, EventId,
    ForumPostCreated, GamificationEvent, LevelUp, PointsChanged, Rarity, TaskCompleted,
    TestPassed, TransactionId,
};
use gamification_id::Uuid;
use proptest::prelude::*;
use proptest::sample::select;

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

prop_compose! {
    fn event_id()(n in any::<u128>()) -> EventId {
        EventId::from_uuid(Uuid::from_u128(n))
    }
}

prop_compose! {
    fn transaction_id()(n in any::<u128>()) -> TransactionId {
        TransactionId::from_uuid(Uuid::from_u128(n))
    }
}

prop_compose! {
    /// A timestamp up to roughly three years before the base, with
    /// millisecond precision.
    fn past_time()(secs in 0i64..100_000_000, millis in 0i64..1000) -> NaiveDateTime {
        base_time() - TimeDelta::seconds(secs) - TimeDelta::milliseconds(millis)
    }
}

fn entity_id() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,50}"
}

fn user_id() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,100}"
}

prop_compose! {
    fn task_completed()(
        id in event_id(), user in user_id(), at in past_time(),
        task in entity_id(), score in 0i32..=100,
    ) -> GamificationEvent {
        TaskCompleted::new(id, user, at, task, score).unwrap().into()
    }
}

prop_compose! {
    fn test_passed()(
        id in event_id(), user in user_id(), at in past_time(),
        test in entity_id(), percentage in 0.0f64..=100.0,
    ) -> GamificationEvent {
        TestPassed::new(id, user, at, test, percentage).unwrap().into()
    }
}

prop_compose! {
    fn course_enrolled()(
        id in event_id(), user in user_id(), at in past_time(), course in entity_id(),
    ) -> GamificationEvent {
        CourseEnrolled::new(id, user, at, course).unwrap().into()
    }
}

prop_compose! {
    fn forum_post_created()(
        id in event_id(), user in user_id(), at in past_time(),
        post in entity_id(), topic in entity_id(),
    ) -> GamificationEvent {
        ForumPostCreated::new(id, user, at, post, topic).unwrap().into()
    }
}

prop_compose! {
    fn assignment_submitted()(
        id in event_id(), user in user_id(), at in past_time(),
        assignment in entity_id(), on_time in any::<bool>(),
    ) -> GamificationEvent {
        AssignmentSubmitted::new(id, user, at, assignment, on_time).unwrap().into()
    }
}

prop_compose! {
    fn points_changed()(
        id in event_id(), user in user_id(), at in past_time(),
        delta in any::<i64>(), balance in 0..=i64::MAX, total in 0..=i64::MAX,
        level in 1..=i32::MAX,
        transaction in transaction_id(), rule in entity_id(),
    ) -> GamificationEvent {
        PointsChanged::new(id, user, at, delta, balance, total, level, transaction, rule)
            .unwrap()
            .into()
    }
}

prop_compose! {
    fn level_up()(
        id in event_id(), user in user_id(), at in past_time(),
        old in 1i32..10_000, step in 1i32..100, points in 0..=i64::MAX,
    ) -> GamificationEvent {
        LevelUp::new(id, user, at, old, old + step, points).unwrap().into()
    }
}

prop_compose! {
    fn achievement_unlocked()(
        id in event_id(), user in user_id(), at in past_time(),
        achievement_id in entity_id(),
        achievement_name in "[A-Za-z][A-Za-z0-9 ]{0,99}",
        description in "[A-Za-z][A-Za-z0-9 .,!]{0,499}",
        points_reward in 0i64..1_000_000,
        rarity in select(Rarity::ALL.to_vec()),
        icon_url in proptest::option::of("https://cdn\\.example\\.com/[a-z]{1,40}\\.png"),
    ) -> GamificationEvent {
        let details = AchievementDetails {
            achievement_id,
            achievement_name,
            description,
            points_reward,
            rarity,
            icon_url,
        };
        AchievementUnlocked::new(id, user, at, details).unwrap().into()
    }
}

fn any_event() -> impl Strategy<Value = GamificationEvent> {
    prop_oneof![
        task_completed(),
        test_passed(),
        course_enrolled(),
        forum_post_created(),
        assignment_submitted(),
        points_changed(),
        level_up(),
        achievement_unlocked(),
    ]
}

proptest! {
    #[test]
    fn decode_inverts_encode(event in any_event()) {
        let value = encode(&event).unwrap();
        prop_assert_eq!(value["type"].as_str(), Some(event.event_type()));
        prop_assert_eq!(decode(&value).unwrap(), event);
    }

    #[test]
    fn text_and_bytes_roundtrip(event in any_event()) {
        let text = encode_to_string(&event).unwrap();
        prop_assert_eq!(decode_str(&text).unwrap(), event.clone());

        let bytes = encode_to_vec(&event).unwrap();
        prop_assert_eq!(decode_slice(&bytes).unwrap(), event);
    }

    #[test]
    fn serde_roundtrip(event in any_event()) {
        let text = serde_json::to_string(&event).unwrap();
        let back: GamificationEvent = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back, event);
    }

    #[test]
    fn percentage_is_exact_after_roundtrip(percentage in 0.0f64..=100.0) {
        let event: GamificationEvent = TestPassed::new(
            EventId::new(),
            "user-1",
            base_time(),
            "test-1",
            percentage,
        )
        .unwrap()
        .into();

        let decoded = decode(&encode(&event).unwrap()).unwrap();
        let GamificationEvent::TestPassed(back) = decoded else {
            panic!("expected TestPassed");
        };
        prop_assert_eq!(back.percentage().to_bits(), percentage.to_bits());
    }
}

//! Tests for presence-core: world context invariants, store mutation, errors

use presence_core::*;
use proptest::prelude::*;

// ===========================================================================
// Hour-derived flags
// ===========================================================================

#[test]
fn hour_flags_match_documented_windows() {
    let night: Vec<u8> = (0..24).filter(|h| is_night_hour(*h)).collect();
    assert_eq!(night, vec![0, 1, 2, 3, 4, 5, 20, 21, 22, 23]);

    let late: Vec<u8> = (0..24).filter(|h| is_late_night_hour(*h)).collect();
    assert_eq!(late, vec![0, 1, 2, 3, 23]);

    let dawn: Vec<u8> = (0..24).filter(|h| is_dawn_hour(*h)).collect();
    assert_eq!(dawn, vec![5, 6]);
}

#[test]
fn late_night_is_subset_of_night() {
    for hour in 0..24u8 {
        assert!(
            !is_late_night_hour(hour) || is_night_hour(hour),
            "hour {hour} is late night but not night"
        );
    }
}

#[test]
fn store_flags_use_the_update_timestamp() {
    let clock = ManualClock::starting_at_hour(22);
    let mut store = WorldStore::new(clock.now());
    assert!(store.get().is_night);
    assert!(!store.get().is_late_night);

    clock.advance(HOUR_MS);
    store.update(&WorldUpdate::default(), clock.now());
    assert_eq!(store.get().hour, 23);
    assert!(store.get().is_late_night);
}

#[test]
fn default_world_is_a_quiet_midday() {
    let world = WorldContext::default();
    assert_eq!(world.hour, 12);
    assert!(!world.is_night && !world.is_late_night && !world.is_dawn);
    assert_eq!(world.attention, 5.0);
    assert_eq!(world.time_of_day(), TimeOfDay::Day);
}

// ===========================================================================
// Clamp invariant
// ===========================================================================

fn arb_update() -> impl Strategy<Value = WorldUpdate> {
    (
        proptest::option::of(-50.0f64..50.0),
        proptest::option::of(-50.0f64..50.0),
        proptest::option::of(-50.0f64..50.0),
        proptest::option::of(-50.0f64..50.0),
        proptest::option::of(-50.0f64..50.0),
    )
        .prop_map(|(friction, attention, fatigue, restlessness, velocity)| WorldUpdate {
            friction,
            attention,
            fatigue,
            mouse_restlessness: restlessness,
            scroll_velocity: velocity,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn signals_stay_in_range(
        updates in proptest::collection::vec(arb_update(), 1..40),
        bumps in proptest::collection::vec(-20.0f64..20.0, 0..40),
        hour in 0u8..24,
    ) {
        let mut store = WorldStore::new(Timestamp::new(0, hour));
        for update in &updates {
            store.update(update, Timestamp::new(0, hour));
            prop_assert!(store.get().signals_in_range());
        }
        for bump in &bumps {
            store.add_friction(*bump);
            store.increment_friction();
            store.decrement_friction();
            prop_assert!(store.get().signals_in_range());
        }
    }
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_messages_are_descriptive() {
    let err = Error::trace(7, "unknown input kind");
    assert_eq!(err.to_string(), "trace error at line 7: unknown input kind");

    let err = Error::config("sensitivity must be positive");
    assert_eq!(err.to_string(), "config error: sensitivity must be positive");

    let err: Error = serde_json::from_str::<WorldUpdate>("{").unwrap_err().into();
    assert!(matches!(err, Error::JsonError(_)));
}

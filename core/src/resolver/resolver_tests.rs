//! Tests for SessionResolver override handling

use bynoral_types::SessionMode;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

use super::{ModeOverride, ResolverError, ResolverState, SessionResolver, WakeReason, active_mode};
use crate::clock::ManualClock;
use crate::schedule::DaySchedule;
use crate::store::{MemoryStore, OverrideStore};

fn local(hour: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 1, 15, hour, min, 0).unwrap()
}

fn resolver_at(hour: u32, min: u32) -> (SessionResolver<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(local(hour, min));
    let resolver = SessionResolver::new(DaySchedule::default(), store.clone(), clock.clone());
    (resolver, store, clock)
}

#[test]
fn test_automatic_without_override() {
    let (mut resolver, _, _) = resolver_at(10, 59);
    assert_eq!(resolver.active_mode(), SessionMode::Morning);
    assert_eq!(resolver.state(), ResolverState::Automatic);
}

#[test]
fn test_override_until_expiry_then_purged() {
    let (mut resolver, mut store, _) = resolver_at(9, 0);
    let now = local(9, 0);
    let value = ModeOverride {
        mode: SessionMode::Midday,
        expires_at: (now + TimeDelta::seconds(1)).with_timezone(&Utc),
    };
    store.write(&value).unwrap();

    assert_eq!(resolver.active_mode_at(&now), SessionMode::Midday);
    assert!(!store.is_empty());

    let later = now + TimeDelta::seconds(2);
    assert_eq!(resolver.active_mode_at(&later), SessionMode::Morning);
    assert!(store.is_empty(), "stale override should be purged");
}

#[test]
fn test_expiry_instant_is_automatic() {
    let (mut resolver, mut store, _) = resolver_at(9, 0);
    let value = ModeOverride::new(SessionMode::AfterHours, &local(9, 0), TimeDelta::minutes(30)).unwrap();
    store.write(&value).unwrap();
    assert_eq!(resolver.active_mode_at(&local(9, 30)), SessionMode::Morning);
}

#[test]
fn test_twelve_hour_override_example() {
    let (mut resolver, store, clock) = resolver_at(9, 0);
    let value = resolver
        .set_override(SessionMode::AfterHours, TimeDelta::hours(12))
        .unwrap();
    assert_eq!(value.expires_at_local(), local(21, 0));
    assert_eq!(resolver.active_mode(), SessionMode::AfterHours);
    assert!(resolver.state().is_overridden());

    clock.set(local(21, 1));
    assert_eq!(resolver.active_mode(), SessionMode::AfterHours);
    assert_eq!(resolver.state(), ResolverState::Automatic);
    assert!(store.is_empty());
}

#[test]
fn test_rejects_duration_past_representable_time() {
    let (mut resolver, store, _) = resolver_at(9, 0);
    let result = resolver.set_override(SessionMode::Midday, TimeDelta::minutes(1_000_000_000_000));
    assert!(matches!(result, Err(ResolverError::DurationTooLong { .. })));
    assert!(store.is_empty());
    assert_eq!(resolver.active_mode(), SessionMode::Morning);
}

#[test]
fn test_override_beats_schedule_across_boundaries() {
    let (mut resolver, _, clock) = resolver_at(10, 0);
    resolver
        .set_override(SessionMode::Midday, TimeDelta::hours(3))
        .unwrap();
    for minute in [0, 59, 120, 179] {
        clock.set(local(10, 0) + TimeDelta::minutes(minute));
        assert_eq!(resolver.active_mode(), SessionMode::Midday);
    }
    clock.set(local(13, 0));
    assert_eq!(resolver.active_mode(), SessionMode::Midday, "schedule says midday anyway");
    clock.set(local(10, 0));
    resolver
        .set_override(SessionMode::AfterHours, TimeDelta::hours(1))
        .unwrap();
    clock.set(local(11, 0));
    assert_eq!(resolver.active_mode(), SessionMode::Morning);
}

#[test]
fn test_set_then_clear_matches_never_set() {
    let (mut untouched, _, _) = resolver_at(14, 0);
    let (mut resolver, store, _) = resolver_at(14, 0);

    resolver
        .set_override(SessionMode::Morning, TimeDelta::hours(2))
        .unwrap();
    resolver.clear_override().unwrap();

    assert!(store.is_empty());
    for hour in [14, 15, 18, 23] {
        let now = local(hour, 0);
        assert_eq!(resolver.active_mode_at(&now), untouched.active_mode_at(&now));
        assert_eq!(resolver.state_at(&now), untouched.state_at(&now));
        assert_eq!(resolver.next_wakeup_at(&now), untouched.next_wakeup_at(&now));
    }
}

#[test]
fn test_clear_without_override_is_ok() {
    let (mut resolver, _, _) = resolver_at(8, 0);
    resolver.clear_override().unwrap();
    assert_eq!(resolver.state(), ResolverState::Automatic);
}

#[test]
fn test_active_mode_is_idempotent() {
    let schedule = DaySchedule::default();
    let value = ModeOverride::new(SessionMode::Midday, &local(8, 0), TimeDelta::hours(1)).unwrap();
    for now in [local(8, 30), local(9, 30)] {
        let first = active_mode(&schedule, &now, Some(&value));
        let second = active_mode(&schedule, &now, Some(&value));
        assert_eq!(first, second);
    }
    assert_eq!(active_mode(&schedule, &local(8, 30), Some(&value)), SessionMode::Midday);
    assert_eq!(active_mode(&schedule, &local(9, 30), Some(&value)), SessionMode::Morning);
    assert_eq!(active_mode(&schedule, &local(8, 30), None), SessionMode::Morning);
}

#[test]
fn test_malformed_slot_is_purged_silently() {
    let store = MemoryStore::with_raw("mode = \"brunch\"");
    let clock = ManualClock::new(local(12, 0));
    let mut resolver = SessionResolver::new(DaySchedule::default(), store.clone(), clock);

    assert_eq!(resolver.active_mode(), SessionMode::Midday);
    assert!(store.is_empty());
}

#[test]
fn test_cold_start_picks_up_persisted_override() {
    let mut store = MemoryStore::new();
    store
        .write(
            &ModeOverride::new(SessionMode::Morning, &local(18, 0), TimeDelta::hours(2)).unwrap(),
        )
        .unwrap();

    let clock = ManualClock::new(local(18, 30));
    let mut resolver = SessionResolver::new(DaySchedule::default(), store, clock);
    assert!(resolver.state().is_overridden());
    assert_eq!(resolver.active_mode(), SessionMode::Morning);
}

#[test]
fn test_wakeup_follows_state() {
    let (mut resolver, _, _) = resolver_at(10, 59);
    let wakeup = resolver.next_wakeup_at(&local(10, 59));
    assert_eq!(wakeup.reason, WakeReason::Boundary);
    assert_eq!(wakeup.at, local(11, 30));

    resolver
        .set_override(SessionMode::AfterHours, TimeDelta::minutes(45))
        .unwrap();
    let wakeup = resolver.next_wakeup_at(&local(10, 59));
    assert_eq!(wakeup.reason, WakeReason::OverrideExpiry);
    assert_eq!(wakeup.at, local(11, 44));
}

#[test]
fn test_rejects_non_positive_duration() {
    let (mut resolver, store, _) = resolver_at(9, 0);
    for duration in [TimeDelta::zero(), TimeDelta::minutes(-5)] {
        assert!(matches!(
            resolver.set_override(SessionMode::Midday, duration),
            Err(ResolverError::InvalidDuration { .. })
        ));
    }
    assert!(store.is_empty());
}

#[test]
fn test_new_override_replaces_old() {
    let (mut resolver, store, _) = resolver_at(9, 0);
    resolver
        .set_override(SessionMode::Midday, TimeDelta::hours(1))
        .unwrap();
    resolver
        .set_override(SessionMode::AfterHours, TimeDelta::hours(2))
        .unwrap();
    assert_eq!(resolver.active_mode(), SessionMode::AfterHours);
    let stored = store.read().unwrap().unwrap();
    assert_eq!(stored.expires_at_local(), local(11, 0));
}

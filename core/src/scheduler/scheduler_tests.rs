//! Tests for the single-timer mode scheduler
//!
//! All tests run on paused tokio time with a `ShiftedClock`, so sleeping in
//! the test moves the wall clock the scheduler sees.

use std::time::Duration;

use bynoral_types::SessionMode;
use chrono::{DateTime, Local, TimeDelta, TimeZone};

use super::{ModeHandle, ModeScheduler, SchedulerError};
use crate::clock::ShiftedClock;
use crate::resolver::{ModeOverride, ResolverError, ResolverState, SessionResolver, WakeReason};
use crate::schedule::DaySchedule;
use crate::store::{MemoryStore, OverrideStore};

fn local(hour: u32, min: u32, sec: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 1, 15, hour, min, sec).unwrap()
}

fn start_at(origin: DateTime<Local>) -> (ModeHandle, tokio::task::JoinHandle<()>, MemoryStore) {
    let store = MemoryStore::new();
    let resolver = SessionResolver::new(
        DaySchedule::default(),
        store.clone(),
        ShiftedClock::starting_at(origin),
    );
    let (handle, task) = ModeScheduler::spawn(resolver);
    (handle, task, store)
}

#[tokio::test(start_paused = true)]
async fn test_boundary_timer_publishes_next_mode() {
    let (handle, _task, _) = start_at(local(11, 29, 0));
    let mut rx = handle.subscribe();

    let initial = *rx.borrow_and_update();
    assert_eq!(initial.mode, SessionMode::Morning);
    assert_eq!(initial.next_wakeup.reason, WakeReason::Boundary);
    assert_eq!(initial.next_wakeup.at, local(11, 30, 0));

    rx.changed().await.unwrap();
    let after = *rx.borrow_and_update();
    assert_eq!(after.mode, SessionMode::Midday);
    assert_eq!(after.next_wakeup.at, local(17, 0, 0));
}

#[tokio::test(start_paused = true)]
async fn test_override_arms_expiry_then_reverts() {
    let (handle, _task, store) = start_at(local(10, 0, 0));

    let value = handle
        .set_override(SessionMode::AfterHours, TimeDelta::minutes(30))
        .await
        .unwrap();
    assert_eq!(value.expires_at_local(), local(10, 30, 0));

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.mode, SessionMode::AfterHours);
    assert_eq!(snapshot.next_wakeup.reason, WakeReason::OverrideExpiry);

    let mut rx = handle.subscribe();
    rx.borrow_and_update();
    rx.changed().await.unwrap();

    let reverted = *rx.borrow();
    assert_eq!(reverted.mode, SessionMode::Morning);
    assert_eq!(reverted.state, ResolverState::Automatic);
    assert_eq!(reverted.next_wakeup.at, local(11, 30, 0));
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_clear_rearms_boundary_timer() {
    let (handle, _task, store) = start_at(local(18, 0, 0));
    handle
        .set_override(SessionMode::Morning, TimeDelta::hours(12))
        .await
        .unwrap();
    assert_eq!(handle.snapshot().mode, SessionMode::Morning);

    handle.clear_override().await.unwrap();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.mode, SessionMode::AfterHours);
    assert_eq!(snapshot.next_wakeup.reason, WakeReason::Boundary);
    assert_eq!(
        snapshot.next_wakeup.at,
        Local.with_ymd_and_hms(2025, 1, 16, 7, 0, 0).unwrap()
    );
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_nothing_published_between_boundaries() {
    let (handle, _task, _) = start_at(local(12, 0, 0));
    let mut rx = handle.subscribe();
    rx.borrow_and_update();

    tokio::time::sleep(Duration::from_secs(4 * 3600)).await;
    assert!(!rx.has_changed().unwrap());

    tokio::time::sleep(Duration::from_secs(3600 + 1)).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().mode, SessionMode::AfterHours);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_duration_is_reported() {
    let (handle, _task, _) = start_at(local(9, 0, 0));
    let err = handle
        .set_override(SessionMode::Midday, TimeDelta::zero())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Resolver(ResolverError::InvalidDuration { .. })
    ));
    assert_eq!(handle.snapshot().state, ResolverState::Automatic);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_duration_keeps_scheduler_running() {
    let (handle, _task, _) = start_at(local(9, 0, 0));
    let err = handle
        .set_override(SessionMode::Midday, TimeDelta::minutes(1_000_000_000_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Resolver(ResolverError::DurationTooLong { .. })
    ));

    let value = handle
        .set_override(SessionMode::AfterHours, TimeDelta::minutes(30))
        .await
        .unwrap();
    assert_eq!(value.mode, SessionMode::AfterHours);
    handle.clear_override().await.unwrap();
    assert_eq!(handle.snapshot().state, ResolverState::Automatic);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_task() {
    let (handle, task, _) = start_at(local(9, 0, 0));
    handle.shutdown().await;
    task.await.unwrap();

    assert!(matches!(
        handle.clear_override().await,
        Err(SchedulerError::Stopped)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cold_start_with_persisted_override() {
    let mut store = MemoryStore::new();
    store
        .write(&ModeOverride::new(
            SessionMode::Midday,
            &local(7, 0, 0),
            TimeDelta::hours(2),
        )
        .unwrap())
        .unwrap();

    let resolver = SessionResolver::new(
        DaySchedule::default(),
        store,
        ShiftedClock::starting_at(local(8, 0, 0)),
    );
    let (handle, _task) = ModeScheduler::spawn(resolver);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.mode, SessionMode::Midday);
    assert_eq!(snapshot.next_wakeup.at, local(9, 0, 0));
}

use bynoral_core::schedule::format_minute_of_day;
use bynoral_core::{
    AppConfigExt, Clock, ModeSnapshot, ResolverState, SessionMode, WakeReason, format_elapsed,
};
use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone};
use std::io::Write;

use crate::CliContext;

pub async fn status(ctx: &CliContext) {
    let snapshot = ctx.modes.snapshot();
    let now = ctx.clock.now();
    println!("Mode:    {}", snapshot.mode);
    println!("Source:  {}", describe_state(&snapshot, &now));
    println!("Next:    {}", describe_wakeup(&snapshot));

    let player = ctx.player.lock().await;
    let playing = if player.is_playing() {
        "playing"
    } else {
        "paused"
    };
    println!("Audio:   {} ({})", playing, format_elapsed(player.elapsed()));
}

pub async fn play(ctx: &CliContext) {
    let mut player = ctx.player.lock().await;
    match player.play() {
        Ok(()) => println!("Playing {}", ctx.modes.snapshot().mode),
        Err(e) => println!("{} ({e})", e.user_hint()),
    }
}

pub async fn pause(ctx: &CliContext) {
    ctx.player.lock().await.pause();
    println!("Paused");
}

pub async fn toggle(ctx: &CliContext) {
    let mut player = ctx.player.lock().await;
    match player.toggle() {
        Ok(true) => println!("Playing {}", ctx.modes.snapshot().mode),
        Ok(false) => println!("Paused"),
        Err(e) => println!("{} ({e})", e.user_hint()),
    }
}

/// Change the output level now and keep it in the configuration.
pub async fn set_volume(ctx: &CliContext, percent: u8) {
    let percent = ctx.player.lock().await.set_volume(percent);
    let mut config = ctx.config.write().await;
    config.volume = percent;
    match config.save() {
        Ok(()) => println!("Volume {percent}"),
        Err(e) => println!("Volume {percent} (not saved: {e})"),
    }
}

/// Force a mode for `minutes`, or the configured override length.
pub async fn set_mode(ctx: &CliContext, mode: &str, minutes: Option<i64>) {
    let mode: SessionMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    let duration = match minutes.map(override_minutes) {
        Some(Ok(duration)) => duration,
        Some(Err(e)) => {
            println!("{e}");
            return;
        }
        None => ctx.config.read().await.override_duration(),
    };

    match ctx.modes.set_override(mode, duration).await {
        Ok(o) => println!(
            "{} until {}",
            o.mode,
            o.expires_at_local().format("%a %H:%M")
        ),
        Err(e) => println!("Could not set mode: {e}"),
    }
}

pub async fn auto(ctx: &CliContext) {
    match ctx.modes.clear_override().await {
        Ok(()) => println!("Following schedule: {}", ctx.modes.snapshot().mode),
        Err(e) => println!("Could not clear override: {e}"),
    }
}

pub async fn schedule(ctx: &CliContext) {
    let schedule = ctx.config.read().await.day_schedule();
    let current = ctx.modes.snapshot().mode;
    for window in schedule.windows() {
        let marker = if window.mode == current { "*" } else { " " };
        println!(
            "{} {} - {}  {}",
            marker,
            format_minute_of_day(window.start),
            format_minute_of_day(window.end),
            window.mode
        );
    }
}

pub async fn show_config(ctx: &CliContext) {
    let config = ctx.config.read().await;
    match bynoral_core::AppConfig::config_path() {
        Ok(path) => println!("# {}", path.display()),
        Err(e) => println!("# config path unknown: {e}"),
    }
    match toml::to_string_pretty(&*config) {
        Ok(text) => println!("{text}"),
        Err(e) => println!("Could not render configuration: {e}"),
    }
}

pub fn exit() {
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout, "quitting...");
    let _ = stdout.flush();
}

fn describe_state(snapshot: &ModeSnapshot, now: &DateTime<Local>) -> String {
    match snapshot.state {
        ResolverState::Automatic => "schedule".to_string(),
        ResolverState::Overridden(o) => {
            let remaining = o.remaining(now);
            format!(
                "override, {}h{:02}m left",
                remaining.num_hours(),
                remaining.num_minutes() % 60
            )
        }
    }
}

fn describe_wakeup(snapshot: &ModeSnapshot) -> String {
    let what = match snapshot.next_wakeup.reason {
        WakeReason::Boundary => "window change",
        WakeReason::OverrideExpiry => "override ends",
    };
    format!("{} at {}", what, snapshot.next_wakeup.at.format("%a %H:%M"))
}

fn override_minutes(minutes: i64) -> Result<TimeDelta, String> {
    TimeDelta::try_minutes(minutes).ok_or_else(|| format!("{minutes} minutes is out of range"))
}

/// `HH:MM` as today's local time, for starting the clock somewhere else.
pub fn start_time_today(value: &str) -> Result<DateTime<Local>, String> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| format!("invalid time '{value}': {e}"))?;
    let naive = Local::now().date_naive().and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{value} does not exist today"))
}

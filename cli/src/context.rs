use std::sync::Arc;

use bynoral_core::{
    AppConfig, AppConfigExt, BackgroundTasks, Clock, ModeHandle, ModeScheduler, OverrideStore,
    PlaybackSurface, Player, SessionResolver,
};
use tokio::sync::{Mutex, RwLock};

pub type SharedPlayer = Arc<Mutex<Player<Box<dyn PlaybackSurface>>>>;

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the core types.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    pub modes: ModeHandle,
    pub player: SharedPlayer,
    pub clock: Arc<dyn Clock>,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
}

impl CliContext {
    /// Start the mode scheduler and hook the player up to it.
    ///
    /// Must be called from inside a tokio runtime.
    pub async fn start(
        config: AppConfig,
        store: Box<dyn OverrideStore>,
        clock: Arc<dyn Clock>,
        surface: Box<dyn PlaybackSurface>,
    ) -> Self {
        let resolver = SessionResolver::new(config.day_schedule(), store, Arc::clone(&clock));
        let (modes, scheduler_task) = ModeScheduler::spawn(resolver);

        let mut player = Player::new(surface, config.track_catalog());
        if let Err(e) = player.follow_mode(modes.snapshot().mode) {
            tracing::warn!(error = %e, "Failed to load initial track");
        }
        let player = Arc::new(Mutex::new(player));

        let follower_task = tokio::spawn(follow_modes(modes.clone(), Arc::clone(&player)));

        let tasks = BackgroundTasks {
            scheduler: Some(scheduler_task),
            mode_follower: Some(follower_task),
        };

        Self {
            config: Arc::new(RwLock::new(config)),
            modes,
            player,
            clock,
            tasks: Arc::new(Mutex::new(tasks)),
        }
    }

    pub async fn shutdown(&self) {
        self.modes.shutdown().await;
        self.player.lock().await.pause();
        self.tasks.lock().await.abort_all();
    }
}

/// Load the new track whenever the published mode changes.
async fn follow_modes(modes: ModeHandle, player: SharedPlayer) {
    let mut rx = modes.subscribe();
    while rx.changed().await.is_ok() {
        let mode = rx.borrow_and_update().mode;
        if let Err(e) = player.lock().await.follow_mode(mode) {
            println!("{} ({e})", e.user_hint());
        }
    }
}

pub mod clock;
pub mod context;
pub mod playback;
pub mod resolver;
pub mod schedule;
pub mod scheduler;
pub mod store;

// Re-exports for convenience
pub use bynoral_types::SessionMode;
pub use clock::{Clock, ManualClock, ShiftedClock, SystemClock};
pub use context::{AppConfig, AppConfigExt, BackgroundTasks, ConfigError};
pub use playback::{
    HeadlessSurface, PlaybackError, PlaybackSurface, Player, TrackCatalog, format_elapsed,
};
pub use resolver::{
    ModeOverride, ModeSnapshot, ResolverError, ResolverState, SessionResolver, WakeReason,
    Wakeup, active_mode,
};
pub use schedule::{DaySchedule, ScheduleError};
pub use scheduler::{ModeHandle, ModeScheduler, SchedulerError};
pub use store::{FileStore, MemoryStore, OverrideStore, StoreError};

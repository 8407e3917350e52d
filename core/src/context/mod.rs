mod background_tasks;
mod config;
mod error;

pub use background_tasks::BackgroundTasks;
pub use config::{AppConfig, AppConfigExt, TrackTable, WindowConfig};
pub use error::ConfigError;

use tokio::task::JoinHandle;

#[derive(Default)]
pub struct BackgroundTasks {
    /// The mode scheduler loop
    pub scheduler: Option<JoinHandle<()>>,
    /// Moves the player onto each newly published mode
    pub mode_follower: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn abort_all(&mut self) {
        if let Some(handle) = self.mode_follower.take() {
            handle.abort();
        }
        if let Some(handle) = self.scheduler.take() {
            handle.abort();
        }
    }
}

use notify_rust::{Notification, Timeout};

use crate::error::AppResult;

const APP_NAME: &str = "shotput";
const TIMEOUT_MS: u32 = 5_000;

#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Best effort: a missing notification daemon must not fail the run.
    pub fn notify(&self, summary: &str, body: &str) -> AppResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let _ = Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .timeout(Timeout::Milliseconds(TIMEOUT_MS))
            .show();
        Ok(())
    }
}

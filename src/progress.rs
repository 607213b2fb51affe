/// One-way sink for workflow progress: a human-readable status line plus a
/// 0-100 percentage. Workflows only ever report non-decreasing percentages.
pub trait ProgressSink: Send + Sync {
    fn update(&self, message: &str, percent: u8);
}

/// Sink that forwards updates to the log.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&self, message: &str, percent: u8) {
        log::info!("[{:>3}%] {}", percent, message);
    }
}

/// Sink that discards updates.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&self, _message: &str, _percent: u8) {}
}

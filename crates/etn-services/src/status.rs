//! Upload status reporting

use std::sync::Mutex;

use etn_core::UploadStatus;

/// Receives every status transition of an upload, in order.
pub trait StatusReporter: Send + Sync {
    fn report(&self, status: &UploadStatus);
}

/// Logs each status with `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusReporter;

impl StatusReporter for TracingStatusReporter {
    fn report(&self, status: &UploadStatus) {
        match status {
            UploadStatus::Retrying { attempt, delay_ms } => {
                tracing::warn!(attempt, delay_ms, "{}", status)
            }
            UploadStatus::Failed { .. } => tracing::error!("{}", status),
            UploadStatus::Succeeded { url } => tracing::info!(url = %url, "{}", status),
            _ => tracing::debug!("{}", status),
        }
    }
}

/// Keeps every reported status in memory.
#[derive(Debug, Default)]
pub struct RecordingStatusReporter {
    statuses: Mutex<Vec<UploadStatus>>,
}

impl RecordingStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<UploadStatus> {
        self.statuses
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// The most recent status, if any
    pub fn last(&self) -> Option<UploadStatus> {
        self.statuses().pop()
    }
}

impl StatusReporter for RecordingStatusReporter {
    fn report(&self, status: &UploadStatus) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(status.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_keeps_order() {
        let reporter = RecordingStatusReporter::new();
        reporter.report(&UploadStatus::Encoding);
        reporter.report(&UploadStatus::Saving);
        assert_eq!(
            reporter.statuses(),
            vec![UploadStatus::Encoding, UploadStatus::Saving]
        );
        assert_eq!(reporter.last(), Some(UploadStatus::Saving));
    }
}

//! Notifier trait definition and shared error types.

use std::collections::BTreeMap;

use serde::Serialize;
use wowpulse_report::{Report, ReportSummary};

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A rendered report ready for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Title line, e.g. `"Weekly KPI 2026-10-19"`.
    pub subject: String,
    /// The report text as composed by the engine.
    pub body: String,
    /// Report digest; absent for test pings.
    pub summary: Option<ReportSummary>,
    /// Flat string metadata exposed to body templates.
    pub metadata: BTreeMap<String, String>,
}

impl Notification {
    /// Wrap a composed report. The body is the report text, unchanged.
    pub fn from_report(report: &Report, title: &str) -> Self {
        let summary = report.summary();
        let metadata = BTreeMap::from([
            ("date".to_string(), summary.date.clone()),
            ("has_data".to_string(), summary.has_data.to_string()),
            ("has_anomaly".to_string(), summary.has_anomaly.to_string()),
            ("alerts_count".to_string(), summary.alerts_count.to_string()),
        ]);
        Self {
            subject: format!("{} {}", title, summary.date),
            body: report.rendered_text.clone(),
            summary: Some(summary),
            metadata,
        }
    }
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Test connectivity with a sample notification.
    async fn test(&self) -> Result<(), NotifyError> {
        let test_notification = Notification {
            subject: "[TEST] wowpulse".to_string(),
            body: "This is a test notification from the wowpulse KPI report.".to_string(),
            summary: None,
            metadata: BTreeMap::from([("event".to_string(), "test".to_string())]),
        };
        self.send(&test_notification).await
    }

    /// Human-readable name for this channel (e.g., "webhook").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching a notification to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

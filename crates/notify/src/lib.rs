//! Delivery of composed KPI reports to downstream channels.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable notification channels
//! - A webhook notifier (Slack-compatible `{"text": ...}` payload by default)
//! - Minijinja rendering for custom webhook bodies
//! - Dispatcher that fans one notification out to every configured channel,
//!   built from the `NOTIFY_*` settings

pub mod dispatcher;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use templating::TemplateRenderer;
pub use traits::{DispatchResult, Notification, Notifier, NotifyError};
pub use webhook::WebhookNotifier;

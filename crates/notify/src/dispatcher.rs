//! Fans one report notification out to every configured channel.
//!
//! Each channel is tried once, in registration order. A failing channel is
//! logged and reported in the results but never blocks the others, and
//! nothing is retried.

use std::time::Instant;

use wowpulse_core::NotifyConfig;

use crate::traits::{DispatchResult, Notification, Notifier, NotifyError};
use crate::webhook::WebhookNotifier;

#[derive(Default)]
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Every channel `config` enables. Empty when nothing is configured.
    pub fn from_notify_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
        if let Some(webhook) = WebhookNotifier::from_notify_config(config)? {
            channels.push(Box::new(webhook));
        }
        Ok(Self::new(channels))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Deliver `notification` through every channel, in order.
    pub async fn dispatch(&self, notification: &Notification) -> Vec<DispatchResult> {
        if self.channels.is_empty() {
            tracing::debug!(subject = %notification.subject, "no notification channels configured");
        }
        let mut results = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            results.push(deliver(channel.as_ref(), notification).await);
        }
        results
    }

    /// Send the canned test message through the channel at `channel_index`.
    pub async fn test_notify(&self, channel_index: usize) -> Result<(), NotifyError> {
        let channel = self.channels.get(channel_index).ok_or_else(|| {
            NotifyError::Config(format!("no channel at index {channel_index}"))
        })?;
        channel.test().await
    }
}

async fn deliver(channel: &dyn Notifier, notification: &Notification) -> DispatchResult {
    let started = Instant::now();
    let outcome = channel.send(notification).await;
    let duration_ms = started.elapsed().as_millis() as u64;
    let name = channel.channel_name();

    let error = match outcome {
        Ok(()) => {
            tracing::info!(channel = name, subject = %notification.subject, duration_ms, "report delivered");
            None
        }
        Err(e) => {
            tracing::warn!(channel = name, subject = %notification.subject, error = %e, duration_ms, "report delivery failed");
            Some(e.to_string())
        }
    };

    DispatchResult {
        channel: name.to_string(),
        success: error.is_none(),
        error,
        duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    struct MockNotifier {
        name: String,
        send_count: Arc<AtomicUsize>,
        subjects: Arc<Mutex<Vec<String>>>,
        should_fail: bool,
    }

    impl MockNotifier {
        fn boxed(name: &str, should_fail: bool) -> (Box<dyn Notifier>, Arc<AtomicUsize>) {
            let count = Arc::new(AtomicUsize::new(0));
            let mock = MockNotifier {
                name: name.to_string(),
                send_count: count.clone(),
                subjects: Arc::new(Mutex::new(Vec::new())),
                should_fail,
            };
            (Box::new(mock), count)
        }
    }

    #[async_trait::async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            self.subjects.lock().unwrap().push(notification.subject.clone());
            if self.should_fail {
                Err(NotifyError::Rejected {
                    status: 500,
                    body: "mock failure".to_string(),
                })
            } else {
                Ok(())
            }
        }

        fn channel_name(&self) -> &str {
            &self.name
        }
    }

    fn notification() -> Notification {
        Notification {
            subject: "Weekly KPI 2026-03-02".to_string(),
            body: "report body".to_string(),
            summary: None,
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn dispatch_to_all_channels() {
        let (a, count_a) = MockNotifier::boxed("a", false);
        let (b, count_b) = MockNotifier::boxed("b", false);
        let dispatcher = Dispatcher::new(vec![a, b]);

        let results = dispatcher.dispatch(&notification()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[0].channel, "a");
        assert_eq!(results[1].channel, "b");
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_is_reported_and_not_retried() {
        let (fail, fail_count) = MockNotifier::boxed("fail", true);
        let (ok, ok_count) = MockNotifier::boxed("ok", false);
        let dispatcher = Dispatcher::new(vec![fail, ok]);

        let results = dispatcher.dispatch(&notification()).await;
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("500"));
        assert!(results[1].success);
        assert_eq!(fail_count.load(Ordering::SeqCst), 1);
        assert_eq!(ok_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_channels_returns_empty() {
        let dispatcher = Dispatcher::default();
        assert!(dispatcher.is_empty());
        assert!(dispatcher.dispatch(&notification()).await.is_empty());
    }

    #[tokio::test]
    async fn test_notify_sends_test_subject() {
        let subjects = Arc::new(Mutex::new(Vec::new()));
        let mock = MockNotifier {
            name: "mock".to_string(),
            send_count: Arc::new(AtomicUsize::new(0)),
            subjects: subjects.clone(),
            should_fail: false,
        };
        let dispatcher = Dispatcher::new(vec![Box::new(mock)]);

        dispatcher.test_notify(0).await.unwrap();
        assert_eq!(subjects.lock().unwrap().as_slice(), ["[TEST] wowpulse"]);

        match dispatcher.test_notify(3).await.unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("no channel at index 3")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn config_without_url_has_no_channels() {
        let config = NotifyConfig {
            webhook_url: None,
            webhook_method: "POST".into(),
            webhook_headers: BTreeMap::new(),
            webhook_template: None,
        };
        assert!(Dispatcher::from_notify_config(&config).unwrap().is_empty());

        let config = NotifyConfig {
            webhook_url: Some("https://hooks.example.com/kpi".into()),
            ..config
        };
        let dispatcher = Dispatcher::from_notify_config(&config).unwrap();
        assert_eq!(dispatcher.len(), 1);
    }
}

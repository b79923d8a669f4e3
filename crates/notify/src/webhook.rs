//! HTTP webhook notifier.
//!
//! Posts reports as JSON to a configured endpoint. By default the payload is
//! the Slack-compatible `{"text": <report text>}`; a minijinja body template
//! can replace it for other chat tools.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use wowpulse_core::NotifyConfig;

use crate::templating::TemplateRenderer;
use crate::traits::{Notification, Notifier, NotifyError};

/// Delivers notifications as JSON over HTTP.
///
/// `${VAR}` references in the URL and header values are expanded when the
/// notifier is built, so tokens can stay out of config files.
#[derive(Debug)]
pub struct WebhookNotifier {
    url: String,
    method: Method,
    headers: HeaderMap,
    body_template: Option<String>,
    renderer: TemplateRenderer,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// POST the Slack `{"text": ...}` payload to `url`.
    pub fn slack(url: &str) -> Result<Self, NotifyError> {
        Self::build(url, "POST", &BTreeMap::new(), None)
    }

    /// The webhook described by `config`, or `None` when no URL is set.
    pub fn from_notify_config(config: &NotifyConfig) -> Result<Option<Self>, NotifyError> {
        config
            .webhook_url
            .as_deref()
            .map(|url| {
                Self::build(
                    url,
                    &config.webhook_method,
                    &config.webhook_headers,
                    config.webhook_template.clone(),
                )
            })
            .transpose()
    }

    fn build(
        url: &str,
        method: &str,
        headers: &BTreeMap<String, String>,
        body_template: Option<String>,
    ) -> Result<Self, NotifyError> {
        let method = Method::from_bytes(method.trim().to_uppercase().as_bytes())
            .map_err(|_| NotifyError::Config(format!("invalid HTTP method: {method}")))?;

        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| NotifyError::Config(format!("invalid header name: {name}")))?;
            let header_value = HeaderValue::from_str(&expand_env(value)?)
                .map_err(|_| NotifyError::Config(format!("invalid value for header {name}")))?;
            header_map.insert(header_name, header_value);
        }

        let renderer = TemplateRenderer::new();
        if let Some(template) = &body_template {
            renderer
                .validate(template)
                .map_err(|e| NotifyError::Config(format!("invalid body template: {e}")))?;
        }

        Ok(Self {
            url: expand_env(url)?,
            method,
            headers: header_map,
            body_template,
            renderer,
            client: reqwest::Client::new(),
        })
    }

    fn payload(&self, notification: &Notification) -> Result<String, NotifyError> {
        match &self.body_template {
            Some(template) => self.renderer.render(template, notification),
            None => Ok(serde_json::json!({ "text": notification.body }).to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone())
            .body(self.payload(notification)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, %body, "webhook rejected the report");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(method = %self.method, %status, subject = %notification.subject, "webhook accepted the report");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

/// Replace every `${NAME}` in `input` with the value of that env var.
fn expand_env(input: &str) -> Result<String, NotifyError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| NotifyError::Config(format!("unclosed ${{...}} in '{input}'")))?;
        let name = &after[..end];
        let value = std::env::var(name)
            .map_err(|_| NotifyError::Config(format!("environment variable {name} is not set")))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

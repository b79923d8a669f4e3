//! Minijinja rendering for custom webhook bodies.
//!
//! Templates see the [`Notification`] as their context: `subject`, `body`,
//! `metadata.*` and, for report notifications, `summary.*` in camelCase
//! (`summary.wowRevenue`, `summary.alertsCount`, ...). Test pings carry no
//! summary, so templates should guard with `{% if summary %}`.

use minijinja::{Environment, Error, ErrorKind, Value};

use crate::traits::{Notification, NotifyError};

/// Renders webhook body templates against a notification.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_filter("round", round_filter);
        // JSON string literal, for embedding the report text in a payload.
        env.add_filter("json", json_filter);
        env.add_function("env", env_function);
        Self { env }
    }

    /// Render `template` with the notification as context.
    pub fn render(&self, template: &str, notification: &Notification) -> Result<String, NotifyError> {
        self.env
            .render_str(template, notification)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Parse `template` without evaluating it. Filters resolve at render
    /// time, so a bare environment is enough here.
    pub fn validate(&self, template: &str) -> Result<(), NotifyError> {
        let env = Environment::new();
        env.template_from_str(template)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Round a float to N decimal places.
fn round_filter(value: f64, decimals: Option<u32>) -> String {
    let n = decimals.unwrap_or(0);
    format!("{:.prec$}", value, prec = n as usize)
}

fn json_filter(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

/// Read an environment variable; empty string (and a warning) when unset.
fn env_function(name: String) -> String {
    match std::env::var(&name) {
        Ok(val) => val,
        Err(_) => {
            tracing::warn!(var = %name, "Environment variable not found, returning empty string");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wowpulse_core::EntityId;
    use wowpulse_report::ReportSummary;

    use super::*;

    fn sample_notification() -> Notification {
        Notification {
            subject: "Weekly KPI 2026-03-02".to_string(),
            body: "📊 *Weekly KPI* | 2026-03-02\n\"quoted\"".to_string(),
            summary: Some(ReportSummary {
                date: "2026-03-02".to_string(),
                has_data: true,
                revenue: Some(100000.0),
                orders: Some(50.0),
                wow_revenue: Some(-33.333333),
                wow_orders: Some(-16.666667),
                alerts_count: 2,
                has_anomaly: true,
                entity_ids: vec![EntityId::new("minix"), EntityId::new("pinkfong")],
            }),
            metadata: BTreeMap::from([("has_anomaly".to_string(), "true".to_string())]),
        }
    }

    #[test]
    fn render_summary_fields() {
        let renderer = TemplateRenderer::new();
        let template = "{{ subject }}: revenue {{ summary.wowRevenue | round(1) }}%, {{ summary.alertsCount }} alerts";
        let result = renderer.render(template, &sample_notification()).unwrap();
        assert_eq!(result, "Weekly KPI 2026-03-02: revenue -33.3%, 2 alerts");
    }

    #[test]
    fn render_round_filter_no_decimals() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render("{{ summary.wowOrders | round }}", &sample_notification())
            .unwrap();
        assert_eq!(result, "-17");
    }

    #[test]
    fn json_filter_escapes_body() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render(r#"{"text": {{ body | json }}}"#, &sample_notification())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["text"], sample_notification().body);
    }

    #[test]
    fn builtin_case_filters_available() {
        let renderer = TemplateRenderer::new();
        let n = sample_notification();
        assert_eq!(
            renderer.render("{{ metadata.has_anomaly | upper }}", &n).unwrap(),
            "TRUE"
        );
        assert_eq!(renderer.render("{{ 'KPI' | lower }}", &n).unwrap(), "kpi");
    }

    #[test]
    fn render_entity_iteration() {
        let renderer = TemplateRenderer::new();
        let template =
            "{% for e in summary.entityIds %}{{ e }}{% if not loop.last %}, {% endif %}{% endfor %}";
        let result = renderer.render(template, &sample_notification()).unwrap();
        assert_eq!(result, "minix, pinkfong");
    }

    #[test]
    fn missing_summary_takes_else_branch() {
        let renderer = TemplateRenderer::new();
        let template = "[{% if summary %}{{ summary.alertsCount }} alerts{% else %}ping{% endif %}]";
        assert_eq!(renderer.render(template, &sample_notification()).unwrap(), "[2 alerts]");

        let mut n = sample_notification();
        n.summary = None;
        assert_eq!(renderer.render(template, &n).unwrap(), "[ping]");
    }

    #[test]
    fn render_env_function() {
        std::env::set_var("WOWPULSE_NOTIFY_TEST_VAR", "hello_notify");

        let renderer = TemplateRenderer::new();
        let result = renderer
            .render("Env: {{ env('WOWPULSE_NOTIFY_TEST_VAR') }}", &sample_notification())
            .unwrap();
        assert_eq!(result, "Env: hello_notify");

        std::env::remove_var("WOWPULSE_NOTIFY_TEST_VAR");
    }

    #[test]
    fn render_env_missing_returns_empty() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render("Env: [{{ env('DEFINITELY_NOT_SET_XYZ') }}]", &sample_notification())
            .unwrap();
        assert_eq!(result, "Env: []");
    }

    #[test]
    fn invalid_template_produces_error() {
        let renderer = TemplateRenderer::new();
        match renderer.render("{{ unclosed", &sample_notification()).unwrap_err() {
            NotifyError::Template(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Template error, got: {:?}", other),
        }
    }

    #[test]
    fn validate_templates() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.validate("Hello {{ subject }}").is_ok());
        assert!(renderer.validate("{{ unclosed").is_err());
    }
}

//! Alert message rendering with minijinja.

use minijinja::Environment;
use serde::Serialize;
use tracing::warn;

use wowpulse_core::{EntityLabel, Metric};

pub(crate) const DEFAULT_MESSAGE: &str = "{{ metric }} down {{ magnitude }}{{ unit }} vs last week";

/// Variables available to a rule's message template.
#[derive(Debug, Serialize)]
pub struct MessageContext<'a> {
    pub entity: &'a str,
    pub label: &'a str,
    pub emoji: &'a str,
    /// Human-readable metric name.
    pub metric: &'a str,
    pub delta: f64,
    /// `|delta|` to one decimal.
    pub magnitude: String,
    /// `%` or `%p`.
    pub unit: &'static str,
    pub threshold: f64,
}

impl<'a> MessageContext<'a> {
    pub fn new(
        entity: &'a str,
        label: &'a EntityLabel,
        metric: Metric,
        delta: f64,
        threshold: f64,
    ) -> Self {
        Self {
            entity,
            label: &label.name,
            emoji: &label.emoji,
            metric: metric.label(),
            delta,
            magnitude: format!("{:.1}", delta.abs()),
            unit: metric.delta_kind().unit(),
            threshold,
        }
    }
}

/// Check that a template compiles.
pub fn check_template(source: &str) -> Result<(), String> {
    let env = Environment::new();
    env.template_from_str(source)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Render `template` (or the default message) against `ctx`.
///
/// Runtime failures fall back to the default message.
pub(crate) fn render_message(template: Option<&str>, ctx: &MessageContext<'_>) -> String {
    let env = Environment::new();
    let source = template.unwrap_or(DEFAULT_MESSAGE);
    match env.render_str(source, ctx) {
        Ok(text) => text,
        Err(e) => {
            warn!(entity = ctx.entity, metric = ctx.metric, error = %e, "alert template failed, using default message");
            env.render_str(DEFAULT_MESSAGE, ctx).unwrap_or_else(|_| {
                format!("{} down {}{} vs last week", ctx.metric, ctx.magnitude, ctx.unit)
            })
        }
    }
}

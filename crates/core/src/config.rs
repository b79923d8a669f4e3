use std::collections::{BTreeMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::FixedOffset;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityLabel};
use crate::error::{ConfigError, Result};
use crate::locale::CurrencyLocale;
use crate::metric::Metric;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

/// Parse a profiled env var, failing on malformed values instead of
/// silently falling back to the default.
fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> Result<T> {
    match profiled_env_opt(profile, key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub engine: EngineConfig,
    /// Optional rule document; the built-in rule set is used when unset.
    pub rules_path: Option<PathBuf>,
    pub notify: NotifyConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `WOWPULSE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self> {
        let profile = env_or("WOWPULSE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    ///
    /// When `ENGINE_CONFIG` points at a YAML file, the engine section is read
    /// from that file instead of individual env vars.
    pub fn for_profile(profile: &str) -> Result<Self> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let engine = match profiled_env_opt(p, "ENGINE_CONFIG") {
            Some(path) => EngineConfig::from_yaml_file(Path::new(&path))?,
            None => EngineConfig::from_env_profiled(p)?,
        };
        Ok(Self {
            profile: p.to_string(),
            engine,
            rules_path: profiled_env_opt(p, "RULES_PATH").map(PathBuf::from),
            notify: NotifyConfig::from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  engine:  entities={}, top_n={}, locale={}, competitors={}",
            self.engine.entity_list.len(),
            self.engine.top_n,
            self.engine.currency_locale,
            self.engine.track_competitors
        );
        tracing::info!(
            "  rules:   {}",
            self.rules_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        );
        tracing::info!(
            "  notify:  webhook configured={}, headers={}, template={}",
            self.notify.is_configured(),
            self.notify.webhook_headers.len(),
            self.notify.webhook_template.is_some()
        );
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "engine": {
                "entity_list": self.engine.entity_list,
                "top_n": self.engine.top_n,
                "currency_locale": self.engine.currency_locale,
                "track_competitors": self.engine.track_competitors,
                "competitor_alert_limit": self.engine.competitor_alert_limit,
                "utc_offset_minutes": self.engine.utc_offset_minutes,
            },
            "rules_path": self.rules_path,
            "notify": {
                "method": self.notify.webhook_method,
                "configured": self.notify.is_configured(),
                "header_names": self.notify.webhook_headers.keys().collect::<Vec<_>>(),
                "template": self.notify.webhook_template.is_some(),
            },
        })
    }
}

// ── Engine ────────────────────────────────────────────────────

fn default_top_n() -> usize {
    3
}

fn default_locale() -> String {
    "ko-KR".to_string()
}

fn default_true() -> bool {
    true
}

fn default_competitor_limit() -> usize {
    5
}

fn default_title() -> String {
    "Daily KPI Report".to_string()
}

/// Everything the engine needs besides the rule set and the input batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Tracked entities, in reporting order.
    pub entity_list: Vec<EntityId>,
    /// Entity → metric → replacement threshold.
    #[serde(default)]
    pub per_entity_thresholds: IndexMap<EntityId, BTreeMap<Metric, f64>>,
    /// Leaderboard length.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_locale")]
    pub currency_locale: String,
    #[serde(default = "default_true")]
    pub track_competitors: bool,
    #[serde(default = "default_competitor_limit")]
    pub competitor_alert_limit: usize,
    #[serde(default)]
    pub entity_labels: IndexMap<EntityId, EntityLabel>,
    #[serde(default = "default_title")]
    pub report_title: String,
    /// Offset applied to the clock for the date stamp and footer.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl EngineConfig {
    /// Config for the given entities with every other field at its default.
    pub fn new<I, E>(entities: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<EntityId>,
    {
        Self {
            entity_list: entities.into_iter().map(Into::into).collect(),
            per_entity_thresholds: IndexMap::new(),
            top_n: default_top_n(),
            currency_locale: default_locale(),
            track_competitors: true,
            competitor_alert_limit: default_competitor_limit(),
            entity_labels: IndexMap::new(),
            report_title: default_title(),
            utc_offset_minutes: 0,
        }
    }

    /// The simplest variant: one implicit entity, no competitor tracking.
    pub fn single_entity(id: impl Into<EntityId>) -> Self {
        let id: EntityId = id.into();
        let mut config = Self::new([id]);
        config.track_competitors = false;
        config
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    fn from_env_profiled(p: &str) -> Result<Self> {
        let entities: Vec<EntityId> = profiled_env_or(p, "ENTITIES", "default")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(EntityId::from)
            .collect();
        let mut config = Self::new(entities);
        config.top_n = profiled_env_parse(p, "TOP_N", default_top_n())?;
        config.currency_locale = profiled_env_or(p, "CURRENCY_LOCALE", &default_locale());
        config.track_competitors = profiled_env_parse(p, "TRACK_COMPETITORS", true)?;
        config.competitor_alert_limit =
            profiled_env_parse(p, "COMPETITOR_ALERT_LIMIT", default_competitor_limit())?;
        config.report_title = profiled_env_or(p, "REPORT_TITLE", &default_title());
        config.utc_offset_minutes = profiled_env_parse(p, "REPORT_UTC_OFFSET_MINUTES", 0)?;
        Ok(config)
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.entity_list.is_empty() {
            return Err(ConfigError::EmptyEntityList);
        }
        let mut seen = HashSet::new();
        for id in &self.entity_list {
            if id.is_blank() {
                return Err(ConfigError::BlankEntity);
            }
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateEntity(id.to_string()));
            }
        }
        if self.top_n == 0 {
            return Err(ConfigError::InvalidTopN);
        }
        if self.competitor_alert_limit == 0 {
            return Err(ConfigError::InvalidCompetitorLimit);
        }
        self.locale()?;
        self.utc_offset()?;
        for (entity, thresholds) in &self.per_entity_thresholds {
            if !self.contains(entity.as_str()) {
                return Err(ConfigError::UnknownOverrideEntity(entity.to_string()));
            }
            for (&metric, &value) in thresholds {
                if !value.is_finite() || value >= 0.0 {
                    return Err(ConfigError::InvalidThreshold {
                        entity: entity.to_string(),
                        metric,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn locale(&self) -> Result<CurrencyLocale> {
        self.currency_locale
            .parse()
            .map_err(|_| ConfigError::UnsupportedLocale(self.currency_locale.clone()))
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(self.utc_offset_minutes))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entity_list.iter().any(|e| e.as_str() == id)
    }

    pub fn label_for(&self, id: &EntityId) -> EntityLabel {
        self.entity_labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| EntityLabel::fallback(id))
    }
}

// ── Notify ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook target; may contain `${VAR}` references, resolved when the
    /// notifier is built.
    pub webhook_url: Option<String>,
    pub webhook_method: String,
    /// Extra request headers from `NOTIFY_WEBHOOK_HEADERS`
    /// (`Name=value;Name2=value2`). Values may contain `${VAR}` references.
    #[serde(default)]
    pub webhook_headers: BTreeMap<String, String>,
    /// Minijinja body template; the Slack `{"text": ...}` payload when unset.
    #[serde(default)]
    pub webhook_template: Option<String>,
}

impl NotifyConfig {
    fn from_env_profiled(p: &str) -> Result<Self> {
        let webhook_headers = match profiled_env_opt(p, "NOTIFY_WEBHOOK_HEADERS") {
            Some(raw) => parse_header_list(&raw).ok_or(ConfigError::InvalidEnv {
                key: "NOTIFY_WEBHOOK_HEADERS".to_string(),
                value: raw,
            })?,
            None => BTreeMap::new(),
        };
        Ok(Self {
            webhook_url: profiled_env_opt(p, "NOTIFY_WEBHOOK_URL"),
            webhook_method: profiled_env_or(p, "NOTIFY_WEBHOOK_METHOD", "POST"),
            webhook_headers,
            webhook_template: profiled_env_opt(p, "NOTIFY_WEBHOOK_TEMPLATE"),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

/// Parse `Name=value;Name2=value2`. `None` when an entry has no `=` or an
/// empty name.
fn parse_header_list(raw: &str) -> Option<BTreeMap<String, String>> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, value) = entry.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

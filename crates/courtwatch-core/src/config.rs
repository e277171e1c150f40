//! Configuration: per-tenant watch rules plus the ambient settings of a run.
//!
//! Loaded once from a TOML file before the run starts and treated as
//! immutable afterwards.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CourtWatchError, Result};
use crate::types::{EntityKind, TenantRule};

pub const DEFAULT_BASE_URL_V1: &str = "https://api.playtomic.io/v1";
pub const DEFAULT_BASE_URL_V2: &str = "https://api.playtomic.io/v2";
pub const DEFAULT_USER_AGENT: &str = concat!("CourtWatch/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Deadline for every network call of one cycle.
    pub timeout_secs: u64,
    /// IANA zone class start times are shown in.
    pub timezone: Tz,
    pub state: StateConfig,
    pub api: ApiConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,
    pub tournaments: Vec<TournamentFilter>,
    pub classes: Vec<ClassFilter>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            timezone: DEFAULT_TIMEZONE,
            state: StateConfig::default(),
            api: ApiConfig::default(),
            telegram: None,
            webhook: None,
            tournaments: Vec::new(),
            classes: Vec::new(),
        }
    }
}

/// Where each kind's observation store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub tournament_file: String,
    pub class_file: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            tournament_file: "tournament-state.json".into(),
            class_file: "class-state.json".into(),
        }
    }
}

impl StateConfig {
    /// State file for `kind`, with `~` expanded.
    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        let raw = match kind {
            EntityKind::Tournament => &self.tournament_file,
            EntityKind::Class => &self.class_file,
        };
        expand_path(raw)
    }
}

/// Booking API endpoints and transport policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url_v1: String,
    pub base_url_v2: String,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url_v1: DEFAULT_BASE_URL_V1.into(),
            base_url_v2: DEFAULT_BASE_URL_V2.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

/// Telegram bot sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_telegram_api")]
    pub api_url: String,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".into()
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_url: default_telegram_api(),
        }
    }
}

/// Generic JSON webhook sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub outbound_url: String,
}

/// One tenant's tournament query and filter criteria.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TournamentFilter {
    pub tenant_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub visibility: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub registration_status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// 0 disables the threshold.
    pub min_available_places: u32,
    pub blacklist: Vec<String>,
    /// Skip tournaments this player has already entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl TenantRule for TournamentFilter {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// One tenant's class query and filter criteria.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassFilter {
    pub tenant_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub course_visibility: String,
    pub show_only_available: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub class_type: String,
    pub min_available_places: u32,
    pub blacklist: Vec<String>,
    /// Whitelist over the course name; empty means any course.
    pub course_names: Vec<String>,
    pub coach_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl TenantRule for ClassFilter {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

impl WatchConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CourtWatchError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| CourtWatchError::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            tournaments = config.tournaments.len(),
            classes = config.classes.len(),
            "Loaded config from {}",
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CourtWatchError::config(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tournaments.is_empty() && self.classes.is_empty() {
            return Err(CourtWatchError::config(
                "at least one tournament or class filter is required",
            ));
        }
        for (i, t) in self.tournaments.iter().enumerate() {
            if t.tenant_id.trim().is_empty() {
                return Err(CourtWatchError::config(format!("tournaments[{i}]: tenant_id is required")));
            }
        }
        for (i, c) in self.classes.iter().enumerate() {
            if c.tenant_id.trim().is_empty() {
                return Err(CourtWatchError::config(format!("classes[{i}]: tenant_id is required")));
            }
        }
        if self.timeout_secs == 0 {
            return Err(CourtWatchError::config("timeout_secs must be greater than 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Number of configured rules for `kind`.
    pub fn rule_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Tournament => self.tournaments.len(),
            EntityKind::Class => self.classes.len(),
        }
    }

    /// Fill Telegram credentials from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let token = lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty());
        let chat_id = lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty());
        self.set_telegram(token, chat_id);
    }

    /// Override Telegram credentials; a bot is only configured once both
    /// the token and the chat id are known.
    pub fn set_telegram(&mut self, token: Option<String>, chat_id: Option<String>) {
        if let Some(tg) = self.telegram.as_mut() {
            if let Some(t) = token {
                tg.bot_token = t;
            }
            if let Some(c) = chat_id {
                tg.chat_id = c;
            }
            return;
        }
        match (token, chat_id) {
            (Some(token), Some(chat_id)) => {
                self.telegram = Some(TelegramConfig::new(token, chat_id));
            }
            (None, None) => {}
            _ => {
                tracing::warn!("Ignoring partial Telegram credentials: both token and chat id are needed");
            }
        }
    }

    /// Render as TOML with secrets masked, for `config show`.
    pub fn to_masked_toml(&self) -> Result<String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CourtWatchError::config(format!("serializing config: {e}")))?;
        Ok(mask_secrets(&content))
    }
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).as_ref())
}

fn mask_secrets(content: &str) -> String {
    let mut masked = String::new();
    for line in content.lines() {
        if line.contains("token") || line.contains("secret") || line.contains("outbound_url") {
            if let Some(eq_pos) = line.find('=') {
                masked.push_str(&line[..eq_pos + 1]);
                masked.push_str(" \"••••••••\"");
            } else {
                masked.push_str(line);
            }
        } else {
            masked.push_str(line);
        }
        masked.push('\n');
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
timeout_secs = 20

[state]
tournament_file = "/var/lib/courtwatch/tournaments.json"

[telegram]
bot_token = "123:abc"
chat_id = "-1001"

[[tournaments]]
tenant_id = "tenant-1"
visibility = "PUBLIC"
registration_status = "OPEN"
status = "PENDING"
min_available_places = 1
blacklist = ["ladies", "femenino"]

[[tournaments]]
tenant_id = "tenant-2"
blacklist = ["women"]

[[classes]]
tenant_id = "tenant-1"
type = "COURSE"
show_only_available = true
course_names = ["drills"]
coach_names = ["marta"]
player_name = "Ana"
"#;

    #[test]
    fn test_parse_sample() {
        let cfg = WatchConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(20));
        assert_eq!(cfg.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(cfg.tournaments.len(), 2);

        let tf = &cfg.tournaments[0];
        assert_eq!(tf.tenant_id, "tenant-1");
        assert_eq!(tf.visibility, "PUBLIC");
        assert_eq!(tf.registration_status, "OPEN");
        assert_eq!(tf.status, "PENDING");
        assert_eq!(tf.min_available_places, 1);
        assert_eq!(tf.blacklist, vec!["ladies", "femenino"]);
        assert!(tf.player_name.is_none());

        let cf = &cfg.classes[0];
        assert_eq!(cf.class_type, "COURSE");
        assert!(cf.show_only_available);
        assert_eq!(cf.player_name.as_deref(), Some("Ana"));
        assert_eq!(cf.min_available_places, 0);

        assert_eq!(cfg.state.class_file, "class-state.json");
        assert_eq!(cfg.api.base_url_v2, DEFAULT_BASE_URL_V2);
        assert_eq!(cfg.telegram.as_ref().unwrap().api_url, "https://api.telegram.org");
    }

    #[test]
    fn test_missing_tenant_id() {
        let err = WatchConfig::from_toml_str("[[tournaments]]\nvisibility = \"PUBLIC\"\n").unwrap_err();
        assert!(err.to_string().contains("tournaments[0]: tenant_id is required"));

        let err = WatchConfig::from_toml_str("[[classes]]\ntenant_id = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("classes[0]"));
    }

    #[test]
    fn test_no_filters() {
        let err = WatchConfig::from_toml_str("tournaments = []\n").unwrap_err();
        assert!(matches!(err, CourtWatchError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = WatchConfig::from_toml_str("timeout_secs = 0\n[[classes]]\ntenant_id = \"t\"\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = WatchConfig::from_toml_str("{{{invalid").unwrap_err();
        assert!(matches!(err, CourtWatchError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let cfg = WatchConfig::load_from(&path).unwrap();
        assert_eq!(cfg.rule_count(EntityKind::Tournament), 2);
        assert_eq!(cfg.rule_count(EntityKind::Class), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = WatchConfig::load_from(Path::new("/nonexistent/courtwatch.toml")).unwrap_err();
        assert!(matches!(err, CourtWatchError::ConfigNotFound(_)));
    }

    #[test]
    fn test_state_paths() {
        let cfg = WatchConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            cfg.state.path_for(EntityKind::Tournament),
            PathBuf::from("/var/lib/courtwatch/tournaments.json")
        );
        assert_eq!(cfg.state.path_for(EntityKind::Class), PathBuf::from("class-state.json"));
    }

    #[test]
    fn test_env_overrides_create_telegram() {
        let mut cfg = WatchConfig::default();
        cfg.apply_overrides_from(|key| match key {
            "TELEGRAM_BOT_TOKEN" => Some("tok".into()),
            "TELEGRAM_CHAT_ID" => Some("42".into()),
            _ => None,
        });
        let tg = cfg.telegram.unwrap();
        assert_eq!(tg.bot_token, "tok");
        assert_eq!(tg.chat_id, "42");
    }

    #[test]
    fn test_partial_override_keeps_existing() {
        let mut cfg = WatchConfig::from_toml_str(SAMPLE).unwrap();
        cfg.set_telegram(None, Some("99".into()));
        let tg = cfg.telegram.as_ref().unwrap();
        assert_eq!(tg.bot_token, "123:abc");
        assert_eq!(tg.chat_id, "99");

        let mut empty = WatchConfig::default();
        empty.set_telegram(Some("tok".into()), None);
        assert!(empty.telegram.is_none());
    }

    #[test]
    fn test_masked_toml_hides_token() {
        let cfg = WatchConfig::from_toml_str(SAMPLE).unwrap();
        let shown = cfg.to_masked_toml().unwrap();
        assert!(!shown.contains("123:abc"));
        assert!(shown.contains("tenant-1"));
    }

    #[test]
    fn test_timezone_override() {
        let cfg = WatchConfig::from_toml_str(
            "timezone = \"Europe/Madrid\"\n[[classes]]\ntenant_id = \"t\"\n",
        )
        .unwrap();
        assert_eq!(cfg.timezone, chrono_tz::Europe::Madrid);

        let err = WatchConfig::from_toml_str("timezone = \"Mars/Olympus\"\n[[classes]]\ntenant_id = \"t\"\n")
            .unwrap_err();
        assert!(matches!(err, CourtWatchError::Config(_)));
    }
}

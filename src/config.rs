//! Service configuration read from `hug.toml`.
//!
//! Settings are layered: file → environment (`HUG_*`, optionally from a
//! `.env` file) → CLI flags. A missing file means all defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! port = 3000
//! db_path = "written_hug.db"
//!
//! [admin]
//! username = "admin"
//! display_name = "CEO"
//! session_ttl_minutes = 120
//!
//! [mail]
//! endpoint = "https://api.resend.com/emails"
//! from = "The Written Hug <hello@thewrittenhug.com>"
//! subject = "Re: your {service_type} for {recipient_name} - The Written Hug"
//! timeout_secs = 10
//!
//! [geocoding]
//! enabled = true
//! timeout_secs = 5
//!
//! [dashboard]
//! utc_offset = "+05:30"
//! ```
//!
//! The admin password and mail API key are best supplied through
//! `HUG_ADMIN_PASSWORD` and `HUG_MAIL_API_KEY`.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::hug::geo::BIGDATACLOUD_URL;

pub const DEFAULT_CONFIG_FILE: &str = "hug.toml";
const REDACTED: &str = "********";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("written_hug.db")
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSection {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Sender name shown on admin replies.
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_display_name() -> String {
    "CEO".to_string()
}

fn default_session_ttl() -> i64 {
    crate::hug::auth::DEFAULT_SESSION_TTL_MINUTES
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: None,
            display_name: default_display_name(),
            session_ttl_minutes: default_session_ttl(),
        }
    }
}

/// Outbound mail. Delivery is disabled while `api_key` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSection {
    #[serde(default = "default_mail_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_mail_from")]
    pub from: String,
    #[serde(default = "default_mail_subject")]
    pub subject: String,
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

fn default_mail_endpoint() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_mail_from() -> String {
    "The Written Hug <hello@thewrittenhug.com>".to_string()
}

fn default_mail_subject() -> String {
    crate::hug::mail::ReplyTemplate::default().subject
}

fn default_mail_timeout() -> u64 {
    10
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            endpoint: default_mail_endpoint(),
            api_key: None,
            from: default_mail_from(),
            subject: default_mail_subject(),
            timeout_secs: default_mail_timeout(),
        }
    }
}

impl MailSection {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_geocoding_endpoint() -> String {
    BIGDATACLOUD_URL.to_string()
}

fn default_geocoding_timeout() -> u64 {
    5
}

impl Default for GeocodingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_geocoding_endpoint(),
            timeout_secs: default_geocoding_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSection {
    /// Offset used for the "today" filter, e.g. `"+05:30"`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

impl DashboardSection {
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset
            .trim()
            .parse::<FixedOffset>()
            .map_err(|e| anyhow::anyhow!("Invalid utc_offset '{}': {}", self.utc_offset, e))
    }
}

/// Root of `hug.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HugToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub admin: AdminSection,
    #[serde(default)]
    pub mail: MailSection,
    #[serde(default)]
    pub geocoding: GeocodingSection,
    #[serde(default)]
    pub dashboard: DashboardSection,
}

impl HugToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse hug.toml")
    }

    /// Returns default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize hug.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `HUG_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `HUG_*` overrides from `lookup`. Blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("HUG_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("HUG_PORT is not a valid port: {}", port))?;
        }
        if let Some(path) = get("HUG_DB_PATH") {
            self.server.db_path = PathBuf::from(path);
        }
        if let Some(username) = get("HUG_ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(password) = get("HUG_ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }
        if let Some(key) = get("HUG_MAIL_API_KEY") {
            self.mail.api_key = Some(key);
        }
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self
            .admin
            .password
            .as_deref()
            .is_none_or(|p| p.is_empty())
        {
            warnings.push(
                "No admin password configured (set HUG_ADMIN_PASSWORD); admin login is disabled"
                    .to_string(),
            );
        }
        if self.admin.session_ttl_minutes <= 0 {
            warnings.push(format!(
                "session_ttl_minutes must be positive, got {}",
                self.admin.session_ttl_minutes
            ));
        }
        if !self.mail.is_enabled() {
            warnings.push(
                "No mail API key configured (set HUG_MAIL_API_KEY); replies will not be emailed"
                    .to_string(),
            );
        }
        if !self.mail.subject.contains("{service_type}") {
            warnings.push("Mail subject does not mention {service_type}".to_string());
        }
        if let Err(e) = self.dashboard.offset() {
            warnings.push(e.to_string());
        }

        warnings
    }

    /// Copy with secrets replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.admin.password.is_some() {
            copy.admin.password = Some(REDACTED.to_string());
        }
        if copy.mail.api_key.is_some() {
            copy.mail.api_key = Some(REDACTED.to_string());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = HugToml::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.db_path, PathBuf::from("written_hug.db"));
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.session_ttl_minutes, 120);
        assert!(config.admin.password.is_none());
        assert!(!config.mail.is_enabled());
        assert!(config.geocoding.enabled);
        assert_eq!(config.dashboard.offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_partial_file() {
        let content = r#"
[server]
port = 8080

[admin]
display_name = "Priya"

[dashboard]
utc_offset = "+05:30"
"#;
        let config = HugToml::parse(content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.db_path, PathBuf::from("written_hug.db"));
        assert_eq!(config.admin.display_name, "Priya");
        assert_eq!(config.admin.username, "admin");
        assert_eq!(
            config.dashboard.offset().unwrap().local_minus_utc(),
            5 * 3600 + 30 * 60
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(HugToml::parse("[server\nport = ").is_err());
        assert!(HugToml::parse("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = HugToml::load_or_default(&dir.path().join("hug.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hug.toml");
        let mut config = HugToml::default();
        config.server.port = 4321;
        config.geocoding.enabled = false;
        config.save(&path).unwrap();

        let loaded = HugToml::load(&path).unwrap();
        assert_eq!(loaded.server.port, 4321);
        assert!(!loaded.geocoding.enabled);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = HugToml::parse("[server]\nport = 8080").unwrap();
        let vars = env(&[
            ("HUG_PORT", "9090"),
            ("HUG_DB_PATH", "/var/lib/hug.db"),
            ("HUG_ADMIN_PASSWORD", "s3cret"),
            ("HUG_MAIL_API_KEY", "re_123"),
            ("HUG_ADMIN_USERNAME", "  "),
        ]);
        config.apply_env_from(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.db_path, PathBuf::from("/var/lib/hug.db"));
        assert_eq!(config.admin.password.as_deref(), Some("s3cret"));
        assert_eq!(config.admin.username, "admin");
        assert!(config.mail.is_enabled());
    }

    #[test]
    fn test_env_bad_port() {
        let mut config = HugToml::default();
        let vars = env(&[("HUG_PORT", "not-a-port")]);
        assert!(config.apply_env_from(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let config = HugToml::default();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.contains("admin password")));
        assert!(warnings.iter().any(|w| w.contains("mail API key")));

        let mut config = HugToml::default();
        config.admin.password = Some("pw".into());
        config.mail.api_key = Some("key".into());
        assert!(config.validate().is_empty());

        config.dashboard.utc_offset = "IST".into();
        config.admin.session_ttl_minutes = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("utc_offset")));
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = HugToml::default();
        config.admin.password = Some("s3cret".into());
        config.mail.api_key = Some("re_123".into());
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("s3cret"));
        assert!(!shown.contains("re_123"));
        assert!(shown.contains(REDACTED));
        assert_eq!(config.admin.password.as_deref(), Some("s3cret"));
    }
}

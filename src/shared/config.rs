//! Application configuration. Endpoints, paths, tuning knobs.

use serde::Deserialize;

/// Hard cap on how long a submission request may stay in flight.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Quiet window before a burst of draft mutations is written to disk.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 400;

/// Saved progress older than this is discarded on startup.
pub const DEFAULT_SNAPSHOT_TTL_HOURS: u64 = 24;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Backend submission endpoint. Read from INTAKE_SUBMIT_URL; the mock
    /// gateway is used when unset.
    pub submit_url: Option<String>,

    /// Staff notification endpoint (best-effort). Read from INTAKE_NOTIFY_URL.
    #[serde(default)]
    pub notify_url: Option<String>,

    /// Where the draft snapshot lives. Read from INTAKE_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Submission request timeout in seconds. Read from INTAKE_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Autosave debounce window in milliseconds. Read from INTAKE_AUTOSAVE_DEBOUNCE_MS.
    #[serde(default)]
    pub autosave_debounce_ms: Option<u64>,

    /// Snapshot freshness window in hours. Read from INTAKE_SNAPSHOT_TTL_HOURS.
    #[serde(default)]
    pub snapshot_ttl_hours: Option<u64>,

    /// Originating chat user, injected by the hosting client. Read from
    /// TELEGRAM_USER_ID (no prefix; the host sets it, not the operator).
    #[serde(default)]
    pub telegram_user_id: Option<i64>,

    /// Referral/deep-link parameter from the hosting client. Read from START_PARAM.
    #[serde(default)]
    pub start_param: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("INTAKE"));
        if let Ok(path) = std::env::var("INTAKE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // The hosting chat client injects these without the INTAKE_ prefix.
        if let Ok(s) = std::env::var("TELEGRAM_USER_ID") {
            if let Ok(id) = s.parse::<i64>() {
                cfg.telegram_user_id = Some(id);
            }
        }
        if let Ok(s) = std::env::var("START_PARAM") {
            if !s.is_empty() {
                cfg.start_param = Some(s);
            }
        }
        Ok(cfg)
    }

    /// Returns the submission timeout in seconds. Defaults to 30 if unset.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Returns the autosave debounce in milliseconds. Defaults to 400 if unset.
    pub fn autosave_debounce_ms_or_default(&self) -> u64 {
        self.autosave_debounce_ms
            .unwrap_or(DEFAULT_AUTOSAVE_DEBOUNCE_MS)
    }

    /// Returns the snapshot TTL in hours. Defaults to 24 if unset.
    pub fn snapshot_ttl_hours_or_default(&self) -> u64 {
        self.snapshot_ttl_hours.unwrap_or(DEFAULT_SNAPSHOT_TTL_HOURS)
    }

    /// Returns true when the hosting chat client supplied launch context.
    pub fn is_host_configured(&self) -> bool {
        self.telegram_user_id.is_some() || self.start_param.is_some()
    }
}

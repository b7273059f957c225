//! TOML run configuration.
//!
//! Loaded once from an explicit path before the pipeline starts and
//! immutable thereafter. Components receive the values they need as
//! constructor arguments; there is no process-wide configuration state.

use chrono::{Duration as ChronoDuration, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::schedule::LessonSpec;

/// The `[lesson]` section, as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonConfig {
    /// English weekday name ("monday" or "mon", any case).
    pub weekday: String,
    /// Lesson start time, "HH:MM".
    pub start_time: String,
    pub facility: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Listing page the lesson is booked from.
    pub schedule_url: String,
}

/// The `[credentials]` section. Opaque to the core; passed through to
/// the login flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub organisation: String,
    pub username: String,
    pub password: String,
}

/// The `[timing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Hours before the lesson at which enrollment opens.
    #[serde(default = "default_offset_hours")]
    pub enrollment_offset_hours: u32,
    /// Backoff between attempts while the register button is absent.
    #[serde(default = "default_retry_secs")]
    pub retry_secs: u64,
    /// Bounded wait for elements to appear.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
    /// Short wait for a visible register button to become enabled.
    /// Deliberately shorter than `max_wait_secs`.
    #[serde(default = "default_clickable_wait_secs")]
    pub clickable_wait_secs: u64,
    /// Pause after the register click so the page reflects the action.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

/// The `[notifications]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// The `[webdriver]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_true")]
    pub headless: bool,
}

/// Run configuration, serialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub lesson: LessonConfig,
    pub credentials: Credentials,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
}

/// Wait durations resolved from `[timing]`, handed to each component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub max_wait: Duration,
    pub clickable_wait: Duration,
    pub settle: Duration,
    pub retry: Duration,
}

// Default functions
fn default_offset_hours() -> u32 {
    24
}
fn default_retry_secs() -> u64 {
    20
}
fn default_max_wait_secs() -> u64 {
    5
}
fn default_clickable_wait_secs() -> u64 {
    2
}
fn default_settle_secs() -> u64 {
    3
}
fn default_endpoint() -> String {
    "http://localhost:9515".into()
}
fn default_true() -> bool {
    true
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enrollment_offset_hours: default_offset_hours(),
            retry_secs: default_retry_secs(),
            max_wait_secs: default_max_wait_secs(),
            clickable_wait_secs: default_clickable_wait_secs(),
            settle_secs: default_settle_secs(),
        }
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            headless: true,
        }
    }
}

impl Config {
    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate the `[lesson]` section into a typed [`LessonSpec`].
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key when the weekday, start
    /// time or listing URL does not parse.
    pub fn lesson_spec(&self) -> Result<LessonSpec, ConfigError> {
        let weekday: Weekday =
            self.lesson
                .weekday
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "lesson.weekday".into(),
                    message: format!("'{}' is not a weekday name", self.lesson.weekday),
                })?;
        let start_time = NaiveTime::parse_from_str(&self.lesson.start_time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&self.lesson.start_time, "%H:%M:%S"))
            .map_err(|_| ConfigError::InvalidValue {
                key: "lesson.start_time".into(),
                message: format!("'{}' is not a HH:MM time", self.lesson.start_time),
            })?;
        url::Url::parse(&self.lesson.schedule_url).map_err(|e| ConfigError::InvalidValue {
            key: "lesson.schedule_url".into(),
            message: e.to_string(),
        })?;

        Ok(LessonSpec {
            weekday,
            start_time,
            facility: self.lesson.facility.clone(),
            description: self.lesson.description.clone(),
            schedule_url: self.lesson.schedule_url.clone(),
        })
    }

    /// Resolve `[timing]` into durations.
    ///
    /// # Errors
    ///
    /// Returns an error when `clickable_wait_secs` is not shorter than
    /// `max_wait_secs`; the short enabled-state wait must stay below the
    /// general element wait.
    pub fn timing(&self) -> Result<Timing, ConfigError> {
        if self.timing.clickable_wait_secs >= self.timing.max_wait_secs {
            return Err(ConfigError::InvalidValue {
                key: "timing.clickable_wait_secs".into(),
                message: format!(
                    "must be shorter than max_wait_secs ({} >= {})",
                    self.timing.clickable_wait_secs, self.timing.max_wait_secs
                ),
            });
        }
        Ok(Timing {
            max_wait: Duration::from_secs(self.timing.max_wait_secs),
            clickable_wait: Duration::from_secs(self.timing.clickable_wait_secs),
            settle: Duration::from_secs(self.timing.settle_secs),
            retry: Duration::from_secs(self.timing.retry_secs),
        })
    }

    pub fn enrollment_offset(&self) -> ChronoDuration {
        ChronoDuration::hours(i64::from(self.timing.enrollment_offset_hours))
    }

    /// Copy with the password blanked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.credentials.password = "********".into();
        config
    }
}

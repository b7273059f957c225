//! Core error types for enrollbot-core.
//!
//! One umbrella [`CoreError`] plus a per-domain enum for each pipeline
//! stage, built with thiserror. Transient conditions (the register button
//! simply not being there yet) are not errors -- they are absorbed by the
//! enrollment loop and never appear here.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for enrollbot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Browser driver errors outside a specific pipeline stage
    #[error("Browser driver error: {0}")]
    Driver(#[from] DriverError),

    /// Login flow errors
    #[error("Login failed: {0}")]
    Auth(#[from] AuthError),

    /// Target resolution errors
    #[error("Lesson lookup failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Enrollment loop errors
    #[error("Enrollment failed: {0}")]
    Enroll(#[from] EnrollError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load or parse the configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}

/// Errors surfaced by a [`BrowserDriver`](crate::driver::BrowserDriver)
/// implementation.
#[derive(Error, Debug)]
pub enum DriverError {
    /// No element matches the locator right now
    #[error("No element matches {locator}")]
    NotFound { locator: String },

    /// An element never reached the requested state within the timeout
    #[error("Timed out after {waited:?} waiting for {locator} to become {condition}")]
    Timeout {
        locator: String,
        condition: &'static str,
        waited: Duration,
    },

    /// Wire-protocol or transport failure
    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    /// The browser session has already been released
    #[error("Browser session is closed")]
    SessionClosed,
}

/// Login flow errors. Always fatal for the run; partial credential state
/// is never retried piecemeal.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login control '{step}' never became interactable: {source}")]
    LoginFlow {
        step: &'static str,
        #[source]
        source: DriverError,
    },
}

/// Target resolution errors.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The lesson is absent from the listing even after one expansion.
    /// Whether the configuration is wrong or the lesson is not yet
    /// published cannot be told apart from here; the caller decides.
    #[error("Lesson not found in listing (facility '{facility}', {time}) after one load-more expansion")]
    LessonNotFound { facility: String, time: String },

    /// Listing page interaction failed
    #[error("Listing page error: {0}")]
    Listing(#[from] DriverError),
}

/// Enrollment loop errors.
#[derive(Error, Debug)]
pub enum EnrollError {
    /// The register control is visible but stayed disabled for the whole
    /// short wait. Retrying against a disabled control cannot converge,
    /// so this aborts the run.
    #[error("Register control is visible but stayed disabled; registration is likely not open yet")]
    RegistrationClosed,

    /// Browser error during an attempt cycle
    #[error("Browser error during enrollment: {0}")]
    Driver(#[from] DriverError),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),

    #[error("Webhook send failed: {0}")]
    SendFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

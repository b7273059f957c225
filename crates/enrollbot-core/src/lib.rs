//! # enrollbot core
//!
//! Orchestration core for automated enrollment into scarce, time-boxed
//! class sessions that open for registration at a known future instant.
//!
//! ## Architecture
//!
//! - **Countdown scheduler**: derives the next lesson occurrence and the
//!   instant enrollment opens, then blocks with tiered sleeps
//! - **Session authenticator**: federated login, tolerating an already
//!   authenticated context
//! - **Target resolver**: finds the one configured lesson in the listing
//! - **Enrollment loop**: probes the register control and claims the slot,
//!   backing off while it is absent
//! - **Supervisor**: composes one run and escalates fatal failures to a
//!   notifier
//!
//! Browser automation is consumed through the [`BrowserDriver`] capability
//! trait; a W3C WebDriver wire-protocol client lives in [`driver::remote`].
//! Execution is single-threaded: every wait is a synchronous sleep or a
//! bounded poll, sequenced on one thread.

pub mod auth;
pub mod clock;
pub mod config;
pub mod driver;
pub mod enroll;
pub mod error;
pub mod notify;
pub mod resolver;
pub mod schedule;
pub mod selectors;
pub mod supervisor;

pub use auth::{Authenticator, SessionState};
pub use clock::{Clock, SystemClock};
pub use config::{Config, Credentials, Timing};
pub use driver::{BrowserDriver, Condition, ElementHandle, Locator};
pub use enroll::{AttemptResult, EnrollmentLoop};
pub use error::{
    AuthError, ConfigError, CoreError, DriverError, EnrollError, NotifyError, ResolveError, Result,
};
pub use notify::{NoopNotifier, Notifier, WebhookNotifier};
pub use resolver::{ResolvedLesson, TargetResolver};
pub use schedule::{sleep_tier, wait_until_open, LessonSpec, ScheduleWindow};
pub use supervisor::{RunOutcome, Supervisor, FAILURE_MESSAGE};

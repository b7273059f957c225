//! Session authentication against the portal's federated login flow.
//!
//! The browsing context may already carry a valid session from a
//! previous run. The portal exposes no affirmative "am I logged in"
//! check, so the probe falls back to inference: if the login button does
//! not appear within the bounded wait, the session is assumed to be
//! authenticated. That fallback is logged as a degraded-confidence path.

use std::time::Duration;
use tracing::{info, warn};

use crate::config::Credentials;
use crate::driver::{BrowserDriver, Condition};
use crate::error::{AuthError, DriverError};
use crate::selectors;

/// What is known about the browsing context's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    /// Inferred or established.
    Authenticated,
    Unauthenticated,
}

/// Brings a browsing context into an authenticated state.
pub struct Authenticator<'a> {
    credentials: &'a Credentials,
    max_wait: Duration,
}

fn step<T>(step: &'static str, result: Result<T, DriverError>) -> Result<T, AuthError> {
    result.map_err(|source| AuthError::LoginFlow { step, source })
}

impl<'a> Authenticator<'a> {
    pub fn new(credentials: &'a Credentials, max_wait: Duration) -> Self {
        Self {
            credentials,
            max_wait,
        }
    }

    /// Probe the session state. Absence of the login button within the
    /// timeout is read as "already logged in" -- an inference from
    /// absence, not a confirmation. Only absence supports that inference;
    /// transport or session failures are real errors and propagate.
    pub fn probe(&self, driver: &mut dyn BrowserDriver) -> Result<SessionState, AuthError> {
        match driver.wait_until(&selectors::login_button(), Condition::Visible, self.max_wait) {
            Ok(_) => Ok(SessionState::Unauthenticated),
            Err(err @ (DriverError::Timeout { .. } | DriverError::NotFound { .. })) => {
                warn!(%err, "login button did not appear; assuming an existing session");
                Ok(SessionState::Authenticated)
            }
            Err(source) => Err(AuthError::LoginFlow {
                step: "session probe",
                source,
            }),
        }
    }

    /// Ensure the context is authenticated, logging in if the probe says
    /// it is not. Any login control that never becomes interactable is
    /// fatal; no partial-credential state is retried.
    pub fn ensure_logged_in(&self, driver: &mut dyn BrowserDriver) -> Result<SessionState, AuthError> {
        match self.probe(driver)? {
            SessionState::Unauthenticated => {
                self.log_in(driver)?;
                Ok(SessionState::Unauthenticated)
            }
            state => Ok(state),
        }
    }

    fn log_in(&self, driver: &mut dyn BrowserDriver) -> Result<(), AuthError> {
        let login = step(
            "login button",
            driver.wait_until(&selectors::login_button(), Condition::Clickable, self.max_wait),
        )?;
        step("login button", driver.click(&login))?;

        let federated = step(
            "identity provider button",
            driver.wait_until(
                &selectors::federated_login_button(),
                Condition::Clickable,
                self.max_wait,
            ),
        )?;
        step("identity provider button", driver.click(&federated))?;

        let organisation = step(
            "organisation picker",
            driver.wait_until(
                &selectors::organisation_field(),
                Condition::Visible,
                self.max_wait,
            ),
        )?;
        step(
            "organisation picker",
            driver.send_keys(&organisation, &self.credentials.organisation),
        )?;
        step(
            "organisation picker",
            driver.send_keys(&organisation, selectors::RETURN_KEY),
        )?;

        let username = step(
            "username field",
            driver.wait_until(&selectors::username_field(), Condition::Visible, self.max_wait),
        )?;
        step("username field", driver.send_keys(&username, &self.credentials.username))?;

        let password = step(
            "password field",
            driver.wait_until(&selectors::password_field(), Condition::Visible, self.max_wait),
        )?;
        step("password field", driver.send_keys(&password, &self.credentials.password))?;

        let submit = step(
            "submit button",
            driver.wait_until(&selectors::submit_button(), Condition::Clickable, self.max_wait),
        )?;
        step("submit button", driver.click(&submit))?;

        info!(username = %self.credentials.username, "logged in");
        Ok(())
    }
}

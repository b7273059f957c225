//! The enrollment attempt loop.
//!
//! Cycles Probing -> Attempting -> Backoff until the lesson is claimed.
//! An absent register button is transient and absorbed here forever:
//! fully-booked and not-yet-published present identically at the
//! visibility level, so both drive the same backoff path. A register
//! button that is visible but stays disabled is different -- retrying
//! against a control that will not enable this run cannot converge, so
//! it aborts instead.

use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::Timing;
use crate::driver::{BrowserDriver, Condition};
use crate::error::{DriverError, EnrollError};
use crate::selectors;

/// Outcome of a single probe/attempt cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    /// Register button absent: fully booked or not yet published.
    NotYetAvailable,
    /// Button clicked and the page given time to settle.
    Claimed,
    /// Button visible but still disabled after the short wait.
    FatalTiming,
}

/// Repeatedly attempts to claim the opened lesson.
pub struct EnrollmentLoop<'a, C: Clock> {
    clock: &'a C,
    timing: Timing,
}

impl<'a, C: Clock> EnrollmentLoop<'a, C> {
    pub fn new(clock: &'a C, timing: Timing) -> Self {
        Self { clock, timing }
    }

    /// Poll until the lesson is claimed. Returns only on a confirmed
    /// claim or a fatal condition.
    pub fn run(&self, driver: &mut dyn BrowserDriver) -> Result<(), EnrollError> {
        loop {
            match self.attempt_once(driver)? {
                AttemptResult::Claimed => {
                    info!("successfully enrolled");
                    return Ok(());
                }
                AttemptResult::FatalTiming => return Err(EnrollError::RegistrationClosed),
                AttemptResult::NotYetAvailable => {
                    info!(
                        "register button not visible, probably fully booked; retrying in {:?}",
                        self.timing.retry
                    );
                    self.clock.sleep(self.timing.retry);
                    driver.refresh()?;
                }
            }
        }
    }

    /// One probe/attempt cycle.
    pub fn attempt_once(&self, driver: &mut dyn BrowserDriver) -> Result<AttemptResult, EnrollError> {
        let register = selectors::register_button();

        // Probing: visibility within max_wait.
        match driver.wait_until(&register, Condition::Visible, self.timing.max_wait) {
            Ok(_) => {}
            Err(DriverError::Timeout { .. }) | Err(DriverError::NotFound { .. }) => {
                return Ok(AttemptResult::NotYetAvailable);
            }
            Err(other) => return Err(other.into()),
        }

        // Attempting: only clickability distinguishes "open but momentarily
        // blocked" from a control that will never enable this run. The
        // wait is deliberately short.
        info!("waiting for register button to become enabled");
        match driver.wait_until(&register, Condition::Clickable, self.timing.clickable_wait) {
            Ok(element) => {
                driver.click(&element)?;
                // Let the page reflect the click before reporting success.
                self.clock.sleep(self.timing.settle);
                Ok(AttemptResult::Claimed)
            }
            Err(DriverError::Timeout { .. }) => {
                warn!("register button visible but disabled; registration is likely not open yet");
                Ok(AttemptResult::FatalTiming)
            }
            Err(other) => Err(other.into()),
        }
    }
}

//! Run composition and failure escalation.
//!
//! One supervisor invocation is one full run: countdown, fresh browser
//! session, target resolution, authentication, enrollment loop. The
//! escalation policy is fail-fast: on any fatal pipeline error the
//! supervisor sends a single failure notification and propagates the
//! error; restarting is the job of an outer process supervisor.

use chrono::Duration as ChronoDuration;
use tracing::{error, info, warn};

use crate::auth::Authenticator;
use crate::clock::Clock;
use crate::config::{Credentials, Timing};
use crate::driver::BrowserDriver;
use crate::enroll::EnrollmentLoop;
use crate::error::{CoreError, Result};
use crate::notify::Notifier;
use crate::resolver::TargetResolver;
use crate::schedule::{wait_until_open, LessonSpec, ScheduleWindow};

/// Fixed text sent when a run aborts.
pub const FAILURE_MESSAGE: &str = "Enrollment run stopped; an error occurred";

/// Terminal value of a run: the captured lesson summary, or the fatal
/// error that ended it.
pub type RunOutcome = Result<String, CoreError>;

pub struct Supervisor<'a, C: Clock> {
    lesson: &'a LessonSpec,
    credentials: &'a Credentials,
    offset: ChronoDuration,
    timing: Timing,
    clock: &'a C,
    notifier: &'a dyn Notifier,
}

impl<'a, C: Clock> Supervisor<'a, C> {
    pub fn new(
        lesson: &'a LessonSpec,
        credentials: &'a Credentials,
        offset: ChronoDuration,
        timing: Timing,
        clock: &'a C,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            lesson,
            credentials,
            offset,
            timing,
            clock,
            notifier,
        }
    }

    /// Execute one full run. The browser session is created only after
    /// the countdown completes and is released on every exit path,
    /// success and fatal alike.
    pub fn run<F>(&self, make_driver: F) -> RunOutcome
    where
        F: FnOnce() -> Result<Box<dyn BrowserDriver>>,
    {
        let window = ScheduleWindow::for_lesson(self.lesson, self.offset, self.clock.now());
        info!(lesson_at = %window.lesson_at, opens_at = %window.opens_at, "run scheduled");
        wait_until_open(&window, self.clock);

        info!("starting browser session");
        // Driver startup failures take the same notified exit as pipeline
        // failures; only the countdown runs outside the notified path.
        let outcome = make_driver().and_then(|mut driver| {
            let result = self.pipeline(driver.as_mut());
            if let Err(err) = driver.close() {
                warn!(%err, "failed to release browser session");
            }
            result
        });

        match outcome {
            Ok(summary) => {
                info!(%summary, "enrolled successfully");
                self.notify(&format!("Enrolled successfully :D\n------------\n{summary}"));
                Ok(summary)
            }
            Err(err) => {
                error!(%err, "enrollment run failed");
                self.notify(FAILURE_MESSAGE);
                Err(err)
            }
        }
    }

    fn pipeline(&self, driver: &mut dyn BrowserDriver) -> Result<String> {
        let resolved = TargetResolver::new(self.lesson, self.timing.max_wait).resolve(driver)?;
        Authenticator::new(self.credentials, self.timing.max_wait).ensure_logged_in(driver)?;
        EnrollmentLoop::new(self.clock, self.timing).run(driver)?;
        Ok(resolved.summary)
    }

    fn notify(&self, message: &str) {
        if let Err(err) = self.notifier.send(message) {
            warn!(%err, "notification delivery failed");
        }
    }
}

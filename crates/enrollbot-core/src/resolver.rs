//! Locate the configured lesson in the schedule listing.
//!
//! The listing groups lessons by weekday; within the matching day group
//! the lesson is matched on facility, start time and optional
//! description. The display text is captured before the item is
//! activated, so the success notification can quote the lesson exactly
//! as the listing showed it.

use std::time::Duration;
use tracing::info;

use crate::driver::{BrowserDriver, Condition, ElementHandle};
use crate::error::{DriverError, ResolveError};
use crate::schedule::LessonSpec;
use crate::selectors;

/// A lesson located in the listing, with its display text captured
/// before activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLesson {
    pub summary: String,
}

/// Disambiguates the one configured lesson from the listing.
pub struct TargetResolver<'a> {
    spec: &'a LessonSpec,
    max_wait: Duration,
}

impl<'a> TargetResolver<'a> {
    pub fn new(spec: &'a LessonSpec, max_wait: Duration) -> Self {
        Self { spec, max_wait }
    }

    /// Open the listing, find the lesson, capture its text and activate
    /// it. The listing renders after navigation completes, so the day
    /// grouping is awaited within the bounded wait rather than looked up
    /// instantly. A miss triggers exactly one "load more" expansion and
    /// one repeated search; a second miss is a distinct fatal error.
    pub fn resolve(&self, driver: &mut dyn BrowserDriver) -> Result<ResolvedLesson, ResolveError> {
        info!(url = %self.spec.schedule_url, "opening schedule listing");
        driver.navigate(&self.spec.schedule_url)?;

        let day = driver.wait_until(
            &selectors::day_group(self.spec.weekday),
            Condition::Visible,
            self.max_wait,
        )?;
        let item = selectors::lesson_item(self.spec);
        let lesson = match driver.find_within(&day, &item) {
            Ok(element) => element,
            Err(DriverError::NotFound { .. }) => self.expand_and_retry(driver, &day)?,
            Err(other) => return Err(ResolveError::Listing(other)),
        };

        let summary = driver.text(&lesson)?;
        info!(%summary, "booking lesson");
        driver.click(&lesson)?;
        Ok(ResolvedLesson { summary })
    }

    fn expand_and_retry(
        &self,
        driver: &mut dyn BrowserDriver,
        day: &ElementHandle,
    ) -> Result<ElementHandle, ResolveError> {
        info!("lesson not in the visible listing; expanding once");
        let more = driver.wait_until(
            &selectors::load_more_button(),
            Condition::Visible,
            self.max_wait,
        )?;
        driver.click(&more)?;
        driver
            .find_within(day, &selectors::lesson_item(self.spec))
            .map_err(|err| match err {
                // Wrong configuration and not-yet-published look the same
                // from here; surface the miss instead of guessing.
                DriverError::NotFound { .. } => ResolveError::LessonNotFound {
                    facility: self.spec.facility.clone(),
                    time: self.spec.start_time.format("%H:%M").to_string(),
                },
                other => ResolveError::Listing(other),
            })
    }
}

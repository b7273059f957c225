//! Browser automation capability surface.
//!
//! The orchestration core never talks to a browser directly; it consumes
//! the [`BrowserDriver`] trait and treats locators as opaque structural
//! queries that either resolve, are absent, or time out. The wire-level
//! implementation lives in [`remote`].

pub mod remote;

use std::fmt;
use std::time::Duration;

use crate::error::DriverError;

pub type DriverResult<T> = Result<T, DriverError>;

/// Structural query against the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub xpath: String,
}

impl Locator {
    pub fn xpath(query: impl Into<String>) -> Self {
        Self {
            xpath: query.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xpath `{}`", self.xpath)
    }
}

/// Opaque reference to a located element. Valid until the next
/// navigation or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: String,
}

/// Element state a bounded wait can poll for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Rendered and displayed.
    Visible,
    /// Displayed and enabled, so a click will land.
    Clickable,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Visible => "visible",
            Condition::Clickable => "clickable",
        }
    }
}

/// Capability surface the pipeline needs from a browser session.
pub trait BrowserDriver {
    fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Locate an element in the whole document, without waiting.
    fn find(&mut self, locator: &Locator) -> DriverResult<ElementHandle>;

    /// Locate an element inside a previously found one.
    fn find_within(&mut self, scope: &ElementHandle, locator: &Locator)
        -> DriverResult<ElementHandle>;

    /// Poll until the element matching `locator` satisfies `condition`,
    /// for at most `timeout`.
    fn wait_until(
        &mut self,
        locator: &Locator,
        condition: Condition,
        timeout: Duration,
    ) -> DriverResult<ElementHandle>;

    fn click(&mut self, element: &ElementHandle) -> DriverResult<()>;

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// The element's rendered text.
    fn text(&mut self, element: &ElementHandle) -> DriverResult<String>;

    fn refresh(&mut self) -> DriverResult<()>;

    /// Release the browser session. Idempotent.
    fn close(&mut self) -> DriverResult<()>;
}

//! Shared test doubles: a scripted browser driver, a deterministic
//! clock and a recording notifier.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use enrollbot_core::driver::DriverResult;
use enrollbot_core::{
    BrowserDriver, Clock, Condition, DriverError, ElementHandle, Locator, Notifier, NotifyError,
};

/// One scripted element, keyed by its locator's xpath.
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    pub id: String,
    pub text: String,
    /// 1-based `wait_until(Visible)` call on which the element first
    /// reports visible; `usize::MAX` means never.
    pub visible_on_probe: usize,
    /// Same, for `Clickable`.
    pub clickable_on_probe: usize,
    /// `find`/`find_within` succeed only while present.
    pub present: bool,
}

impl ScriptedElement {
    /// Present, immediately visible and clickable.
    pub fn ready(id: &str, text: &str) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            visible_on_probe: 1,
            clickable_on_probe: 1,
            present: true,
        }
    }

    pub fn visible_on_probe(mut self, probe: usize) -> Self {
        self.visible_on_probe = probe;
        self
    }

    pub fn clickable_on_probe(mut self, probe: usize) -> Self {
        self.clickable_on_probe = probe;
        self
    }

    pub fn never_clickable(mut self) -> Self {
        self.clickable_on_probe = usize::MAX;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.present = false;
        self
    }
}

#[derive(Default)]
struct ScriptState {
    elements: HashMap<String, ScriptedElement>,
    visible_probes: HashMap<String, usize>,
    clickable_probes: HashMap<String, usize>,
    clicked: Vec<String>,
    keys_sent: Vec<(String, String)>,
    navigations: Vec<String>,
    refreshes: usize,
    closed: bool,
    fail_close: bool,
    /// Every wait reports the session as gone.
    broken_session: bool,
    /// Clicking the element with this id makes these xpaths present
    /// (load-more behavior).
    reveal_on_click: HashMap<String, Vec<String>>,
    /// Clicking the element with this id rewrites its own text
    /// (activation side effect).
    text_after_click: HashMap<String, String>,
}

/// Scripted [`BrowserDriver`]. Clones share state, so a test can keep a
/// handle while the pipeline owns a boxed clone.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, locator: &Locator, element: ScriptedElement) -> Self {
        self.state
            .borrow_mut()
            .elements
            .insert(locator.xpath.clone(), element);
        self
    }

    pub fn reveal_on_click(self, clicked_id: &str, revealed: &Locator) -> Self {
        self.state
            .borrow_mut()
            .reveal_on_click
            .entry(clicked_id.into())
            .or_default()
            .push(revealed.xpath.clone());
        self
    }

    pub fn text_after_click(self, clicked_id: &str, new_text: &str) -> Self {
        self.state
            .borrow_mut()
            .text_after_click
            .insert(clicked_id.into(), new_text.into());
        self
    }

    pub fn failing_close(self) -> Self {
        self.state.borrow_mut().fail_close = true;
        self
    }

    pub fn broken_session(self) -> Self {
        self.state.borrow_mut().broken_session = true;
        self
    }

    pub fn clicked(&self) -> Vec<String> {
        self.state.borrow().clicked.clone()
    }

    pub fn keys_sent(&self) -> Vec<(String, String)> {
        self.state.borrow().keys_sent.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    pub fn refreshes(&self) -> usize {
        self.state.borrow().refreshes
    }

    pub fn closed(&self) -> bool {
        self.state.borrow().closed
    }

    pub fn visible_probes(&self, locator: &Locator) -> usize {
        self.state
            .borrow()
            .visible_probes
            .get(&locator.xpath)
            .copied()
            .unwrap_or(0)
    }

    pub fn clickable_probes(&self, locator: &Locator) -> usize {
        self.state
            .borrow()
            .clickable_probes
            .get(&locator.xpath)
            .copied()
            .unwrap_or(0)
    }

    fn timeout(locator: &Locator, condition: Condition) -> DriverError {
        DriverError::Timeout {
            locator: locator.to_string(),
            condition: condition.as_str(),
            waited: Duration::from_secs(0),
        }
    }
}

impl BrowserDriver for ScriptedDriver {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.state.borrow_mut().navigations.push(url.into());
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> DriverResult<ElementHandle> {
        let state = self.state.borrow();
        match state.elements.get(&locator.xpath) {
            Some(element) if element.present => Ok(ElementHandle {
                id: element.id.clone(),
            }),
            _ => Err(DriverError::NotFound {
                locator: locator.to_string(),
            }),
        }
    }

    fn find_within(
        &mut self,
        _scope: &ElementHandle,
        locator: &Locator,
    ) -> DriverResult<ElementHandle> {
        self.find(locator)
    }

    fn wait_until(
        &mut self,
        locator: &Locator,
        condition: Condition,
        _timeout: Duration,
    ) -> DriverResult<ElementHandle> {
        let mut state = self.state.borrow_mut();
        if state.broken_session {
            return Err(DriverError::SessionClosed);
        }
        let Some(element) = state.elements.get(&locator.xpath) else {
            return Err(Self::timeout(locator, condition));
        };
        let (id, present, threshold) = match condition {
            Condition::Visible => (element.id.clone(), element.present, element.visible_on_probe),
            Condition::Clickable => (
                element.id.clone(),
                element.present,
                element.clickable_on_probe,
            ),
        };
        let probes = match condition {
            Condition::Visible => &mut state.visible_probes,
            Condition::Clickable => &mut state.clickable_probes,
        };
        let seen = probes.entry(locator.xpath.clone()).or_insert(0);
        *seen += 1;
        if present && *seen >= threshold {
            Ok(ElementHandle { id })
        } else {
            Err(Self::timeout(locator, condition))
        }
    }

    fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.clicked.push(element.id.clone());
        if let Some(revealed) = state.reveal_on_click.get(&element.id).cloned() {
            for xpath in revealed {
                if let Some(entry) = state.elements.get_mut(&xpath) {
                    entry.present = true;
                }
            }
        }
        if let Some(new_text) = state.text_after_click.get(&element.id).cloned() {
            for entry in state.elements.values_mut() {
                if entry.id == element.id {
                    entry.text = new_text.clone();
                }
            }
        }
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.state
            .borrow_mut()
            .keys_sent
            .push((element.id.clone(), text.into()));
        Ok(())
    }

    fn text(&mut self, element: &ElementHandle) -> DriverResult<String> {
        let state = self.state.borrow();
        state
            .elements
            .values()
            .find(|entry| entry.id == element.id)
            .map(|entry| entry.text.clone())
            .ok_or_else(|| DriverError::NotFound {
                locator: format!("element id {}", element.id),
            })
    }

    fn refresh(&mut self) -> DriverResult<()> {
        self.state.borrow_mut().refreshes += 1;
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        if state.fail_close {
            return Err(DriverError::Protocol("close failed".into()));
        }
        Ok(())
    }
}

/// Deterministic clock: `sleep` advances `now` by the slept amount and
/// records every nap.
pub struct MockClock {
    now: RefCell<NaiveDateTime>,
    naps: RefCell<Vec<Duration>>,
}

impl MockClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: RefCell::new(now),
            naps: RefCell::new(Vec::new()),
        }
    }

    pub fn naps(&self) -> Vec<Duration> {
        self.naps.borrow().clone()
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.borrow()
    }

    fn sleep(&self, duration: Duration) {
        self.naps.borrow_mut().push(duration);
        let mut now = self.now.borrow_mut();
        *now += ChronoDuration::from_std(duration).expect("nap fits in chrono range");
    }
}

/// Captures every message the supervisor sends.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.borrow_mut().push(message.into());
        Ok(())
    }
}

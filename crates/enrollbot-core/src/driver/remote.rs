//! W3C WebDriver wire-protocol client.
//!
//! Speaks the plain HTTP endpoint of a chromedriver process. Only the
//! commands the enrollment pipeline needs are implemented; `wait_until`
//! is a bounded client-side poll over the element's displayed/enabled
//! state.

use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::debug;

use super::{BrowserDriver, Condition, DriverResult, ElementHandle, Locator};
use crate::error::DriverError;

/// JSON key under which the W3C protocol reports element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A remote browser session behind a WebDriver endpoint.
pub struct RemoteDriver {
    http: Client,
    rt: Runtime,
    base: String,
    session: Option<String>,
}

/// Error object from a WebDriver error response.
struct WireError {
    error: String,
    message: String,
}

impl From<WireError> for DriverError {
    fn from(wire: WireError) -> Self {
        DriverError::Protocol(format!("{}: {}", wire.error, wire.message))
    }
}

impl RemoteDriver {
    /// Open a fresh browser session against a WebDriver endpoint.
    ///
    /// The session runs incognito so a previous profile's login state
    /// cannot leak into the authentication probe.
    pub fn new_session(endpoint: &str, headless: bool) -> DriverResult<Self> {
        let mut args = vec![
            "--disable-extensions",
            "--disable-dev-shm-usage",
            "--no-sandbox",
            "--window-size=1920,1080",
            "--incognito",
        ];
        if headless {
            args.push("--headless=new");
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let http = Client::builder()
            .build()
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        let rt = Runtime::new().map_err(|e| DriverError::Protocol(e.to_string()))?;
        let mut driver = Self {
            http,
            rt,
            base: endpoint.trim_end_matches('/').to_string(),
            session: None,
        };

        let value = driver
            .command(Method::POST, "/session", Some(capabilities))
            .map_err(DriverError::from)?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DriverError::Protocol("new session response carries no sessionId".into())
            })?
            .to_string();
        debug!(%session_id, "webdriver session started");
        driver.session = Some(session_id);
        Ok(driver)
    }

    fn session_path(&self, suffix: &str) -> DriverResult<String> {
        let session = self.session.as_deref().ok_or(DriverError::SessionClosed)?;
        Ok(format!("/session/{session}{suffix}"))
    }

    /// Issue one wire command and unwrap the protocol's `value` envelope.
    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, WireError> {
        let url = format!("{}{}", self.base, path);
        let request = self.http.request(method.clone(), &url);
        let request = if method == Method::POST {
            // POST commands must carry a JSON body, `{}` when there are
            // no parameters.
            request.json(&body.unwrap_or_else(|| json!({})))
        } else {
            request
        };

        let response = self.rt.block_on(request.send()).map_err(|e| WireError {
            error: "transport failure".into(),
            message: e.to_string(),
        })?;
        let status = response.status();
        let payload: Value = self.rt.block_on(response.json()).map_err(|e| WireError {
            error: "malformed response".into(),
            message: e.to_string(),
        })?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            Ok(value)
        } else {
            Err(WireError {
                error: value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        }
    }

    fn find_element_at(&self, path: &str, locator: &Locator) -> DriverResult<ElementHandle> {
        let body = json!({ "using": "xpath", "value": locator.xpath });
        match self.command(Method::POST, path, Some(body)) {
            Ok(value) => {
                let id = value
                    .get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        DriverError::Protocol("find response carries no element reference".into())
                    })?;
                Ok(ElementHandle { id: id.to_string() })
            }
            Err(wire) if wire.error == "no such element" => Err(DriverError::NotFound {
                locator: locator.to_string(),
            }),
            Err(wire) => Err(wire.into()),
        }
    }

    fn element_state(&self, element: &ElementHandle, probe: &str) -> DriverResult<bool> {
        let path = self.session_path(&format!("/element/{}/{probe}", element.id))?;
        let value = self
            .command(Method::GET, &path, None)
            .map_err(DriverError::from)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// One non-waiting condition check: `Ok(None)` means the element is
    /// there but not yet in the requested state.
    fn check_once(
        &self,
        locator: &Locator,
        condition: Condition,
    ) -> DriverResult<Option<ElementHandle>> {
        let path = self.session_path("/element")?;
        let element = self.find_element_at(&path, locator)?;
        let satisfied = match condition {
            Condition::Visible => self.element_state(&element, "displayed")?,
            Condition::Clickable => {
                self.element_state(&element, "displayed")?
                    && self.element_state(&element, "enabled")?
            }
        };
        Ok(satisfied.then_some(element))
    }
}

impl BrowserDriver for RemoteDriver {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let path = self.session_path("/url")?;
        self.command(Method::POST, &path, Some(json!({ "url": url })))
            .map_err(DriverError::from)?;
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> DriverResult<ElementHandle> {
        let path = self.session_path("/element")?;
        self.find_element_at(&path, locator)
    }

    fn find_within(
        &mut self,
        scope: &ElementHandle,
        locator: &Locator,
    ) -> DriverResult<ElementHandle> {
        let path = self.session_path(&format!("/element/{}/element", scope.id))?;
        self.find_element_at(&path, locator)
    }

    fn wait_until(
        &mut self,
        locator: &Locator,
        condition: Condition,
        timeout: Duration,
    ) -> DriverResult<ElementHandle> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.check_once(locator, condition) {
                Ok(Some(element)) => return Ok(element),
                Ok(None) | Err(DriverError::NotFound { .. }) => {}
                Err(other) => return Err(other),
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    locator: locator.to_string(),
                    condition: condition.as_str(),
                    waited: timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        let path = self.session_path(&format!("/element/{}/click", element.id))?;
        self.command(Method::POST, &path, None)
            .map_err(DriverError::from)?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let path = self.session_path(&format!("/element/{}/value", element.id))?;
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .map_err(DriverError::from)?;
        Ok(())
    }

    fn text(&mut self, element: &ElementHandle) -> DriverResult<String> {
        let path = self.session_path(&format!("/element/{}/text", element.id))?;
        let value = self
            .command(Method::GET, &path, None)
            .map_err(DriverError::from)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn refresh(&mut self) -> DriverResult<()> {
        let path = self.session_path("/refresh")?;
        self.command(Method::POST, &path, None)
            .map_err(DriverError::from)?;
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        self.command(Method::DELETE, &format!("/session/{session}"), None)
            .map_err(DriverError::from)?;
        debug!(session_id = %session, "webdriver session released");
        Ok(())
    }
}

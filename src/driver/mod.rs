//! The browser surface the resolver, page objects and scenarios consume.

mod cdp;
#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod fake_store;

pub use cdp::EokaDriver;

use std::time::Duration;

use serde::Deserialize;

use crate::locator::Locator;
use crate::{Error, Result};

/// Handle to an element found on the live page.
///
/// `selector` is a unique CSS path computed in the page when the element was
/// found; it stays valid until the page re-renders that part of the DOM.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Element {
    pub selector: String,
    pub tag: String,
    /// First characters of the element text, for logging.
    #[serde(default)]
    pub text: String,
}

/// Operations a browser session exposes.
///
/// Every method is a single round trip to the page except
/// [`Driver::poll_for_presence`], which repeats [`Driver::find`] until an
/// element shows up or the timeout elapses.
#[allow(async_fn_in_trait)]
pub trait Driver {
    async fn open(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Visible text of the whole document body.
    async fn page_text(&self) -> Result<String>;

    /// One presence probe. `Ok(None)` when nothing matches right now,
    /// `Err(Error::InvalidLocator)` when the page rejects the selector.
    async fn find(&self, locator: &Locator) -> Result<Option<Element>>;

    async fn text(&self, element: &Element) -> Result<String>;

    /// Attribute value; live DOM properties (`value`, `checked`) win over
    /// the markup attribute.
    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&self, element: &Element) -> Result<bool>;

    /// Checked state of a checkbox or radio button.
    async fn is_selected(&self, element: &Element) -> Result<bool>;

    async fn click(&self, element: &Element) -> Result<()>;

    /// Type into the element, appending to its current value.
    async fn send_text(&self, element: &Element, text: &str) -> Result<()>;

    async fn clear(&self, element: &Element) -> Result<()>;

    async fn scroll_into_view(&self, element: &Element) -> Result<()>;

    async fn execute(&self, js: &str) -> Result<serde_json::Value>;

    /// Drop cookies, `localStorage` and `sessionStorage` for the current site.
    async fn clear_site_data(&self) -> Result<()>;

    /// PNG screenshot of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn quit(self) -> Result<()>
    where
        Self: Sized;

    /// Probe for `locator` every `interval` until it is present or `timeout`
    /// elapses. The probe in flight when the timer fires is abandoned, so the
    /// call never outlives `timeout`.
    async fn poll_for_presence(
        &self,
        locator: &Locator,
        timeout: Duration,
        interval: Duration,
    ) -> Result<Option<Element>> {
        let probe = async {
            loop {
                if let Some(element) = self.find(locator).await? {
                    return Ok::<_, Error>(Some(element));
                }
                tokio::time::sleep(interval).await;
            }
        };
        match tokio::time::timeout(timeout, probe).await {
            Ok(found) => found,
            Err(_) => Ok(None),
        }
    }
}

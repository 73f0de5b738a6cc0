//! One browser session owned by one scenario.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::SuiteConfig;
use crate::driver::{Driver, Element, EokaDriver};
use crate::locator::{Locator, LocatorSet};
use crate::resolver::{Lookup, Resolver};
use crate::{wait, Error, Result};

/// A driver plus the configuration every page object needs: base URL,
/// lookup timings and per-element locator overrides.
pub struct Session<D: Driver = EokaDriver> {
    driver: D,
    config: SuiteConfig,
    resolver: Resolver,
    overrides: HashMap<String, Vec<Locator>>,
}

impl Session<EokaDriver> {
    /// Launch a browser for `config`.
    pub async fn launch(config: &SuiteConfig) -> Result<Self> {
        let driver = EokaDriver::launch(&config.browser).await?;
        Ok(Self::new(driver, config))
    }
}

impl<D: Driver> Session<D> {
    pub fn new(driver: D, config: &SuiteConfig) -> Self {
        let overrides = config
            .locators
            .iter()
            .map(|(name, patterns)| {
                let locators = patterns.iter().map(|p| Locator::parse(p)).collect();
                (name.clone(), locators)
            })
            .collect();

        Self {
            driver,
            config: config.clone(),
            resolver: Resolver::from_config(&config.resolver),
            overrides,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Limit for page loads, navigations and other UI transitions.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.config.resolver.wait_timeout_ms)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.resolver.poll_interval_ms)
    }

    /// `set` with any configured overrides for its name tried first.
    pub fn effective(&self, set: &LocatorSet) -> LocatorSet {
        match self.overrides.get(set.name()) {
            Some(extra) => set.preceded_by(extra.iter().cloned()),
            None => set.clone(),
        }
    }

    // ---- navigation ----

    /// Open an absolute URL, or a path relative to the base URL.
    pub async fn open(&self, target: &str) -> Result<()> {
        let url = self.config.url(target);
        debug!("Opening {}", url);
        self.driver.open(&url).await
    }

    pub async fn home(&self) -> Result<()> {
        let base = self.config.base_url.clone();
        self.open(&base).await
    }

    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url().await
    }

    pub async fn page_text(&self) -> Result<String> {
        self.driver.page_text().await
    }

    // ---- lookup ----

    pub async fn find(&self, set: &LocatorSet) -> Result<Lookup> {
        self.resolver.resolve(&self.driver, &self.effective(set)).await
    }

    /// Like [`Session::find`] with a different per-candidate wait, for
    /// checks that expect absence.
    pub async fn find_within(&self, set: &LocatorSet, timeout: Duration) -> Result<Lookup> {
        self.resolver
            .with_timeout(timeout)
            .resolve(&self.driver, &self.effective(set))
            .await
    }

    pub async fn require(&self, set: &LocatorSet) -> Result<Element> {
        self.resolver.require(&self.driver, &self.effective(set)).await
    }

    pub async fn is_present(&self, set: &LocatorSet) -> Result<bool> {
        Ok(self.find(set).await?.is_found())
    }

    /// Single immediate probe of every candidate, no waiting.
    pub async fn is_present_now(&self, set: &LocatorSet) -> Result<bool> {
        Ok(self
            .resolver
            .scan(&self.driver, &self.effective(set))
            .await?
            .is_found())
    }

    pub async fn is_present_within(&self, set: &LocatorSet, timeout: Duration) -> Result<bool> {
        Ok(self.find_within(set, timeout).await?.is_found())
    }

    // ---- interaction ----

    pub async fn click(&self, set: &LocatorSet) -> Result<()> {
        let element = self.require(set).await?;
        debug!("Clicking {} ({})", set.name(), element.selector);
        self.driver.click(&element).await
    }

    /// Replace the field's value with `text`.
    pub async fn fill(&self, set: &LocatorSet, text: &str) -> Result<()> {
        let element = self.require(set).await?;
        self.driver.clear(&element).await?;
        if !text.is_empty() {
            self.driver.send_text(&element, text).await?;
        }
        Ok(())
    }

    pub async fn text_of(&self, set: &LocatorSet) -> Result<String> {
        let element = self.require(set).await?;
        self.driver.text(&element).await
    }

    /// Current `value` of an input, empty when it has none.
    pub async fn value_of(&self, set: &LocatorSet) -> Result<String> {
        let element = self.require(set).await?;
        Ok(self
            .driver
            .attribute(&element, "value")
            .await?
            .unwrap_or_default())
    }

    pub async fn is_checked(&self, set: &LocatorSet) -> Result<bool> {
        let element = self.require(set).await?;
        self.driver.is_selected(&element).await
    }

    pub async fn scroll_to(&self, set: &LocatorSet) -> Result<()> {
        let element = self.require(set).await?;
        self.driver.scroll_into_view(&element).await
    }

    // ---- waits ----

    /// Poll `condition` with the session's wait timeout and poll interval.
    pub async fn wait_until<F, Fut>(&self, description: &str, condition: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        wait::until(self.wait_timeout(), self.poll_interval(), description, condition).await
    }

    /// Wait for `document.readyState` to reach `complete`.
    pub async fn wait_until_ready(&self) -> Result<()> {
        let driver = &self.driver;
        self.wait_until("page to finish loading", || async move {
            Ok(driver.execute("document.readyState").await? == "complete")
        })
        .await
    }

    /// Wait for the current URL to satisfy `accept` and return it.
    pub async fn wait_for_url<F>(&self, description: &str, accept: F) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        let seen = RefCell::new(String::new());
        let (driver, seen_ref, accept) = (&self.driver, &seen, &accept);
        wait::until(
            self.wait_timeout(),
            self.poll_interval(),
            description,
            || async move {
                let url = driver.current_url().await?;
                let ok = accept(&url);
                *seen_ref.borrow_mut() = url;
                Ok(ok)
            },
        )
        .await
        .map_err(|e| match e {
            Error::Timeout(msg) => Error::Timeout(format!("{} (last URL: {})", msg, seen.borrow())),
            other => other,
        })?;
        Ok(seen.into_inner())
    }

    /// Wait until some candidate of `set` is present and displayed.
    pub async fn wait_until_visible(&self, set: &LocatorSet) -> Result<Element> {
        let set = self.effective(set);
        let found = RefCell::new(None);
        let (this, set_ref, slot) = (self, &set, &found);
        let description = format!("{} to become visible", set.name());

        wait::until(
            self.wait_timeout(),
            self.poll_interval(),
            &description,
            || async move {
                let Some(element) = this.resolver.scan(&this.driver, set_ref).await?.into_element()
                else {
                    return Ok(false);
                };
                let visible = match this.driver.is_displayed(&element).await {
                    Ok(visible) => visible,
                    // Re-rendered between the probe and the check
                    Err(Error::ActionFailed(_)) => false,
                    Err(e) => return Err(e),
                };
                if visible {
                    *slot.borrow_mut() = Some(element);
                }
                Ok(visible)
            },
        )
        .await?;

        found
            .into_inner()
            .ok_or_else(|| Error::ActionFailed(format!("{} vanished", set.name())))
    }

    /// Wait until any of `sets` is present; returns the index of the first
    /// one found on the earliest poll that finds something.
    pub async fn wait_for_any(&self, sets: &[&LocatorSet]) -> Result<usize> {
        let sets: Vec<LocatorSet> = sets.iter().map(|s| self.effective(s)).collect();
        let hit = RefCell::new(None);
        let (this, sets_ref, slot) = (self, &sets, &hit);
        let names: Vec<&str> = sets.iter().map(|s| s.name()).collect();
        let description = format!("any of: {}", names.join(", "));

        wait::until(
            self.wait_timeout(),
            self.poll_interval(),
            &description,
            || async move {
                for (i, set) in sets_ref.iter().enumerate() {
                    if this.resolver.scan(&this.driver, set).await?.is_found() {
                        *slot.borrow_mut() = Some(i);
                        return Ok(true);
                    }
                }
                Ok(false)
            },
        )
        .await?;

        hit.into_inner()
            .ok_or_else(|| Error::ActionFailed("no element matched".into()))
    }

    // ---- housekeeping ----

    /// Drop cookies and web storage for the current site.
    pub async fn clear_browser_data(&self) -> Result<()> {
        self.driver.clear_site_data().await
    }

    /// Start from a clean slate: load the store, clear its data, then load
    /// the home page again past any cache.
    pub async fn reload_fresh(&self) -> Result<()> {
        self.home().await?;
        self.clear_browser_data().await?;

        let base = &self.config.base_url;
        let separator = if base.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}cb={}&nocache=1",
            base,
            separator,
            chrono::Utc::now().timestamp_millis()
        );
        self.open(&url).await?;
        self.wait_until_ready().await?;
        info!("Loaded {} with fresh browser data", base);
        Ok(())
    }

    /// Write a PNG of the viewport to `path`, creating parent directories.
    pub async fn save_screenshot(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let data = self.driver.screenshot().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;
        Ok(path.to_path_buf())
    }

    pub async fn close(self) -> Result<()> {
        self.driver.quit().await
    }
}

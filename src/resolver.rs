//! Resilient element lookup: try each candidate locator in order, each with
//! its own short wait, and stop at the first one present on the page.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::driver::{Driver, Element};
use crate::locator::{Locator, LocatorSet};
use crate::{Error, Result};

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub element: Element,
    /// Index of the matching locator within its set.
    pub position: usize,
    pub locator: Locator,
}

/// Outcome of resolving a [`LocatorSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Match),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn element(&self) -> Option<&Element> {
        match self {
            Lookup::Found(m) => Some(&m.element),
            Lookup::NotFound => None,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Lookup::Found(m) => Some(m.position),
            Lookup::NotFound => None,
        }
    }

    pub fn into_element(self) -> Option<Element> {
        match self {
            Lookup::Found(m) => Some(m.element),
            Lookup::NotFound => None,
        }
    }
}

/// Multi-locator fallback lookup.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    attempt_timeout: Duration,
    poll_interval: Duration,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl Resolver {
    pub fn new(attempt_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            attempt_timeout,
            poll_interval,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(
            Duration::from_millis(config.attempt_timeout_ms),
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    /// Same polling, different per-locator wait.
    pub fn with_timeout(self, attempt_timeout: Duration) -> Self {
        Self {
            attempt_timeout,
            ..self
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Upper bound on how long resolving `set` can wait.
    pub fn budget(&self, set: &LocatorSet) -> Duration {
        let candidates = u32::try_from(set.len()).unwrap_or(u32::MAX);
        self.attempt_timeout.saturating_mul(candidates)
    }

    /// Resolve `set` against the live page.
    ///
    /// Absence is `Ok(Lookup::NotFound)`, never an error. Malformed locators
    /// are skipped. `Err` only surfaces driver failures.
    pub async fn resolve<D: Driver>(&self, driver: &D, set: &LocatorSet) -> Result<Lookup> {
        for (position, locator) in set.locators().iter().enumerate() {
            if let Err(e) = locator.validate() {
                warn!("{}: skipping candidate {}: {}", set.name(), position + 1, e);
                continue;
            }

            match driver
                .poll_for_presence(locator, self.attempt_timeout, self.poll_interval)
                .await
            {
                Ok(Some(element)) => {
                    debug!(
                        "{}: found via {} (candidate {}/{})",
                        set.name(),
                        locator,
                        position + 1,
                        set.len()
                    );
                    return Ok(Lookup::Found(Match {
                        element,
                        position,
                        locator: locator.clone(),
                    }));
                }
                Ok(None) => {
                    debug!(
                        "{}: {} not present within {:?}",
                        set.name(),
                        locator,
                        self.attempt_timeout
                    );
                }
                Err(Error::InvalidLocator(reason)) => {
                    warn!("{}: skipping candidate {}: {}", set.name(), position + 1, reason);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("{}: no candidate matched", set.name());
        Ok(Lookup::NotFound)
    }

    /// One immediate probe per candidate, in order, with no waiting. Used by
    /// callers that run their own polling loop.
    pub async fn scan<D: Driver>(&self, driver: &D, set: &LocatorSet) -> Result<Lookup> {
        for (position, locator) in set.locators().iter().enumerate() {
            if let Err(e) = locator.validate() {
                debug!("{}: skipping candidate {}: {}", set.name(), position + 1, e);
                continue;
            }
            match driver.find(locator).await {
                Ok(Some(element)) => {
                    return Ok(Lookup::Found(Match {
                        element,
                        position,
                        locator: locator.clone(),
                    }))
                }
                Ok(None) => {}
                Err(Error::InvalidLocator(reason)) => {
                    debug!("{}: skipping candidate {}: {}", set.name(), position + 1, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Lookup::NotFound)
    }

    /// Resolve `set`, treating absence as a failure naming the element.
    pub async fn require<D: Driver>(&self, driver: &D, set: &LocatorSet) -> Result<Element> {
        let start = Instant::now();
        match self.resolve(driver, set).await? {
            Lookup::Found(m) => Ok(m.element),
            Lookup::NotFound => Err(Error::ElementNotFound {
                element: set.name().to_string(),
                candidates: set.len(),
                waited_ms: start.elapsed().as_millis() as u64,
            }),
        }
    }

    pub async fn is_present<D: Driver>(&self, driver: &D, set: &LocatorSet) -> Result<bool> {
        Ok(self.resolve(driver, set).await?.is_found())
    }
}

//! Page objects for the storefront.
//!
//! Each page owns the [`LocatorSet`]s for its elements, built once in `new()`,
//! and exposes the user-level operations the scenarios need. Lookups go through
//! the [`Session`], so configured locator overrides apply everywhere.

mod account;
mod forgotten;
mod home;
mod login;
mod register;

pub use account::{AccountPage, LogoutPage};
pub use forgotten::{ForgottenPasswordPage, Submission};
pub use home::HomePage;
pub use login::{LoginOutcome, LoginPage};
pub use register::{RegistrationForm, RegistrationPage};

use std::time::Duration;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::driver::Driver;
use crate::locator::{Locator, LocatorSet};
use crate::resolver::Lookup;
use crate::session::Session;
use crate::{Error, Result};

/// A page or page region with a recognizable URL and a set of elements that
/// must be present once it has loaded.
#[allow(async_fn_in_trait)]
pub trait PageObject {
    /// Page name for logs and failure messages.
    fn name(&self) -> &'static str;

    /// Any one of these must appear in the lowercase URL. Empty accepts any URL.
    fn url_markers(&self) -> &[&'static str] {
        &[]
    }

    fn required_elements(&self) -> Vec<&LocatorSet>;

    /// Wait for the document, check the URL, then require every element.
    async fn verify_loaded<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        session.wait_until_ready().await?;

        let markers = self.url_markers();
        if !markers.is_empty() {
            let url = session.current_url().await?;
            let lower = url.to_lowercase();
            if !markers.iter().any(|m| lower.contains(m)) {
                return Err(Error::AssertionFailed(format!(
                    "not on the {}: current URL is {}",
                    self.name(),
                    url
                )));
            }
        }

        for set in self.required_elements() {
            session.require(set).await.map_err(|e| match e {
                Error::ElementNotFound { .. } => {
                    Error::AssertionFailed(format!("{} not loaded: {}", self.name(), e))
                }
                other => other,
            })?;
        }

        debug!("{} loaded", self.name());
        Ok(())
    }
}

/// Presence of one logical element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub element: String,
    /// Locator that matched, `None` when every candidate failed.
    pub found_by: Option<Locator>,
}

/// Presence of a group of elements, e.g. everything in the top bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceReport {
    pub entries: Vec<Presence>,
}

impl PresenceReport {
    /// Resolve every set in turn.
    pub async fn collect<D: Driver>(session: &Session<D>, sets: &[&LocatorSet]) -> Result<Self> {
        let mut entries = Vec::with_capacity(sets.len());
        for set in sets {
            let found_by = match session.find(set).await? {
                Lookup::Found(m) => Some(m.locator),
                Lookup::NotFound => None,
            };
            entries.push(Presence {
                element: set.name().to_string(),
                found_by,
            });
        }
        Ok(Self { entries })
    }

    pub fn all_present(&self) -> bool {
        self.entries.iter().all(|e| e.found_by.is_some())
    }

    pub fn missing(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.found_by.is_none())
            .map(|e| e.element.as_str())
            .collect()
    }

    /// Fail naming every missing element of `area`.
    pub fn ensure_complete(&self, area: &str) -> Result<()> {
        if self.all_present() {
            return Ok(());
        }
        Err(Error::AssertionFailed(format!(
            "{}: missing {}",
            area,
            self.missing().join(", ")
        )))
    }
}

/// Whole-word, case-insensitive keyword search over page text.
///
/// Only a secondary signal: structured checks (alerts, URLs) come first, and
/// a hit here is logged as a heuristic result.
#[derive(Debug, Clone)]
pub struct Keywords {
    pattern: Regex,
}

impl Keywords {
    pub fn new(words: &[&str]) -> Result<Self> {
        let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("keyword pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// First keyword found in `text`, lowercased.
    pub fn find_in(&self, text: &str) -> Option<String> {
        self.pattern.find(text).map(|m| m.as_str().to_lowercase())
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Text of the first of `alerts` present within `timeout`.
pub(crate) async fn alert_text<D: Driver>(
    session: &Session<D>,
    alerts: &[&LocatorSet],
    timeout: Duration,
) -> Result<Option<String>> {
    for set in alerts {
        if session.is_present_within(set, timeout).await? {
            return Ok(Some(session.text_of(set).await?));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_whole_words_only() {
        let kw = Keywords::new(&["warning", "no match", "e-mail"]).unwrap();
        assert_eq!(
            kw.find_in("Warning: No match for E-Mail Address and/or Password."),
            Some("warning".into())
        );
        assert!(kw.matches("there is NO MATCH here"));
        assert!(kw.matches("Your e-mail is wrong"));
        // Substrings do not count
        assert!(!kw.matches("forewarnings"));
        assert!(!kw.matches("email"));
    }

    #[test]
    fn report_lists_missing_elements() {
        let report = PresenceReport {
            entries: vec![
                Presence {
                    element: "Logo".into(),
                    found_by: Some(Locator::css("#logo")),
                },
                Presence {
                    element: "Cart summary".into(),
                    found_by: None,
                },
                Presence {
                    element: "Search button".into(),
                    found_by: None,
                },
            ],
        };

        assert!(!report.all_present());
        assert_eq!(report.missing(), vec!["Cart summary", "Search button"]);
        let err = report.ensure_complete("Header").unwrap_err();
        assert_eq!(
            err.to_string(),
            "assertion failed: Header: missing Cart summary, Search button"
        );
    }
}

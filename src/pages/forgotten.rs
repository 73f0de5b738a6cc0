use std::time::Duration;

use tracing::{debug, info};

use super::{alert_text, Keywords, PageObject};
use crate::driver::Driver;
use crate::locator::LocatorSet;
use crate::session::Session;
use crate::{Error, Result};

// The form's own instructions mention e-mail, reset and link
const CONFIRMATION_WORDS: &[&str] = &["sent", "check", "inbox", "confirmation"];

/// Result of a password reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The store acknowledged the request; the text says how.
    Confirmed(String),
    NotConfirmed,
}

#[derive(Debug, Clone)]
pub struct ForgottenPasswordPage {
    pub email: LocatorSet,
    pub continue_button: LocatorSet,
    pub back_button: LocatorSet,
    pub breadcrumb: LocatorSet,
    pub alert_success: LocatorSet,
    pub alert_danger: LocatorSet,
    pub alert_warning: LocatorSet,
}

impl Default for ForgottenPasswordPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ForgottenPasswordPage {
    pub fn new() -> Self {
        Self {
            email: LocatorSet::parse("E-Mail input", &["id:input-email", "name:email"]),
            continue_button: LocatorSet::parse(
                "Continue button",
                &[
                    "css:input[value='Continue']",
                    "xpath://button[normalize-space()='Continue']",
                    "css:form button[type='submit']",
                ],
            ),
            back_button: LocatorSet::parse("Back button", &["link:Back"]),
            breadcrumb: LocatorSet::parse("Breadcrumb", &["css:.breadcrumb"]),
            alert_success: LocatorSet::parse("Success alert", &["css:.alert.alert-success"]),
            alert_danger: LocatorSet::parse("Error alert", &["css:.alert.alert-danger"]),
            alert_warning: LocatorSet::parse("Warning alert", &["css:.alert.alert-warning"]),
        }
    }

    /// Request a reset link for `email`, then wait for the store to react.
    pub async fn submit<D: Driver>(&self, session: &Session<D>, email: &str) -> Result<()> {
        if let Ok(text) = session.text_of(&self.breadcrumb).await {
            debug!("Breadcrumb: {}", text);
        }
        session.fill(&self.email, email).await?;
        session.click(&self.continue_button).await?;
        info!("Requested a password reset for {}", email);

        let alerts = [&self.alert_success, &self.alert_danger, &self.alert_warning];
        let waited = session
            .wait_until("password reset request to be processed", || async move {
                let url = session.current_url().await?.to_lowercase();
                if !url.contains("forgotten") {
                    return Ok(true);
                }
                for alert in alerts {
                    if session.is_present_now(alert).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            })
            .await;
        match waited {
            // The outcome checks decide what silence means
            Err(Error::Timeout(msg)) => {
                debug!("No reaction to the reset request: {}", msg);
                Ok(())
            }
            other => other,
        }
    }

    /// Success alert, a redirect to the login page, or, as a last resort, a
    /// confirmation word in the page text. An error alert rules out the
    /// text check.
    pub async fn submission_outcome<D: Driver>(&self, session: &Session<D>) -> Result<Submission> {
        let timeout = session.resolver().attempt_timeout();
        if let Some(text) = alert_text(session, &[&self.alert_success], timeout).await? {
            return Ok(Submission::Confirmed(format!("success alert: {}", text)));
        }

        let url = session.current_url().await?.to_lowercase();
        if url.contains("login") && !url.contains("forgotten") {
            return Ok(Submission::Confirmed("redirected to the login page".into()));
        }

        for alert in [&self.alert_danger, &self.alert_warning] {
            if session.is_present_now(alert).await? {
                debug!("{} shown after the reset request", alert.name());
                return Ok(Submission::NotConfirmed);
            }
        }

        let text = session.page_text().await?;
        if let Some(word) = Keywords::new(CONFIRMATION_WORDS)?.find_in(&text) {
            info!("Heuristic: page text mentions '{}'", word);
            return Ok(Submission::Confirmed(format!("page text mentions '{}'", word)));
        }
        Ok(Submission::NotConfirmed)
    }

    pub async fn error_message<D: Driver>(&self, session: &Session<D>) -> Result<Option<String>> {
        alert_text(
            session,
            &[&self.alert_danger, &self.alert_warning],
            Duration::from_secs(1),
        )
        .await
    }
}

impl PageObject for ForgottenPasswordPage {
    fn name(&self) -> &'static str {
        "forgotten password page"
    }

    fn url_markers(&self) -> &[&'static str] {
        &["forgotten", "password"]
    }

    fn required_elements(&self) -> Vec<&LocatorSet> {
        vec![&self.email, &self.continue_button]
    }
}

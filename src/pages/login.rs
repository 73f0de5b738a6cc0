use tracing::{debug, info, warn};

use super::{alert_text, PageObject};
use crate::driver::Driver;
use crate::locator::LocatorSet;
use crate::session::Session;
use crate::{Error, Result};

/// What the store did with a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Redirected away from the login page without an error.
    Succeeded,
    /// Refused with this alert text.
    Rejected(String),
    /// Still on the login page and no alert was shown.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct LoginPage {
    pub new_customer: LocatorSet,
    pub returning_customer: LocatorSet,
    pub email: LocatorSet,
    pub password: LocatorSet,
    pub login_button: LocatorSet,
    pub forgotten_password: LocatorSet,
    pub alert_danger: LocatorSet,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            new_customer: LocatorSet::parse(
                "New Customer heading",
                &["xpath://h2[text()='New Customer']", "text:New Customer"],
            ),
            returning_customer: LocatorSet::parse(
                "Returning Customer heading",
                &["xpath://h2[text()='Returning Customer']", "text:Returning Customer"],
            ),
            email: LocatorSet::parse("E-Mail input", &["id:input-email", "name:email"]),
            password: LocatorSet::parse("Password input", &["id:input-password", "name:password"]),
            login_button: LocatorSet::parse(
                "Login button",
                &[
                    "css:input[value='Login']",
                    "xpath://button[normalize-space()='Login']",
                    "css:#form-login button[type='submit']",
                ],
            ),
            forgotten_password: LocatorSet::parse(
                "Forgotten Password link",
                &["link:Forgotten Password", "partial_link:Forgotten"],
            ),
            alert_danger: LocatorSet::parse(
                "Login error alert",
                &["css:.alert.alert-danger", "css:.alert-danger"],
            ),
        }
    }

    /// Submit the form and wait until the store has answered: either the URL
    /// leaves the login page or an error alert appears. Silence is left for
    /// [`outcome`](Self::outcome) to judge.
    pub async fn login<D: Driver>(
        &self,
        session: &Session<D>,
        email: &str,
        password: &str,
    ) -> Result<()> {
        info!("Logging in as {}", email);
        session.fill(&self.email, email).await?;
        session.fill(&self.password, password).await?;
        session.click(&self.login_button).await?;

        let alert = &self.alert_danger;
        let waited = session
            .wait_until("login form to be processed", || async move {
                let url = session.current_url().await?.to_lowercase();
                Ok(!url.contains("login") || session.is_present_now(alert).await?)
            })
            .await;
        match waited {
            Err(Error::Timeout(msg)) => {
                debug!("No reaction to the login form: {}", msg);
                Ok(())
            }
            other => other,
        }
    }

    pub async fn outcome<D: Driver>(&self, session: &Session<D>) -> Result<LoginOutcome> {
        let timeout = session.resolver().attempt_timeout();
        if let Some(message) = alert_text(session, &[&self.alert_danger], timeout).await? {
            warn!("Login refused: {}", message);
            return Ok(LoginOutcome::Rejected(message));
        }

        let url = session.current_url().await?;
        if !url.to_lowercase().contains("login") {
            info!("Login succeeded, now at {}", url);
            return Ok(LoginOutcome::Succeeded);
        }
        Ok(LoginOutcome::Unknown)
    }

    pub async fn open_forgotten_password<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        session.click(&self.forgotten_password).await?;
        session
            .wait_for_url("forgotten password page to open", |u| {
                u.to_lowercase().contains("forgotten")
            })
            .await?;
        Ok(())
    }
}

impl PageObject for LoginPage {
    fn name(&self) -> &'static str {
        "login page"
    }

    fn url_markers(&self) -> &[&'static str] {
        &["login"]
    }

    fn required_elements(&self) -> Vec<&LocatorSet> {
        vec![
            &self.new_customer,
            &self.returning_customer,
            &self.email,
            &self.password,
            &self.login_button,
        ]
    }
}

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use super::{alert_text, Keywords, PageObject};
use crate::config::Registration;
use crate::driver::Driver;
use crate::locator::LocatorSet;
use crate::session::Session;
use crate::{Error, Result};

/// Wait used where absence is the likely answer.
const QUICK: Duration = Duration::from_secs(1);

const SUCCESS_WORDS: &[&str] = &[
    "congratulations",
    "account has been created",
    "successfully",
    "welcome",
];

/// Input id suffix and label of each field that can carry an inline error.
const FIELDS: &[(&str, &str)] = &[
    ("firstname", "First Name"),
    ("lastname", "Last Name"),
    ("email", "E-Mail"),
    ("telephone", "Telephone"),
    ("password", "Password"),
    ("confirm", "Password Confirm"),
];

/// Values to type into the registration form. `None` leaves a field as it
/// is; `Some("")` clears it. The password also goes into the confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub password: Option<String>,
}

impl From<&Registration> for RegistrationForm {
    fn from(r: &Registration) -> Self {
        Self {
            first_name: Some(r.first_name.clone()),
            last_name: Some(r.last_name.clone()),
            email: Some(r.email.clone()),
            telephone: Some(r.telephone.clone()),
            password: Some(r.password.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationPage {
    pub first_name: LocatorSet,
    pub last_name: LocatorSet,
    pub email: LocatorSet,
    pub telephone: LocatorSet,
    pub password: LocatorSet,
    pub confirm: LocatorSet,
    pub newsletter_yes: LocatorSet,
    pub newsletter_no: LocatorSet,
    pub privacy_policy: LocatorSet,
    pub continue_button: LocatorSet,
    pub alert_danger: LocatorSet,
    pub alert_warning: LocatorSet,
    pub alert_success: LocatorSet,
    pub success_heading: LocatorSet,
    pub congratulations: LocatorSet,
    field_errors: Vec<(&'static str, LocatorSet)>,
}

impl Default for RegistrationPage {
    fn default() -> Self {
        Self::new()
    }
}

fn input(name: &str, field: &str) -> LocatorSet {
    LocatorSet::parse(name, &[format!("id:input-{field}"), format!("name:{field}")])
}

fn field_error(field: &str, label: &str) -> LocatorSet {
    LocatorSet::parse(
        &format!("{label} error"),
        &[
            format!(
                "xpath://input[@id='input-{field}']/following-sibling::*[contains(@class, 'text-danger')]"
            ),
            format!(
                "xpath://label[contains(text(), '{label}')]/following-sibling::*[contains(@class, 'text-danger')]"
            ),
        ],
    )
}

impl RegistrationPage {
    pub fn new() -> Self {
        Self {
            first_name: input("First Name input", "firstname"),
            last_name: input("Last Name input", "lastname"),
            email: input("E-Mail input", "email"),
            telephone: input("Telephone input", "telephone"),
            password: input("Password input", "password"),
            confirm: input("Password Confirm input", "confirm"),
            newsletter_yes: LocatorSet::parse(
                "Newsletter Yes",
                &["xpath://input[@name='newsletter' and @value='1']"],
            ),
            newsletter_no: LocatorSet::parse(
                "Newsletter No",
                &["xpath://input[@name='newsletter' and @value='0']"],
            ),
            privacy_policy: LocatorSet::parse(
                "Privacy Policy checkbox",
                &["name:agree", "xpath://input[@type='checkbox' and @name='agree']"],
            ),
            continue_button: LocatorSet::parse(
                "Continue button",
                &[
                    "css:input[value='Continue']",
                    "xpath://button[normalize-space()='Continue']",
                    "css:#form-register button[type='submit']",
                ],
            ),
            alert_danger: LocatorSet::parse("Error alert", &["css:.alert.alert-danger"]),
            alert_warning: LocatorSet::parse("Warning alert", &["css:.alert.alert-warning"]),
            alert_success: LocatorSet::parse("Success alert", &["css:.alert.alert-success"]),
            success_heading: LocatorSet::parse(
                "Account created heading",
                &[
                    "xpath://h1[contains(text(), 'Your Account Has Been Created')]",
                    "xpath://h1[contains(text(), 'Account Has Been Created')]",
                ],
            ),
            congratulations: LocatorSet::parse(
                "Congratulations text",
                &["xpath://p[contains(text(), 'Congratulations')]"],
            ),
            field_errors: FIELDS
                .iter()
                .map(|(field, label)| (*field, field_error(field, label)))
                .collect(),
        }
    }

    pub async fn fill_personal_details<D: Driver>(
        &self,
        session: &Session<D>,
        first_name: &str,
        last_name: &str,
        email: &str,
        telephone: &str,
    ) -> Result<()> {
        session.fill(&self.first_name, first_name).await?;
        session.fill(&self.last_name, last_name).await?;
        session.fill(&self.email, email).await?;
        session.fill(&self.telephone, telephone).await
    }

    pub async fn fill_passwords<D: Driver>(
        &self,
        session: &Session<D>,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        session.fill(&self.password, password).await?;
        session.fill(&self.confirm, confirm).await
    }

    pub async fn fill_form<D: Driver>(
        &self,
        session: &Session<D>,
        form: &RegistrationForm,
    ) -> Result<()> {
        let fields = [
            (&self.first_name, &form.first_name),
            (&self.last_name, &form.last_name),
            (&self.email, &form.email),
            (&self.telephone, &form.telephone),
            (&self.password, &form.password),
            (&self.confirm, &form.password),
        ];
        for (set, value) in fields {
            if let Some(value) = value {
                session.fill(set, value).await?;
            }
        }
        debug!("Registration form filled");
        Ok(())
    }

    pub async fn choose_newsletter<D: Driver>(
        &self,
        session: &Session<D>,
        subscribe: bool,
    ) -> Result<()> {
        let radio = if subscribe {
            &self.newsletter_yes
        } else {
            &self.newsletter_no
        };
        session.click(radio).await
    }

    /// Tick the privacy checkbox unless it already is.
    pub async fn accept_privacy_policy<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        session.scroll_to(&self.privacy_policy).await?;
        if !session.is_checked(&self.privacy_policy).await? {
            session.click(&self.privacy_policy).await?;
        }
        Ok(())
    }

    pub async fn is_privacy_policy_checked<D: Driver>(&self, session: &Session<D>) -> Result<bool> {
        session.is_checked(&self.privacy_policy).await
    }

    /// Click Continue, then wait for a success page, an alert or an inline
    /// field error.
    pub async fn submit<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        session.scroll_to(&self.continue_button).await?;
        session.click(&self.continue_button).await?;
        info!("Registration form submitted");

        let signals: Vec<&LocatorSet> = [&self.alert_danger, &self.alert_warning, &self.success_heading]
            .into_iter()
            .chain(self.field_errors.iter().map(|(_, set)| set))
            .collect();
        let signals = &signals;
        let waited = session
            .wait_until("registration form to be processed", || async move {
                if session.current_url().await?.to_lowercase().contains("success") {
                    return Ok(true);
                }
                for set in signals {
                    if session.is_present_now(set).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            })
            .await;
        match waited {
            Err(Error::Timeout(msg)) => {
                debug!("No reaction to the registration form: {}", msg);
                Ok(())
            }
            other => other,
        }
    }

    /// Success heading, congratulations text, success alert, a success URL,
    /// and last the page text.
    pub async fn registration_succeeded<D: Driver>(&self, session: &Session<D>) -> Result<bool> {
        let timeout = session.resolver().attempt_timeout();
        if session.is_present_within(&self.success_heading, timeout).await? {
            info!("Account created: success heading shown");
            return Ok(true);
        }
        for set in [&self.congratulations, &self.alert_success] {
            if session.is_present_within(set, QUICK).await? {
                info!("Account created: {} shown", set.name());
                return Ok(true);
            }
        }

        let url = session.current_url().await?.to_lowercase();
        if url.contains("account/success") || url.contains("account/account") {
            info!("Account created: now at {}", url);
            return Ok(true);
        }
        if url.contains("register") {
            return Ok(false);
        }

        let text = session.page_text().await?;
        if let Some(word) = Keywords::new(SUCCESS_WORDS)?.find_in(&text) {
            info!("Heuristic: page text mentions '{}'", word);
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether the store refused the form: an alert, an inline error, or
    /// still being on the registration page without any success marker.
    pub async fn registration_rejected<D: Driver>(&self, session: &Session<D>) -> Result<bool> {
        for set in [&self.alert_danger, &self.alert_warning] {
            if session.is_present_within(set, QUICK).await? {
                debug!("Rejected: {} shown", set.name());
                return Ok(true);
            }
        }
        if !self.field_errors(session).await?.is_empty() {
            return Ok(true);
        }

        let url = session.current_url().await?.to_lowercase();
        if url.contains("register") && !url.contains("success") {
            debug!("Rejected: still on {}", url);
            return Ok(true);
        }
        Ok(!session.is_present_within(&self.success_heading, QUICK).await?)
    }

    /// Alert text, or failing that the first inline field error.
    pub async fn error_message<D: Driver>(&self, session: &Session<D>) -> Result<Option<String>> {
        if let Some(text) = alert_text(session, &[&self.alert_danger, &self.alert_warning], QUICK).await? {
            return Ok(Some(text));
        }
        Ok(self.field_errors(session).await?.into_values().next())
    }

    /// Inline errors currently shown, keyed by field (`email`, `telephone`, ...).
    pub async fn field_errors<D: Driver>(
        &self,
        session: &Session<D>,
    ) -> Result<BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();
        for (field, set) in &self.field_errors {
            if session.is_present_now(set).await? {
                errors.insert(field.to_string(), session.text_of(set).await?);
            }
        }
        Ok(errors)
    }

    pub async fn email_value<D: Driver>(&self, session: &Session<D>) -> Result<String> {
        session.value_of(&self.email).await
    }

    pub async fn first_name_value<D: Driver>(&self, session: &Session<D>) -> Result<String> {
        session.value_of(&self.first_name).await
    }
}

impl PageObject for RegistrationPage {
    fn name(&self) -> &'static str {
        "registration page"
    }

    fn url_markers(&self) -> &[&'static str] {
        &["register"]
    }

    fn required_elements(&self) -> Vec<&LocatorSet> {
        vec![
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.telephone,
            &self.password,
            &self.confirm,
            &self.privacy_policy,
            &self.continue_button,
        ]
    }
}

//! Scenario bodies. Each starts on the freshly loaded home page.

use tracing::{info, warn};

use crate::config;
use crate::driver::Driver;
use crate::pages::{
    AccountPage, ForgottenPasswordPage, HomePage, Keywords, LoginOutcome, LoginPage, LogoutPage,
    PageObject, RegistrationForm, RegistrationPage, Submission,
};
use crate::session::Session;
use crate::{Error, Result};

const LOGIN_REFUSED_WORDS: &[&str] = &["warning", "no match", "incorrect", "invalid", "error"];
const DUPLICATE_EMAIL_WORDS: &[&str] = &[
    "email",
    "e-mail",
    "already",
    "exists",
    "registered",
    "address",
    "use",
    "taken",
    "account",
    "duplicate",
];
const PRIVACY_WORDS: &[&str] = &["privacy", "policy", "agree", "terms", "conditions"];
const MISSING_EMAIL_WORDS: &[&str] = &["email", "required", "e-mail"];

fn fail(message: impl Into<String>) -> Error {
    Error::AssertionFailed(message.into())
}

/// Log in through the dropdown and return the store's verdict.
async fn log_in<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
    email: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let login = LoginPage::new();
    home.go_to_login(session).await?;
    login.verify_loaded(session).await?;
    login.login(session, email, password).await?;
    login.outcome(session).await
}

async fn log_in_valid<D: Driver>(session: &Session<D>, home: &HomePage) -> Result<()> {
    let account = session.config().valid_account()?.clone();
    match log_in(session, home, &account.email, &account.password).await? {
        LoginOutcome::Succeeded => Ok(()),
        LoginOutcome::Rejected(message) => Err(fail(format!(
            "valid account {} was refused: {}",
            account.email, message
        ))),
        LoginOutcome::Unknown => Err(fail(format!(
            "login as {} neither redirected nor showed an error",
            account.email
        ))),
    }
}

pub(super) async fn login_valid<D: Driver>(session: &Session<D>, home: &HomePage) -> Result<()> {
    log_in_valid(session, home).await?;
    AccountPage::new().verify_loaded(session).await?;
    if !home.is_user_logged_in(session).await? {
        return Err(fail("My Account dropdown offers no Logout after logging in"));
    }
    info!("Logged in and on the account page");
    Ok(())
}

pub(super) async fn login_invalid<D: Driver>(session: &Session<D>, home: &HomePage) -> Result<()> {
    let invalid = session.config().accounts.invalid.clone();
    let keywords = Keywords::new(LOGIN_REFUSED_WORDS)?;

    match log_in(session, home, &invalid.email, &invalid.password).await? {
        LoginOutcome::Rejected(message) => {
            if !keywords.matches(&message) {
                warn!("Login refused with unexpected wording: {}", message);
            }
        }
        LoginOutcome::Unknown => {
            let text = session.page_text().await?;
            match keywords.find_in(&text) {
                Some(word) => info!("Heuristic: login page mentions '{}'", word),
                None => return Err(fail("invalid login showed no error message")),
            }
        }
        LoginOutcome::Succeeded => {
            return Err(fail(format!(
                "invalid account {} was accepted",
                invalid.email
            )))
        }
    }

    let url = session.current_url().await?;
    if !url.to_lowercase().contains("login") {
        return Err(fail(format!("left the login page after a refused login: {}", url)));
    }
    if home.is_user_logged_in(session).await? {
        return Err(fail("logged in after a refused login"));
    }
    Ok(())
}

pub(super) async fn login_logout_continue<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
) -> Result<()> {
    log_in_valid(session, home).await?;
    home.logout(session).await?;

    let logout = LogoutPage::new();
    logout.verify_loaded(session).await?;
    let url = logout.continue_to_home(session).await?;
    home.verify_title(session).await?;
    info!("Logged out and back home at {}", url);
    Ok(())
}

pub(super) async fn forgotten_password<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
) -> Result<()> {
    let email = session.config().valid_account()?.email.clone();
    let login = LoginPage::new();
    let forgotten = ForgottenPasswordPage::new();

    home.go_to_login(session).await?;
    login.verify_loaded(session).await?;
    login.open_forgotten_password(session).await?;
    forgotten.verify_loaded(session).await?;
    forgotten.submit(session, &email).await?;

    match forgotten.submission_outcome(session).await? {
        Submission::Confirmed(how) => {
            info!("Reset link requested: {}", how);
            Ok(())
        }
        Submission::NotConfirmed => match forgotten.error_message(session).await? {
            Some(message) => Err(fail(format!("password reset refused: {}", message))),
            None => {
                warn!("Password reset showed neither a confirmation nor an error");
                Ok(())
            }
        },
    }
}

/// Open the registration page from the home page.
async fn open_registration<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
) -> Result<RegistrationPage> {
    let page = RegistrationPage::new();
    home.go_to_register(session).await?;
    page.verify_loaded(session).await?;
    Ok(page)
}

/// Fail unless the form was refused and the browser stayed on it. The error
/// wording is only checked loosely.
async fn expect_refusal<D: Driver>(
    session: &Session<D>,
    page: &RegistrationPage,
    words: &[&str],
) -> Result<()> {
    if !page.registration_rejected(session).await? {
        return Err(fail("registration was not refused"));
    }

    let url = session.current_url().await?;
    let lower = url.to_lowercase();
    if !lower.contains("register") || lower.contains("success") {
        return Err(fail(format!("left the registration page: {}", url)));
    }

    let keywords = Keywords::new(words)?;
    match page.error_message(session).await? {
        Some(message) if keywords.matches(&message) => info!("Refused: {}", message),
        Some(message) => warn!("Refused with unexpected wording: {}", message),
        None => match keywords.find_in(&session.page_text().await?) {
            Some(word) => info!("Heuristic: registration page mentions '{}'", word),
            None => warn!("Refused without any error message"),
        },
    }
    Ok(())
}

pub(super) async fn register_new<D: Driver>(session: &Session<D>, home: &HomePage) -> Result<()> {
    let details = session.config().registration.expanded(&config::timestamp());
    let page = open_registration(session, home).await?;

    page.fill_form(session, &RegistrationForm::from(&details)).await?;
    page.choose_newsletter(session, details.newsletter).await?;
    page.accept_privacy_policy(session).await?;
    page.submit(session).await?;

    if !page.registration_succeeded(session).await? {
        let reason = page
            .error_message(session)
            .await?
            .unwrap_or_else(|| "no success page".into());
        return Err(fail(format!("could not register {}: {}", details.email, reason)));
    }
    info!("Registered {}", details.email);
    Ok(())
}

pub(super) async fn register_existing_email<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
) -> Result<()> {
    let existing = session.config().valid_account()?.email.clone();
    let details = session.config().registration.expanded(&config::timestamp());
    let page = open_registration(session, home).await?;

    let form = RegistrationForm {
        email: Some(existing.clone()),
        ..RegistrationForm::from(&details)
    };
    page.fill_form(session, &form).await?;
    page.accept_privacy_policy(session).await?;
    page.submit(session).await?;
    expect_refusal(session, &page, DUPLICATE_EMAIL_WORDS).await?;

    let email = page.email_value(session).await?;
    if email != existing {
        return Err(fail(format!(
            "e-mail field not preserved: expected '{}', got '{}'",
            existing, email
        )));
    }
    let first_name = page.first_name_value(session).await?;
    if first_name != details.first_name {
        return Err(fail(format!(
            "first name not preserved: expected '{}', got '{}'",
            details.first_name, first_name
        )));
    }
    Ok(())
}

pub(super) async fn register_without_privacy<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
) -> Result<()> {
    let details = session.config().registration.expanded(&config::timestamp());
    let page = open_registration(session, home).await?;

    page.fill_form(session, &RegistrationForm::from(&details)).await?;
    if page.is_privacy_policy_checked(session).await? {
        return Err(fail("privacy policy checkbox is checked by default"));
    }
    page.submit(session).await?;
    expect_refusal(session, &page, PRIVACY_WORDS).await
}

pub(super) async fn register_missing_email<D: Driver>(
    session: &Session<D>,
    home: &HomePage,
) -> Result<()> {
    let page = open_registration(session, home).await?;
    let form = RegistrationForm {
        first_name: Some("TestUser".into()),
        last_name: Some("LastName".into()),
        email: Some(String::new()),
        telephone: Some("5551234567".into()),
        password: Some("Password123".into()),
    };

    page.fill_form(session, &form).await?;
    page.accept_privacy_policy(session).await?;
    page.submit(session).await?;
    expect_refusal(session, &page, MISSING_EMAIL_WORDS).await
}

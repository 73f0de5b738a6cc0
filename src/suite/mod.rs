//! The storefront test cases, TC_001 through TC_010.

mod flows;

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::driver::Driver;
use crate::pages::HomePage;
use crate::session::Session;
use crate::{Error, Result};

/// One test case of the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    LoginValid,
    LoginInvalid,
    LoginLogoutContinue,
    ForgottenPassword,
    RegisterNew,
    RegisterExistingEmail,
    RegisterWithoutPrivacy,
    RegisterMissingEmail,
    HomepageTopBar,
    HomepageHeader,
}

const ALL: [Scenario; 10] = [
    Scenario::LoginValid,
    Scenario::LoginInvalid,
    Scenario::LoginLogoutContinue,
    Scenario::ForgottenPassword,
    Scenario::RegisterNew,
    Scenario::RegisterExistingEmail,
    Scenario::RegisterWithoutPrivacy,
    Scenario::RegisterMissingEmail,
    Scenario::HomepageTopBar,
    Scenario::HomepageHeader,
];

impl Scenario {
    /// Every scenario in id order.
    pub fn all() -> &'static [Scenario] {
        &ALL
    }

    pub fn id(self) -> &'static str {
        match self {
            Scenario::LoginValid => "TC_001",
            Scenario::LoginInvalid => "TC_002",
            Scenario::LoginLogoutContinue => "TC_003",
            Scenario::ForgottenPassword => "TC_004",
            Scenario::RegisterNew => "TC_005",
            Scenario::RegisterExistingEmail => "TC_006",
            Scenario::RegisterWithoutPrivacy => "TC_007",
            Scenario::RegisterMissingEmail => "TC_008",
            Scenario::HomepageTopBar => "TC_009",
            Scenario::HomepageHeader => "TC_010",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Scenario::LoginValid => "login-valid",
            Scenario::LoginInvalid => "login-invalid",
            Scenario::LoginLogoutContinue => "login-logout-continue",
            Scenario::ForgottenPassword => "forgotten-password",
            Scenario::RegisterNew => "register-new",
            Scenario::RegisterExistingEmail => "register-existing-email",
            Scenario::RegisterWithoutPrivacy => "register-without-privacy",
            Scenario::RegisterMissingEmail => "register-missing-email",
            Scenario::HomepageTopBar => "homepage-top-bar",
            Scenario::HomepageHeader => "homepage-header",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::LoginValid => "Login with valid credentials",
            Scenario::LoginInvalid => "Login with invalid credentials is refused",
            Scenario::LoginLogoutContinue => "Logout, then Continue returns to the home page",
            Scenario::ForgottenPassword => "Request a password reset link",
            Scenario::RegisterNew => "Register a new account",
            Scenario::RegisterExistingEmail => "Registration with an existing e-mail is refused",
            Scenario::RegisterWithoutPrivacy => {
                "Registration without accepting the privacy policy is refused"
            }
            Scenario::RegisterMissingEmail => "Registration without an e-mail is refused",
            Scenario::HomepageTopBar => "Top bar elements are present",
            Scenario::HomepageHeader => "Header elements are present",
        }
    }

    /// Run on `session`, starting from a freshly loaded home page.
    pub async fn run<D: Driver>(self, session: &Session<D>) -> Result<()> {
        info!("{} {}: {}", self.id(), self.slug(), self.description());
        let home = HomePage::new();
        session.reload_fresh().await?;
        home.verify_title(session).await?;

        match self {
            Scenario::LoginValid => flows::login_valid(session, &home).await,
            Scenario::LoginInvalid => flows::login_invalid(session, &home).await,
            Scenario::LoginLogoutContinue => flows::login_logout_continue(session, &home).await,
            Scenario::ForgottenPassword => flows::forgotten_password(session, &home).await,
            Scenario::RegisterNew => flows::register_new(session, &home).await,
            Scenario::RegisterExistingEmail => flows::register_existing_email(session, &home).await,
            Scenario::RegisterWithoutPrivacy => {
                flows::register_without_privacy(session, &home).await
            }
            Scenario::RegisterMissingEmail => flows::register_missing_email(session, &home).await,
            Scenario::HomepageTopBar => home.top_bar_report(session).await?.ensure_complete("Top bar"),
            Scenario::HomepageHeader => home.header_report(session).await?.ensure_complete("Header"),
        }
    }
}

impl FromStr for Scenario {
    type Err = Error;

    /// Accepts the id (`TC_002`) or the slug (`login-invalid`), any case.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ALL.iter()
            .copied()
            .find(|sc| sc.id().eq_ignore_ascii_case(wanted) || sc.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Config(format!("unknown scenario '{}'", s)))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id(), self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake_store::{self, StoreBehavior};

    #[test]
    fn ids_and_slugs_parse() {
        assert_eq!("TC_001".parse::<Scenario>().unwrap(), Scenario::LoginValid);
        assert_eq!("tc_010".parse::<Scenario>().unwrap(), Scenario::HomepageHeader);
        assert_eq!(
            "Register-Missing-Email".parse::<Scenario>().unwrap(),
            Scenario::RegisterMissingEmail
        );
        let err = "checkout".parse::<Scenario>().unwrap_err();
        assert!(err.to_string().contains("'checkout'"));
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let ids: Vec<&str> = Scenario::all().iter().map(|s| s.id()).collect();
        assert_eq!(ids.first(), Some(&"TC_001"));
        assert_eq!(ids.last(), Some(&"TC_010"));
        let unique: std::collections::HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 10);
        assert_eq!(Scenario::LoginInvalid.to_string(), "TC_002 login-invalid");
    }

    #[tokio::test(start_paused = true)]
    async fn homepage_scenarios_pass_on_complete_store() {
        let session = fake_store::session(StoreBehavior::default());

        Scenario::HomepageTopBar.run(&session).await.unwrap();
        Scenario::HomepageHeader.run(&session).await.unwrap();

        let events = session.driver().events();
        assert!(events.contains(&"clear_site_data".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn header_scenario_names_missing_element() {
        let session = fake_store::session(StoreBehavior {
            without: vec!["#menu"],
            ..Default::default()
        });

        let err = Scenario::HomepageHeader.run(&session).await.unwrap_err();

        assert!(matches!(err, Error::AssertionFailed(_)));
        assert!(err.to_string().contains("Navigation menu"));
    }
}

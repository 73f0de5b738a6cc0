use tracing::info;

use super::PageObject;
use crate::driver::Driver;
use crate::locator::LocatorSet;
use crate::session::Session;
use crate::Result;

/// Account dashboard shown after logging in.
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub edit_account: LocatorSet,
    pub order_history: LocatorSet,
}

impl Default for AccountPage {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountPage {
    pub fn new() -> Self {
        Self {
            edit_account: LocatorSet::parse(
                "Edit Account link",
                &["link:Edit Account", "xpath://a[contains(@href, 'account/edit')]"],
            ),
            order_history: LocatorSet::parse(
                "Order History link",
                &["link:Order History", "xpath://a[contains(@href, 'account/order')]"],
            ),
        }
    }
}

impl PageObject for AccountPage {
    fn name(&self) -> &'static str {
        "account page"
    }

    fn url_markers(&self) -> &[&'static str] {
        &["account"]
    }

    fn required_elements(&self) -> Vec<&LocatorSet> {
        vec![&self.edit_account, &self.order_history]
    }
}

/// "Account Logout" confirmation page.
#[derive(Debug, Clone)]
pub struct LogoutPage {
    pub continue_button: LocatorSet,
}

impl Default for LogoutPage {
    fn default() -> Self {
        Self::new()
    }
}

impl LogoutPage {
    pub fn new() -> Self {
        Self {
            continue_button: LocatorSet::parse(
                "Continue button",
                &[
                    "link:Continue",
                    "css:a.btn",
                    "xpath://*[contains(text(), 'Continue')]",
                ],
            ),
        }
    }

    /// Click Continue and wait to land on the home page. Returns the URL.
    pub async fn continue_to_home<D: Driver>(&self, session: &Session<D>) -> Result<String> {
        session.click(&self.continue_button).await?;
        let base = session.config().base_url.clone();
        let url = session
            .wait_for_url("home page after logout", |u| is_home_url(&base, u))
            .await?;
        info!("Back on the home page: {}", url);
        Ok(url)
    }
}

impl PageObject for LogoutPage {
    fn name(&self) -> &'static str {
        "logout page"
    }

    fn url_markers(&self) -> &[&'static str] {
        &["logout", "account"]
    }

    fn required_elements(&self) -> Vec<&LocatorSet> {
        vec![&self.continue_button]
    }
}

/// Whether `url` is the store front page: the base URL itself, the
/// `common/home` route, or a bare `/` or `/index.php` path.
pub(crate) fn is_home_url(base: &str, url: &str) -> bool {
    let lower = url.to_lowercase();
    if lower.contains("common/home") {
        return true;
    }
    if lower.contains("route=") {
        return false;
    }
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/') == base.to_lowercase().trim_end_matches('/')
        || path.ends_with('/')
        || path.ends_with("/index.php")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake_store::{self, StoreBehavior};

    #[test]
    fn recognizes_home_urls() {
        let base = "https://shop.test/";
        assert!(is_home_url(base, "https://shop.test/"));
        assert!(is_home_url(base, "https://shop.test"));
        assert!(is_home_url(base, "https://shop.test/index.php?route=common/home"));
        assert!(is_home_url(base, "https://shop.test/index.php"));
        assert!(!is_home_url(base, "https://shop.test/index.php?route=account/logout"));
        assert!(!is_home_url(base, "https://shop.test/index.php?route=account/login"));
    }

    #[tokio::test(start_paused = true)]
    async fn logout_continue_returns_home() {
        let session = fake_store::session(StoreBehavior {
            accept_login: true,
            ..Default::default()
        });
        session.open("index.php?route=account/logout").await.unwrap();
        let page = LogoutPage::new();

        page.verify_loaded(&session).await.unwrap();
        let url = page.continue_to_home(&session).await.unwrap();

        assert_eq!(url, fake_store::BASE);
    }

    #[tokio::test(start_paused = true)]
    async fn account_dashboard_loads() {
        let session = fake_store::session(StoreBehavior {
            accept_login: true,
            ..Default::default()
        });
        session.open("index.php?route=account/account").await.unwrap();

        AccountPage::new().verify_loaded(&session).await.unwrap();
    }
}

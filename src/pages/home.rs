use tracing::{debug, info};

use super::{PageObject, PresenceReport};
use crate::driver::Driver;
use crate::locator::LocatorSet;
use crate::session::Session;
use crate::{Error, Result};

/// Title every storefront page carries.
pub const STORE_TITLE: &str = "Your Store";

/// Storefront home page: top bar, header and the My Account dropdown.
#[derive(Debug, Clone)]
pub struct HomePage {
    // Top bar
    pub currency: LocatorSet,
    pub phone: LocatorSet,
    pub my_account: LocatorSet,
    pub wish_list: LocatorSet,
    pub shopping_cart: LocatorSet,
    pub checkout: LocatorSet,

    // Header
    pub logo: LocatorSet,
    pub search_input: LocatorSet,
    pub search_button: LocatorSet,
    pub nav_menu: LocatorSet,
    pub cart_summary: LocatorSet,

    // My Account dropdown
    pub login_link: LocatorSet,
    pub register_link: LocatorSet,
    pub logout_link: LocatorSet,
    menu_entry: LocatorSet,
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            currency: LocatorSet::parse(
                "Currency dropdown",
                &[
                    "id:form-currency",
                    "xpath://button[contains(text(), '$') or contains(text(), 'Currency')]",
                    "xpath://button[contains(@class, 'dropdown-toggle')]",
                    "xpath://*[contains(text(), 'Currency')]",
                ],
            ),
            phone: LocatorSet::parse(
                "Contact phone",
                &[
                    "xpath://i[contains(@class, 'fa-phone')]",
                    "xpath://*[contains(text(), '123456789')]",
                    "xpath://i[@class='fa fa-phone']",
                ],
            ),
            my_account: LocatorSet::parse(
                "My Account dropdown",
                &[
                    "css:a[title='My Account']",
                    "xpath://a[@title='My Account' or contains(text(), 'My Account')]",
                    "xpath://a[contains(text(), 'Account')]",
                    "xpath://*[@title='My Account']",
                ],
            ),
            wish_list: LocatorSet::parse(
                "Wish List link",
                &[
                    "id:wishlist-total",
                    "xpath://a[@title='Wish List' or contains(text(), 'Wish List')]",
                    "xpath://a[contains(text(), 'Wishlist')]",
                    "xpath://*[@title='Wish List']",
                ],
            ),
            shopping_cart: LocatorSet::parse(
                "Shopping Cart link",
                &[
                    "css:a[title='Shopping Cart']",
                    "xpath://button[@title='Shopping Cart' or contains(text(), 'Shopping Cart')]",
                    "xpath://button[contains(text(), 'Cart')]",
                    "xpath://a[contains(text(), 'Shopping Cart')]",
                    "xpath://*[@title='Shopping Cart']",
                ],
            ),
            checkout: LocatorSet::parse(
                "Checkout link",
                &[
                    "css:a[title='Checkout']",
                    "xpath://a[contains(text(), 'Checkout')]",
                    "xpath://button[contains(text(), 'Checkout')]",
                    "xpath://*[contains(text(), 'Checkout')]",
                ],
            ),
            logo: LocatorSet::parse(
                "Logo",
                &[
                    "css:#logo h1 a",
                    "xpath://h1//a[contains(text(), 'Your Store')]",
                    "xpath://a[@title='Your Store']",
                    "css:#logo",
                    "xpath://*[contains(text(), 'Your Store')]",
                ],
            ),
            search_input: LocatorSet::parse(
                "Search input",
                &[
                    "name:search",
                    "xpath://input[@placeholder='Search']",
                    "xpath://input[contains(@class, 'form-control')]",
                ],
            ),
            search_button: LocatorSet::parse(
                "Search button",
                &[
                    "css:.btn.btn-default.btn-lg",
                    "xpath://button[contains(@class, 'btn') and contains(@class, 'btn-default')]",
                    "xpath://i[@class='fa fa-search']",
                    "css:.btn.btn-default",
                ],
            ),
            nav_menu: LocatorSet::parse(
                "Navigation menu",
                &[
                    "id:menu",
                    "xpath://nav[contains(@class, 'navbar')]",
                    "xpath://div[contains(@class, 'navbar')]",
                    "xpath://ul[contains(@class, 'nav')]",
                    "css:.navbar",
                ],
            ),
            cart_summary: LocatorSet::parse(
                "Cart summary",
                &[
                    "id:cart",
                    "xpath://button[contains(text(), 'item')]",
                    "xpath://button[contains(text(), '$')]",
                    "xpath://*[contains(text(), '0 item') or contains(text(), 'item(s)')]",
                    "css:.btn.btn-inverse",
                ],
            ),
            login_link: LocatorSet::parse(
                "Login link",
                &[
                    "link:Login",
                    "xpath://ul[contains(@class, 'dropdown-menu')]//a[normalize-space()='Login']",
                ],
            ),
            register_link: LocatorSet::parse(
                "Register link",
                &[
                    "link:Register",
                    "xpath://ul[contains(@class, 'dropdown-menu')]//a[normalize-space()='Register']",
                ],
            ),
            logout_link: LocatorSet::parse(
                "Logout link",
                &[
                    "link:Logout",
                    "xpath://ul[contains(@class, 'dropdown-menu')]//a[normalize-space()='Logout']",
                ],
            ),
            menu_entry: LocatorSet::parse(
                "My Account menu entry",
                &["link:Login", "link:Logout", "link:Register"],
            ),
        }
    }

    pub async fn verify_title<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        let title = session.title().await?;
        if !title.contains(STORE_TITLE) {
            return Err(Error::AssertionFailed(format!(
                "expected '{}' in the title, got '{}'",
                STORE_TITLE, title
            )));
        }
        Ok(())
    }

    /// Currency, phone, My Account, Wish List, Shopping Cart and Checkout.
    pub async fn top_bar_report<D: Driver>(&self, session: &Session<D>) -> Result<PresenceReport> {
        PresenceReport::collect(
            session,
            &[
                &self.currency,
                &self.phone,
                &self.my_account,
                &self.wish_list,
                &self.shopping_cart,
                &self.checkout,
            ],
        )
        .await
    }

    /// Logo, search input, search button, navigation menu and cart summary.
    pub async fn header_report<D: Driver>(&self, session: &Session<D>) -> Result<PresenceReport> {
        PresenceReport::collect(
            session,
            &[
                &self.logo,
                &self.search_input,
                &self.search_button,
                &self.nav_menu,
                &self.cart_summary,
            ],
        )
        .await
    }

    /// Open the My Account dropdown and wait for its entries to show.
    pub async fn open_account_menu<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        session.click(&self.my_account).await?;
        session.wait_until_visible(&self.menu_entry).await?;
        debug!("My Account dropdown open");
        Ok(())
    }

    pub async fn go_to_login<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        info!("Navigating to the login page");
        self.open_account_menu(session).await?;
        session.click(&self.login_link).await?;
        session
            .wait_for_url("login page to open", |u| u.to_lowercase().contains("login"))
            .await?;
        Ok(())
    }

    pub async fn go_to_register<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        info!("Navigating to the registration page");
        self.open_account_menu(session).await?;
        session.click(&self.register_link).await?;
        session
            .wait_for_url("registration page to open", |u| {
                u.to_lowercase().contains("register")
            })
            .await?;
        Ok(())
    }

    /// Log out through the My Account dropdown of the current page.
    pub async fn logout<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        info!("Logging out");
        self.open_account_menu(session).await?;
        session.click(&self.logout_link).await?;
        session
            .wait_for_url("logout page to open", |u| u.to_lowercase().contains("logout"))
            .await?;
        Ok(())
    }

    /// Whether the dropdown offers Logout. Leaves the dropdown closed.
    pub async fn is_user_logged_in<D: Driver>(&self, session: &Session<D>) -> Result<bool> {
        self.open_account_menu(session).await?;
        let logged_in = session
            .is_present_within(&self.logout_link, session.resolver().attempt_timeout())
            .await?;
        session.click(&self.my_account).await?;
        debug!("Logged in: {}", logged_in);
        Ok(logged_in)
    }
}

impl PageObject for HomePage {
    fn name(&self) -> &'static str {
        "home page"
    }

    fn required_elements(&self) -> Vec<&LocatorSet> {
        vec![&self.logo, &self.my_account]
    }
}

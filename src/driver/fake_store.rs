//! A small OpenCart look-alike built on [`FakeDriver`], shared by the page
//! and scenario tests.

use super::fake::{Effect, FakeDriver, FakeElement, FakePage};
use crate::config::SuiteConfig;
use crate::session::Session;

pub(crate) const BASE: &str = "https://shop.test/";

pub(crate) fn url(route: &str) -> String {
    format!("{BASE}index.php?route={route}")
}

#[derive(Debug, Clone)]
pub(crate) struct StoreBehavior {
    /// The login form accepts the submitted credentials.
    pub accept_login: bool,
    /// The registration form creates the account.
    pub accept_registration: bool,
    /// Alert shown when registration is refused.
    pub registration_error: &'static str,
    /// The password reset form refuses the e-mail address.
    pub refuse_reset: bool,
    /// Selectors left out of every page.
    pub without: Vec<&'static str>,
}

impl Default for StoreBehavior {
    fn default() -> Self {
        Self {
            accept_login: false,
            accept_registration: false,
            registration_error: "Warning: You must agree to the Privacy Policy!",
            refuse_reset: false,
            without: Vec::new(),
        }
    }
}

pub(crate) fn config() -> SuiteConfig {
    SuiteConfig::parse(
        r#"
base_url: "https://shop.test/"
accounts:
  valid:
    email: "shopper@example.com"
    password: "secret"
registration:
  first_name: "Ada"
  last_name: "Lovelace"
  email: "ada_{timestamp}@example.com"
  telephone: "5550001111"
  password: "Password123"
"#,
    )
    .expect("fixture config")
}

pub(crate) fn session(behavior: StoreBehavior) -> Session<FakeDriver> {
    Session::new(store(behavior), &config())
}

pub(crate) fn store(behavior: StoreBehavior) -> FakeDriver {
    let b = &behavior;
    FakeDriver::new("about:blank")
        .page(BASE, home(b))
        .page(&url("account/login"), login(b))
        .page(&url("account/account"), account(b))
        .page(&url("account/logout"), logout(b))
        .page(&url("account/forgotten"), forgotten(b))
        .page(&url("account/register"), register(b))
        .page(&url("account/success"), success(b))
}

fn with_chrome(mut page: FakePage, b: &StoreBehavior) -> FakePage {
    let mut reveals = vec![Effect::Reveal("a.login".into()), Effect::Reveal("a.register".into())];
    if b.accept_login {
        reveals.push(Effect::Reveal("a.logout".into()));
    }
    let mut my_account = FakeElement::new("a.my-account", &["css:a[title='My Account']"])
        .tag("a")
        .text("My Account");
    for effect in reveals {
        my_account = my_account.on_click(effect);
    }

    let mut elements = vec![
        FakeElement::new("#form-currency", &["id:form-currency"]).tag("form"),
        FakeElement::new("i.fa-phone", &["xpath://i[contains(@class, 'fa-phone')]"]).tag("i"),
        my_account,
        FakeElement::new(
            "a.wishlist",
            &["xpath://a[@title='Wish List' or contains(text(), 'Wish List')]"],
        )
        .text("Wish List (0)"),
        FakeElement::new("a.cart-link", &["css:a[title='Shopping Cart']"]),
        FakeElement::new("a.checkout", &["css:a[title='Checkout']"]),
        FakeElement::new("a.login", &["link:Login"])
            .hidden()
            .on_click(Effect::Navigate(url("account/login"))),
        FakeElement::new("a.register", &["link:Register"])
            .hidden()
            .on_click(Effect::Navigate(url("account/register"))),
        FakeElement::new("#logo h1 a", &["css:#logo h1 a"])
            .text("Your Store")
            .on_click(Effect::Navigate(BASE.into())),
        FakeElement::new("input.search", &["name:search"]).tag("input"),
        FakeElement::new("button.search", &["css:.btn.btn-default.btn-lg"]).tag("button"),
        FakeElement::new("#menu", &["id:menu"]).tag("nav"),
        FakeElement::new("#cart", &["id:cart"])
            .tag("button")
            .text("0 item(s) - $0.00"),
    ];
    if b.accept_login {
        elements.push(
            FakeElement::new("a.logout", &["link:Logout"])
                .hidden()
                .on_click(Effect::Navigate(url("account/logout"))),
        );
    }

    for element in elements {
        page = page.element(element);
    }
    page
}

fn finish(page: FakePage, b: &StoreBehavior) -> FakePage {
    page.without(&b.without)
}

fn home(b: &StoreBehavior) -> FakePage {
    finish(
        with_chrome(FakePage::new("Your Store").text("Featured MacBook iPhone"), b),
        b,
    )
}

fn login(b: &StoreBehavior) -> FakePage {
    let submit = if b.accept_login {
        Effect::Navigate(url("account/account"))
    } else {
        Effect::Reveal("div.alert-danger".into())
    };
    let page = FakePage::new("Account Login")
        .text("New Customer Returning Customer I am a returning customer")
        .element(FakeElement::new("h2.new", &["xpath://h2[text()='New Customer']"]).tag("h2"))
        .element(
            FakeElement::new("h2.returning", &["xpath://h2[text()='Returning Customer']"])
                .tag("h2"),
        )
        .element(FakeElement::new("#input-email", &["id:input-email"]).tag("input"))
        .element(FakeElement::new("#input-password", &["id:input-password"]).tag("input"))
        .element(
            FakeElement::new("input.login", &["css:input[value='Login']"])
                .tag("input")
                .on_click(submit),
        )
        .element(
            FakeElement::new("a.forgotten", &["link:Forgotten Password"])
                .on_click(Effect::Navigate(url("account/forgotten"))),
        )
        .element(
            FakeElement::new("div.alert-danger", &["css:.alert.alert-danger"])
                .text("Warning: No match for E-Mail Address and/or Password.")
                .absent(),
        );
    finish(with_chrome(page, b), b)
}

fn account(b: &StoreBehavior) -> FakePage {
    let page = FakePage::new("My Account")
        .text("My Account Edit your account information")
        .element(FakeElement::new("a.edit", &["link:Edit Account"]))
        .element(FakeElement::new("a.orders", &["link:Order History"]));
    finish(with_chrome(page, b), b)
}

fn logout(b: &StoreBehavior) -> FakePage {
    let page = FakePage::new("Account Logout")
        .text("Account Logout You have been logged off your account.")
        .element(
            FakeElement::new("a.continue", &["link:Continue"])
                .text("Continue")
                .on_click(Effect::Navigate(BASE.into())),
        );
    finish(with_chrome(page, b), b)
}

fn forgotten(b: &StoreBehavior) -> FakePage {
    let reaction = if b.refuse_reset {
        "div.alert-danger"
    } else {
        "div.alert-success"
    };
    let page = FakePage::new("Forgot Your Password?")
        .text("Forgot Your Password? Enter the e-mail address associated with your account.")
        .element(FakeElement::new("ul.breadcrumb", &["css:.breadcrumb"]).text("Account Forgotten Password"))
        .element(FakeElement::new("#input-email", &["id:input-email"]).tag("input"))
        .element(
            FakeElement::new("input.continue", &["css:input[value='Continue']"])
                .tag("input")
                .on_click(Effect::Reveal(reaction.into())),
        )
        .element(FakeElement::new("a.back", &["link:Back"]))
        .element(
            FakeElement::new("div.alert-success", &["css:.alert.alert-success"])
                .text("An email with a confirmation link has been sent your email address.")
                .absent(),
        )
        .element(
            FakeElement::new("div.alert-danger", &["css:.alert.alert-danger"])
                .text("Warning: The E-Mail Address was not found in our records, please try again!")
                .absent(),
        );
    finish(with_chrome(page, b), b)
}

fn register(b: &StoreBehavior) -> FakePage {
    let mut submit = FakeElement::new("input.continue", &["css:input[value='Continue']"]).tag("input");
    if b.accept_registration {
        submit = submit.on_click(Effect::Navigate(url("account/success")));
    } else {
        submit = submit
            .on_click(Effect::Reveal("div.alert-danger".into()))
            .on_click(Effect::Reveal("div.email-error".into()));
    }

    let mut page = FakePage::new("Register Account").text("Register Account Your Personal Details");
    for (selector, pattern) in [
        ("#input-firstname", "id:input-firstname"),
        ("#input-lastname", "id:input-lastname"),
        ("#input-email", "id:input-email"),
        ("#input-telephone", "id:input-telephone"),
        ("#input-password", "id:input-password"),
        ("#input-confirm", "id:input-confirm"),
    ] {
        page = page.element(FakeElement::new(selector, &[pattern]).tag("input"));
    }
    let page = page
        .element(
            FakeElement::new(
                "input.newsletter-yes",
                &["xpath://input[@name='newsletter' and @value='1']"],
            )
            .on_click(Effect::Toggle),
        )
        .element(
            FakeElement::new(
                "input.newsletter-no",
                &["xpath://input[@name='newsletter' and @value='0']"],
            )
            .on_click(Effect::Toggle),
        )
        .element(FakeElement::new("input.agree", &["name:agree"]).on_click(Effect::Toggle))
        .element(submit)
        .element(
            FakeElement::new("div.alert-danger", &["css:.alert.alert-danger"])
                .text(b.registration_error)
                .absent(),
        )
        .element(
            FakeElement::new(
                "div.email-error",
                &["xpath://input[@id='input-email']/following-sibling::*[contains(@class, 'text-danger')]"],
            )
            .text("E-Mail Address is already registered!")
            .absent(),
        );
    finish(with_chrome(page, b), b)
}

fn success(b: &StoreBehavior) -> FakePage {
    let page = FakePage::new("Your Account Has Been Created!")
        .text("Your Account Has Been Created! Congratulations! Your new account has been successfully created!")
        .element(
            FakeElement::new(
                "h1.success",
                &["xpath://h1[contains(text(), 'Your Account Has Been Created')]"],
            )
            .tag("h1")
            .text("Your Account Has Been Created!"),
        )
        .element(FakeElement::new("p.congrats", &["xpath://p[contains(text(), 'Congratulations')]"]));
    finish(with_chrome(page, b), b)
}

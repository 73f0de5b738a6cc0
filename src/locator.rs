//! Locators and locator sets.
//!
//! A [`Locator`] is a strategy plus a selector string. Locators are written as
//! `kind:value` patterns (`id:input-email`, `link:Login`, `xpath://h1`) so page
//! objects and config files share one syntax.

use std::fmt;

use crate::{Error, Result};

/// How a locator finds its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `id:cart` - element id
    Id,
    /// `name:search` - `name` attribute
    Name,
    /// `css:#logo h1 a` - CSS selector
    Css,
    /// `xpath://h2[text()='New Customer']` - XPath expression
    XPath,
    /// `link:Login` - anchor whose visible text is exactly the value
    LinkText,
    /// `partial_link:Account` - anchor whose visible text contains the value
    PartialLinkText,
    /// `tag:h1` - tag name
    Tag,
    /// `class:navbar` - single class name
    Class,
    /// `text:Checkout` - innermost element whose text contains the value
    Text,
    /// `placeholder:Search` - input or textarea placeholder
    Placeholder,
}

impl Strategy {
    const ALL: [Strategy; 10] = [
        Strategy::Id,
        Strategy::Name,
        Strategy::Css,
        Strategy::XPath,
        Strategy::LinkText,
        Strategy::PartialLinkText,
        Strategy::Tag,
        Strategy::Class,
        Strategy::Text,
        Strategy::Placeholder,
    ];

    /// Pattern prefix, also the key passed to the in-page lookup script.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::LinkText => "link",
            Strategy::PartialLinkText => "partial_link",
            Strategy::Tag => "tag",
            Strategy::Class => "class",
            Strategy::Text => "text",
            Strategy::Placeholder => "placeholder",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == prefix)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single way of finding an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(Strategy::Text, value)
    }

    /// Parse a `kind:value` pattern.
    ///
    /// Unprefixed patterns starting with `/` or `(` are XPath, anything else
    /// is CSS. An unknown prefix is not an error: `a:hover` and `input:checked`
    /// are valid CSS, so the whole string is kept as a CSS selector.
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();

        if let Some((prefix, value)) = pattern.split_once(':') {
            if let Some(strategy) = Strategy::from_prefix(prefix) {
                return Self::new(strategy, value.trim());
            }
        }

        if pattern.starts_with('/') || pattern.starts_with('(') {
            Self::xpath(pattern)
        } else {
            Self::css(pattern)
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Reject locators that are malformed before they reach the browser.
    ///
    /// Syntax only the browser can judge (CSS, XPath) is checked at lookup
    /// time by the driver.
    pub fn validate(&self) -> Result<()> {
        if self.selector.trim().is_empty() {
            return Err(Error::InvalidLocator(format!(
                "{}: empty selector",
                self.strategy
            )));
        }
        if self.strategy == Strategy::Class && self.selector.trim().contains(char::is_whitespace)
        {
            return Err(Error::InvalidLocator(format!(
                "{self}: compound class names are not permitted"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy, self.selector)
    }
}

/// Ordered alternatives for one logical element, most stable first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSet {
    name: String,
    locators: Vec<Locator>,
}

impl LocatorSet {
    pub fn new(name: impl Into<String>, locators: impl IntoIterator<Item = Locator>) -> Self {
        Self {
            name: name.into(),
            locators: locators.into_iter().collect(),
        }
    }

    /// Build a set from `kind:value` patterns.
    pub fn parse<S: AsRef<str>>(name: impl Into<String>, patterns: &[S]) -> Self {
        Self::new(name, patterns.iter().map(|p| Locator::parse(p.as_ref())))
    }

    /// Logical element name, used in logs and failure messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// A new set with `extra` tried before this set's own candidates.
    pub fn preceded_by(&self, extra: impl IntoIterator<Item = Locator>) -> Self {
        let mut locators: Vec<Locator> = extra.into_iter().collect();
        locators.extend(self.locators.iter().cloned());
        Self {
            name: self.name.clone(),
            locators,
        }
    }
}

impl fmt::Display for LocatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.name)?;
        for (i, locator) in self.locators.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{locator}")?;
        }
        f.write_str("]")
    }
}

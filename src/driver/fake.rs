//! In-memory [`Driver`] for unit tests: a handful of static pages whose
//! elements are matched by the exact locators registered for them.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use super::{Driver, Element};
use crate::locator::Locator;
use crate::{Error, Result};

/// What clicking an element does.
#[derive(Debug, Clone)]
pub(crate) enum Effect {
    /// Load another registered page.
    Navigate(String),
    /// Make the element with this selector present and visible.
    Reveal(String),
    /// Flip the checked state of the clicked element.
    Toggle,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeElement {
    selector: String,
    locators: Vec<Locator>,
    tag: String,
    text: String,
    value: String,
    checked: bool,
    present: bool,
    visible: bool,
    appears_after: Option<Duration>,
    on_click: Vec<Effect>,
}

impl FakeElement {
    pub(crate) fn new(selector: &str, patterns: &[&str]) -> Self {
        Self {
            selector: selector.into(),
            locators: patterns.iter().map(|p| Locator::parse(p)).collect(),
            tag: "div".into(),
            text: String::new(),
            value: String::new(),
            checked: false,
            present: true,
            visible: true,
            appears_after: None,
            on_click: Vec::new(),
        }
    }

    pub(crate) fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.into();
        self
    }

    pub(crate) fn text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub(crate) fn value(mut self, value: &str) -> Self {
        self.value = value.into();
        self
    }

    /// Present in the DOM but not displayed.
    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Not in the DOM until revealed by a click.
    pub(crate) fn absent(mut self) -> Self {
        self.present = false;
        self.visible = false;
        self
    }

    pub(crate) fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    pub(crate) fn on_click(mut self, effect: Effect) -> Self {
        self.on_click.push(effect);
        self
    }

    fn handle(&self) -> Element {
        Element {
            selector: self.selector.clone(),
            tag: self.tag.clone(),
            text: self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    title: String,
    text: String,
    elements: Vec<FakeElement>,
}

impl FakePage {
    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub(crate) fn text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub(crate) fn element(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Drop the elements with these selectors.
    pub(crate) fn without(mut self, selectors: &[&str]) -> Self {
        self.elements.retain(|e| !selectors.contains(&e.selector.as_str()));
        self
    }
}

struct State {
    current: String,
    pages: HashMap<String, FakePage>,
    malformed: HashSet<Locator>,
    probes: Vec<Locator>,
    events: Vec<String>,
    loaded_at: Instant,
}

/// Registered page for `url`, ignoring cache-busting query parameters.
fn page_key(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let kept: Vec<&str> = query
        .split('&')
        .filter(|p| !p.starts_with("cb=") && *p != "nocache=1")
        .collect();
    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, kept.join("&"))
    }
}

impl State {
    fn page(&self) -> Result<&FakePage> {
        self.pages
            .get(&page_key(&self.current))
            .ok_or_else(|| Error::ActionFailed(format!("no fake page at {}", self.current)))
    }

    fn element_mut(&mut self, selector: &str) -> Result<&mut FakeElement> {
        let current = page_key(&self.current);
        self.pages
            .get_mut(&current)
            .and_then(|p| {
                p.elements
                    .iter_mut()
                    .find(|e| e.present && e.selector == selector)
            })
            .ok_or_else(|| {
                Error::ActionFailed(format!("element '{}' is no longer attached", selector))
            })
    }

    fn navigate(&mut self, url: &str) {
        self.current = url.to_string();
        self.loaded_at = Instant::now();
    }
}

pub(crate) struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    pub(crate) fn new(start_url: &str) -> Self {
        Self {
            state: Mutex::new(State {
                current: start_url.into(),
                pages: HashMap::new(),
                malformed: HashSet::new(),
                probes: Vec::new(),
                events: Vec::new(),
                loaded_at: Instant::now(),
            }),
        }
    }

    pub(crate) fn page(self, url: &str, page: FakePage) -> Self {
        self.lock().pages.insert(url.into(), page);
        self
    }

    /// Make the page reject `pattern` as invalid syntax.
    pub(crate) fn malformed(self, pattern: &str) -> Self {
        self.lock().malformed.insert(Locator::parse(pattern));
        self
    }

    /// Every locator probed so far, in order.
    pub(crate) fn probes(&self) -> Vec<Locator> {
        self.lock().probes.clone()
    }

    /// Actions performed so far (`open`, `click`, `type`, ...).
    pub(crate) fn events(&self) -> Vec<String> {
        self.lock().events.clone()
    }

    pub(crate) fn url(&self) -> String {
        self.lock().current.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Driver for FakeDriver {
    async fn open(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.events.push(format!("open {url}"));
        state.navigate(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.lock().page()?.title.clone())
    }

    async fn page_text(&self) -> Result<String> {
        Ok(self.lock().page()?.text.clone())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<Element>> {
        let mut state = self.lock();
        state.probes.push(locator.clone());
        if state.malformed.contains(locator) {
            return Err(Error::InvalidLocator(format!("{locator}: rejected by page")));
        }
        let elapsed = state.loaded_at.elapsed();
        let found = state
            .page()?
            .elements
            .iter()
            .filter(|e| e.present)
            .filter(|e| e.appears_after.map_or(true, |d| elapsed >= d))
            .find(|e| e.locators.contains(locator))
            .map(FakeElement::handle);
        Ok(found)
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(self.lock().element_mut(&element.selector)?.text.clone())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        let mut state = self.lock();
        let el = state.element_mut(&element.selector)?;
        Ok(match name {
            "value" => Some(el.value.clone()),
            "checked" => Some(el.checked.to_string()),
            _ => None,
        })
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        Ok(self.lock().element_mut(&element.selector)?.visible)
    }

    async fn is_selected(&self, element: &Element) -> Result<bool> {
        Ok(self.lock().element_mut(&element.selector)?.checked)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        let mut state = self.lock();
        state.events.push(format!("click {}", element.selector));
        let effects = {
            let el = state.element_mut(&element.selector)?;
            if !el.visible {
                return Err(Error::ActionFailed(format!(
                    "element '{}' is not interactable",
                    element.selector
                )));
            }
            el.on_click.clone()
        };
        for effect in effects {
            match effect {
                Effect::Navigate(url) => state.navigate(&url),
                Effect::Toggle => {
                    let el = state.element_mut(&element.selector)?;
                    el.checked = !el.checked;
                }
                Effect::Reveal(selector) => {
                    let current = page_key(&state.current);
                    if let Some(target) = state
                        .pages
                        .get_mut(&current)
                        .and_then(|p| p.elements.iter_mut().find(|e| e.selector == selector))
                    {
                        target.present = true;
                        target.visible = true;
                    }
                }
            }
        }
        Ok(())
    }

    async fn send_text(&self, element: &Element, text: &str) -> Result<()> {
        let mut state = self.lock();
        state
            .events
            .push(format!("type {}={}", element.selector, text));
        state.element_mut(&element.selector)?.value.push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        let mut state = self.lock();
        state.events.push(format!("clear {}", element.selector));
        state.element_mut(&element.selector)?.value.clear();
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        self.lock()
            .events
            .push(format!("scroll {}", element.selector));
        Ok(())
    }

    async fn execute(&self, js: &str) -> Result<serde_json::Value> {
        self.lock().events.push("execute".into());
        if js.contains("readyState") {
            return Ok(serde_json::Value::String("complete".into()));
        }
        Ok(serde_json::Value::Null)
    }

    async fn clear_site_data(&self) -> Result<()> {
        self.lock().events.push("clear_site_data".into());
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG fake".to_vec())
    }

    async fn quit(self) -> Result<()> {
        Ok(())
    }
}

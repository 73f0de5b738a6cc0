//! [`Driver`] over a Chromium page controlled through `eoka`.

use eoka::{Browser, Page};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{Driver, Element};
use crate::config::BrowserConfig;
use crate::locator::Locator;
use crate::{Error, Result};

/// Locate one element by strategy and return a unique CSS path for it.
const FIND_JS: &str = r#"
((type, value) => {
    const norm = s => (s || '').replace(/\s+/g, ' ').trim();
    const lc = s => norm(s).toLowerCase();

    function selector(el) {
        if (el.id) return '#' + CSS.escape(el.id);
        const path = [];
        let n = el;
        while (n && n.nodeType === 1) {
            let s = n.tagName.toLowerCase();
            if (n.id) { path.unshift('#' + CSS.escape(n.id)); break; }
            const p = n.parentElement;
            if (p) {
                const sibs = [...p.children].filter(c => c.tagName === n.tagName);
                if (sibs.length > 1) s += ':nth-of-type(' + (sibs.indexOf(n) + 1) + ')';
            }
            path.unshift(s);
            n = p;
        }
        return path.join(' > ');
    }

    let el = null;
    try {
        switch (type) {
            case 'id':
                el = document.getElementById(value);
                break;
            case 'name':
                el = document.getElementsByName(value)[0] || null;
                break;
            case 'css':
                el = document.querySelector(value);
                break;
            case 'xpath':
                el = document.evaluate(value, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (el && el.nodeType !== 1) el = el.parentElement;
                break;
            case 'link':
                el = [...document.querySelectorAll('a')].find(a => norm(a.innerText) === norm(value)) || null;
                break;
            case 'partial_link':
                el = [...document.querySelectorAll('a')].find(a => norm(a.innerText).includes(norm(value))) || null;
                break;
            case 'tag':
                el = document.getElementsByTagName(value)[0] || null;
                break;
            case 'class':
                el = document.getElementsByClassName(value)[0] || null;
                break;
            case 'text': {
                const needle = lc(value);
                const hits = [...document.body.querySelectorAll('*')]
                    .filter(e => lc(e.textContent).includes(needle));
                el = hits.find(e => ![...e.children].some(c => lc(c.textContent).includes(needle))) || null;
                break;
            }
            case 'placeholder':
                el = [...document.querySelectorAll('input[placeholder],textarea[placeholder]')]
                    .find(e => lc(e.placeholder).includes(lc(value))) || null;
                break;
            default:
                return { found: false, invalid: true, error: 'unknown strategy ' + type };
        }
    } catch (e) {
        return { found: false, invalid: true, error: String((e && e.message) || e) };
    }

    if (!el) return { found: false };
    const text = norm(el.innerText || el.textContent || el.value || '');
    return { found: true, selector: selector(el), tag: el.tagName.toLowerCase(), text: text.slice(0, 60) };
})
"#;

/// Reply from [`FIND_JS`].
#[derive(Debug, Deserialize)]
struct Probe {
    found: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    selector: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    text: String,
}

/// Reply from a script run against one element.
#[derive(Debug, Deserialize)]
struct Attached {
    attached: bool,
    #[serde(default)]
    value: serde_json::Value,
}

const CLEAR_STORAGE_JS: &str =
    "try { window.localStorage.clear(); window.sessionStorage.clear(); } catch (e) {}";

/// A launched browser and the single page a session drives.
pub struct EokaDriver {
    browser: Browser,
    page: Page,
}

impl EokaDriver {
    /// Launch a browser with the given settings and open a blank page.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.width,
            viewport_height: config.viewport.height,
            ..Default::default()
        };

        debug!(
            "Launching {} (headless: {}, proxy: {:?})",
            config.kind, config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    /// The underlying page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run `body` with `el` bound to the element, failing if it left the DOM.
    async fn on_element<T: DeserializeOwned>(&self, element: &Element, body: &str) -> Result<T> {
        let js = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return {{ attached: false }}; \
             return {{ attached: true, value: (() => {{ {body} }})() }}; }})()",
            sel = js_string(&element.selector)?,
        );
        let reply: Attached = self.page.evaluate(&js).await?;
        if !reply.attached {
            return Err(Error::ActionFailed(format!(
                "element '{}' is no longer attached",
                element.selector
            )));
        }
        Ok(serde_json::from_value(reply.value)?)
    }
}

fn js_string(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

impl Driver for EokaDriver {
    async fn open(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.title().await?)
    }

    async fn page_text(&self) -> Result<String> {
        Ok(self.page.text().await?)
    }

    async fn find(&self, locator: &Locator) -> Result<Option<Element>> {
        let js = format!(
            "{}({},{})",
            FIND_JS,
            js_string(locator.strategy().as_str())?,
            js_string(locator.selector())?
        );
        let probe: Probe = self.page.evaluate(&js).await?;

        if probe.invalid {
            return Err(Error::InvalidLocator(format!(
                "{}: {}",
                locator,
                probe.error.unwrap_or_default()
            )));
        }
        if !probe.found {
            return Ok(None);
        }
        Ok(Some(Element {
            selector: probe.selector,
            tag: probe.tag,
            text: probe.text,
        }))
    }

    async fn text(&self, element: &Element) -> Result<String> {
        self.on_element(
            element,
            "return (el.innerText || el.textContent || '').trim();",
        )
        .await
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        let body = format!(
            "const k = {name}; const v = el[k]; \
             if (v !== undefined && v !== null && typeof v !== 'object' && typeof v !== 'function') return String(v); \
             return el.getAttribute(k);",
            name = js_string(name)?
        );
        self.on_element(element, &body).await
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        self.on_element(
            element,
            "const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';",
        )
        .await
    }

    async fn is_selected(&self, element: &Element) -> Result<bool> {
        self.on_element(element, "return !!el.checked || !!el.selected;")
            .await
    }

    async fn click(&self, element: &Element) -> Result<()> {
        self.page.click(&element.selector).await?;
        Ok(())
    }

    async fn send_text(&self, element: &Element, text: &str) -> Result<()> {
        self.on_element::<serde_json::Value>(element, "el.focus(); return null;")
            .await?;
        self.page.type_text(text).await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        self.page.fill(&element.selector, "").await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        self.on_element::<serde_json::Value>(
            element,
            "el.scrollIntoView({ behavior: 'instant', block: 'center' }); return null;",
        )
        .await?;
        Ok(())
    }

    async fn execute(&self, js: &str) -> Result<serde_json::Value> {
        Ok(self.page.evaluate(js).await?)
    }

    async fn clear_site_data(&self) -> Result<()> {
        let cookies = serde_json::to_value(self.page.cookies().await?)?;
        let mut removed = 0;
        for cookie in cookies.as_array().into_iter().flatten() {
            let Some(name) = cookie["name"].as_str() else {
                continue;
            };
            self.page
                .delete_cookie(name, cookie["domain"].as_str())
                .await?;
            removed += 1;
        }
        self.page.execute(CLEAR_STORAGE_JS).await?;
        debug!("Cleared {} cookies and web storage", removed);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.page.screenshot().await?)
    }

    async fn quit(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

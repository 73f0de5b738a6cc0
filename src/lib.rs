//! # storefront-e2e
//!
//! End-to-end browser tests for an OpenCart storefront. Elements are looked up
//! through ordered sets of candidate locators, so a suite keeps working when
//! the markup drifts between store versions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use storefront_e2e::{SuiteConfig, SuiteRunner};
//!
//! # #[tokio::main]
//! # async fn main() -> storefront_e2e::Result<()> {
//! let config = SuiteConfig::load("configs/example.yaml")?;
//! let scenarios = config.selected_scenarios()?;
//! let report = SuiteRunner::new(&config).run(&scenarios).await;
//! println!("{} passed, {} failed", report.passed(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod locator;
pub mod pages;
pub mod resolver;
mod runner;
pub mod session;
pub mod suite;
pub mod wait;

pub use config::{BrowserConfig, BrowserKind, ParamDef, Params, ResolverConfig, SuiteConfig};
pub use driver::{Driver, Element, EokaDriver};
pub use locator::{Locator, LocatorSet, Strategy};
pub use resolver::{Lookup, Match, Resolver};
pub use runner::{ScenarioResult, SuiteReport, SuiteRunner};
pub use session::Session;
pub use suite::Scenario;

/// Result type for storefront-e2e operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a test run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("{element}: no candidate locator matched ({candidates} tried within {waited_ms}ms)")]
    ElementNotFound {
        element: String,
        candidates: usize,
        waited_ms: u64,
    },

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("action failed: {0}")]
    ActionFailed(String),
}

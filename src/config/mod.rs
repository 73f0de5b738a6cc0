pub mod params;
pub mod schema;

pub use params::{ParamDef, Params};
pub use schema::{
    Accounts, BrowserConfig, BrowserKind, Credentials, OnFailure, Registration, ResolverConfig,
    RetryConfig, SuiteConfig, Viewport, DEFAULT_BASE_URL,
};

/// Run timestamp used for `{timestamp}` tokens.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string()
}

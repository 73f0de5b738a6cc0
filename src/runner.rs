use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{self, params, SuiteConfig};
use crate::driver::{Driver, EokaDriver};
use crate::session::Session;
use crate::suite::Scenario;
use crate::Result;

/// Result of running one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// Whether the scenario passed.
    pub success: bool,
    /// Error message of the last failed attempt.
    pub error: Option<String>,
    /// Total duration in milliseconds, retries included.
    pub duration_ms: u64,
    /// Number of retry attempts made.
    pub retries: u32,
    /// Screenshot taken after the final failed attempt.
    pub screenshot: Option<PathBuf>,
}

/// Results of a suite run, in the order the scenarios ran.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

/// Runs scenarios one after another, each in a fresh browser session.
pub struct SuiteRunner {
    config: SuiteConfig,
}

impl SuiteRunner {
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Run `scenarios`, launching a browser for every attempt.
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let config = &self.config;
        self.run_with(scenarios, || Session::<EokaDriver>::launch(config)).await
    }

    /// Run `scenarios` on sessions produced by `launch`.
    pub async fn run_with<D, F, Fut>(&self, scenarios: &[Scenario], mut launch: F) -> SuiteReport
    where
        D: Driver,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Session<D>>>,
    {
        let mut report = SuiteReport::default();
        for (i, scenario) in scenarios.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, scenarios.len(), scenario);
            let result = self.run_scenario(*scenario, &mut launch).await;
            if result.success {
                info!("{} passed in {}ms", scenario, result.duration_ms);
            } else {
                warn!(
                    "{} failed: {}",
                    scenario,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            report.results.push(result);
        }
        report
    }

    async fn run_scenario<D, F, Fut>(&self, scenario: Scenario, launch: &mut F) -> ScenarioResult
    where
        D: Driver,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Session<D>>>,
    {
        let start = Instant::now();
        let retry_config = self.config.on_failure.retry.as_ref();
        let max_attempts = retry_config.map(|r| r.attempts).unwrap_or(1).max(1);
        let retry_delay = retry_config.map(|r| r.delay_ms).unwrap_or(0);

        let mut last_error = None;
        let mut screenshot = None;
        let mut retries = 0;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                retries += 1;
                info!("Retry attempt {}/{}", attempt, max_attempts);
                if retry_delay > 0 {
                    tokio::time::sleep(Duration::from_millis(retry_delay)).await;
                }
            }

            let session = match launch().await {
                Ok(session) => session,
                Err(e) => {
                    warn!("Attempt {} could not start a browser: {}", attempt, e);
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            let outcome = scenario.run(&session).await;
            if let Err(ref e) = outcome {
                warn!("Attempt {} failed: {}", attempt, e);
                last_error = Some(e.to_string());
                if attempt == max_attempts {
                    screenshot = self.handle_failure(&session, scenario).await;
                }
            }
            if let Err(e) = session.close().await {
                debug!("Closing the browser failed: {}", e);
            }

            if outcome.is_ok() {
                return ScenarioResult {
                    scenario,
                    success: true,
                    error: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                    retries,
                    screenshot: None,
                };
            }
        }

        ScenarioResult {
            scenario,
            success: false,
            error: last_error,
            duration_ms: start.elapsed().as_millis() as u64,
            retries,
            screenshot,
        }
    }

    async fn handle_failure<D: Driver>(
        &self,
        session: &Session<D>,
        scenario: Scenario,
    ) -> Option<PathBuf> {
        let template = self.config.on_failure.screenshot.as_deref()?;
        let timestamp = config::timestamp();
        let path = params::expand_tokens(
            template,
            &[("scenario", scenario.id()), ("timestamp", &timestamp)],
        );
        info!("Saving failure screenshot to: {}", path);
        match session.save_screenshot(&path).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to save screenshot: {}", e);
                None
            }
        }
    }
}

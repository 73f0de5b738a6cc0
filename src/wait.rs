//! Condition polling for UI transitions (dropdowns, form submissions,
//! navigations) in place of fixed sleeps.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::{Error, Result};

/// Poll `condition` every `interval` until it returns `true`.
///
/// The condition is always evaluated at least once, and once more at the
/// deadline, so a zero timeout means "check now". Errors from the condition
/// abort the wait.
pub async fn until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    description: &str,
    mut condition: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition().await? {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            debug!("gave up waiting for {} after {:?}", description, timeout);
            return Err(Error::Timeout(format!(
                "{} (waited {}ms)",
                description,
                timeout.as_millis()
            )));
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

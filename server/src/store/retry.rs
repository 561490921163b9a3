use anyhow::anyhow;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Exponential backoff schedule for polling external systems.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub steps: u32,
    pub initial: Duration,
    pub factor: f64,
}

impl Backoff {
    /// Schedule used when waiting for an external endpoint to come up:
    /// 10 attempts starting at 3 s, doubling.
    pub fn endpoint() -> Self {
        Self {
            steps: 10,
            initial: Duration::from_secs(3),
            factor: 2.0,
        }
    }
}

/// Run `condition` until it reports done or the schedule is exhausted.
///
/// An error from `condition` never ends the loop early; transient
/// failures are expected while the external system catches up. The
/// last observed error is returned if the schedule runs out, otherwise
/// a plain timeout error.
pub async fn retry<F, Fut>(schedule: Backoff, mut condition: F) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let mut last_err = None;
    let mut delay = schedule.initial;
    for attempt in 0..schedule.steps {
        match condition().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => last_err = Some(e),
        }
        if attempt + 1 < schedule.steps {
            sleep(delay).await;
            delay = delay.mul_f64(schedule.factor);
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("timed out waiting for condition")))
}

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::admin::ReplicaSetAdmin;
use crate::error::{Result, RsInitError};
use crate::types::{is_primary, member_state};

/// How long to wait after `replSetInitiate` before reporting success.
///
/// The wait is a fixed `delay` followed by up to `poll_attempts` status polls
/// that stop as soon as the member reports PRIMARY. With `poll_attempts == 0`
/// only the fixed delay applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlePolicy {
    #[serde(with = "millis")]
    pub delay: Duration,
    pub poll_attempts: u32,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    #[serde(with = "millis")]
    pub max_poll_interval: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(2000),
            poll_attempts: 10,
            poll_interval: Duration::from_millis(500),
            max_poll_interval: Duration::from_secs(5),
        }
    }
}

impl SettlePolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            poll_attempts: 0,
            ..Self::default()
        }
    }

    /// Interval before poll number `attempt` (0-based), doubling each time.
    pub fn poll_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.poll_interval
            .checked_mul(factor)
            .unwrap_or(self.max_poll_interval)
            .min(self.max_poll_interval)
    }
}

/// Resolves `fut` unless `cancel` fires first. A cancelled token always wins.
pub(crate) async fn cancellable<F: Future>(
    fut: F,
    cancel: &CancellationToken,
) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RsInitError::Cancelled),
        out = fut => Ok(out),
    }
}

/// Waits for a freshly initiated replica set according to `policy`.
pub async fn wait_until_ready<A>(
    admin: &A,
    policy: &SettlePolicy,
    cancel: &CancellationToken,
) -> Result<()>
where
    A: ReplicaSetAdmin + ?Sized,
{
    cancellable(tokio::time::sleep(policy.delay), cancel).await?;

    if policy.poll_attempts == 0 {
        return Ok(());
    }

    for attempt in 0..policy.poll_attempts {
        match cancellable(admin.replica_set_status(), cancel).await? {
            Ok(status) if is_primary(&status) => {
                tracing::debug!(attempt, "member reports PRIMARY");
                return Ok(());
            }
            Ok(status) => {
                tracing::info!(
                    attempt,
                    state = ?member_state(&status),
                    "replica set not primary yet"
                );
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "status poll failed");
            }
        }

        if attempt + 1 < policy.poll_attempts {
            cancellable(tokio::time::sleep(policy.poll_backoff(attempt)), cancel).await?;
        }
    }

    Err(RsInitError::NotReady {
        attempts: policy.poll_attempts,
    })
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

//! 重试策略模块
//!
//! 策略由调用方提供，适配器本身不重试。

pub mod exponential;
pub mod fixed;

pub use exponential::ExponentialBackoffPolicy;
pub use fixed::FixedRetryPolicy;

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use crate::error::BridgeError;

/// 重试策略 trait
pub trait RetryPolicy {
    /// `attempt` 为已失败的次数（从 1 开始），`elapsed` 为第一次尝试至今的时间
    fn should_retry(&self, attempt: usize, elapsed: Duration, error: &BridgeError) -> bool;
    fn backoff_duration(&self, attempt: usize) -> Duration;
    fn max_attempts(&self) -> usize;
}

/// 按策略重试异步操作，返回最后一次的结果
///
/// ```no_run
/// use registry_bridge::retry::{retry, ExponentialBackoffPolicy};
/// use registry_bridge::registry::RegistryAdapter;
///
/// # async fn example(adapter: &dyn RegistryAdapter) -> registry_bridge::Result<()> {
/// let policy = ExponentialBackoffPolicy::default();
/// retry(&policy, || adapter.ping()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry<P, F, Fut, T>(policy: &P, mut op: F) -> Result<T, BridgeError>
where
    P: RetryPolicy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BridgeError>>,
{
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !policy.should_retry(attempt, started.elapsed(), &err) {
                    return Err(err);
                }
                let delay = policy.backoff_duration(attempt);
                warn!("attempt {} failed: {}, retrying in {:?}", attempt, err, delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

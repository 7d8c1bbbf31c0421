use super::RetryPolicy;
use rand::Rng;
use std::time::Duration;

use crate::error::BridgeError;

/// 指数退避重试策略
///
/// 第 n 次失败后等待 `initial_interval * multiplier^(n-1)`，上限 `max_interval`，
/// 再按 `randomization_factor` 加抖动。次数上限和总耗时上限任一到达即停止。
pub struct ExponentialBackoffPolicy {
    max_attempts: usize,
    max_elapsed: Option<Duration>,
    initial_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
}

impl Default for ExponentialBackoffPolicy {
    /// 500ms 起步，倍率 1.5，单次上限 60 秒，总耗时上限 15 分钟
    fn default() -> Self {
        Self {
            max_attempts: usize::MAX,
            max_elapsed: Some(Duration::from_secs(15 * 60)),
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(60),
            multiplier: 1.5,
            randomization_factor: 0.5,
        }
    }
}

impl ExponentialBackoffPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            max_elapsed: None,
            initial_interval: base_delay,
            max_interval: max_delay,
            multiplier: 2.0,
            randomization_factor: 0.0,
        }
    }

    /// 设置总耗时上限
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// 抖动比例，取值 0.0..=1.0
    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor.clamp(0.0, 1.0);
        self
    }
}

impl RetryPolicy for ExponentialBackoffPolicy {
    fn should_retry(&self, attempt: usize, elapsed: Duration, error: &BridgeError) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        if let Some(max_elapsed) = self.max_elapsed {
            if elapsed >= max_elapsed {
                return false;
            }
        }

        // 只对可重试的错误进行重试
        error.is_retryable()
    }

    fn backoff_duration(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(32) as i32;
        let base = self.initial_interval.as_secs_f64() * self.multiplier.powi(exp);
        let base = base.min(self.max_interval.as_secs_f64());

        if self.randomization_factor <= 0.0 {
            return Duration::from_secs_f64(base);
        }

        let delta = base * self.randomization_factor;
        let jittered = rand::thread_rng().gen_range((base - delta)..=(base + delta));
        Duration::from_secs_f64(jittered.max(0.0))
    }

    fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

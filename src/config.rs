//! Worker configuration
//!
//! Read once at startup from the process environment (after `.env` has been
//! loaded). Every setting has a default so a local Judge0 and Redis work
//! without any configuration.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::judge_client::{Judge0Config, PollPolicy};

/// Peak memory allowed for a single test case run, in KB
pub const DEFAULT_MEMORY_LIMIT_KB: u64 = 256_000;

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub redis_url: String,
    pub judge0: Judge0Config,
    pub poll: PollPolicy,
    pub memory_limit_kb: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".into(),
            judge0: Judge0Config::default(),
            poll: PollPolicy::default(),
            memory_limit_kb: DEFAULT_MEMORY_LIMIT_KB,
        }
    }
}

impl JudgeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let judge0 = Judge0Config {
            base_url: get("JUDGE0_API_URL").unwrap_or(defaults.judge0.base_url),
            auth_token: get("JUDGE0_AUTH_TOKEN"),
            base64_encoded: parse_or(&get, "JUDGE0_BASE64", defaults.judge0.base64_encoded)?,
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "JUDGE_HTTP_TIMEOUT_SECS",
                defaults.judge0.request_timeout.as_secs(),
            )?),
        };

        let poll = PollPolicy {
            initial_delay: Duration::from_millis(parse_or(
                &get,
                "JUDGE_POLL_INITIAL_MS",
                defaults.poll.initial_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_or(
                &get,
                "JUDGE_POLL_MAX_DELAY_MS",
                defaults.poll.max_delay.as_millis() as u64,
            )?),
            timeout: Duration::from_secs(parse_or(
                &get,
                "JUDGE_POLL_TIMEOUT_SECS",
                defaults.poll.timeout.as_secs(),
            )?),
        };

        if poll.initial_delay.is_zero() || poll.max_delay.is_zero() {
            anyhow::bail!("JUDGE_POLL_INITIAL_MS and JUDGE_POLL_MAX_DELAY_MS must be positive");
        }
        if poll.timeout.is_zero() {
            anyhow::bail!("JUDGE_POLL_TIMEOUT_SECS must be positive");
        }
        if poll.initial_delay > poll.max_delay {
            anyhow::bail!(
                "JUDGE_POLL_INITIAL_MS ({}ms) exceeds JUDGE_POLL_MAX_DELAY_MS ({}ms)",
                poll.initial_delay.as_millis(),
                poll.max_delay.as_millis()
            );
        }

        Ok(Self {
            redis_url: get("REDIS_URL").unwrap_or(defaults.redis_url),
            judge0,
            poll,
            memory_limit_kb: parse_or(&get, "JUDGE_MEMORY_LIMIT_KB", defaults.memory_limit_kb)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, raw)),
        None => Ok(default),
    }
}

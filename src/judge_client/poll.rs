//! Waiting for a terminal backend result

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use super::{JudgeClient, JudgeClientError, JudgeResult};

/// Exponential backoff bounds for result polling
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first fetch
    pub initial_delay: Duration,
    /// Upper bound for a single delay step
    pub max_delay: Duration,
    /// Overall time budget for one run
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(20),
        }
    }
}

impl PollPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

/// Fetch `token` until the backend reports a terminal status.
///
/// Delays double after every non-terminal fetch, capped at `max_delay`.
/// Once `timeout` has elapsed without a terminal status the run is given up
/// with [`JudgeClientError::PollTimeout`]; fetch errors are returned as is.
pub async fn wait_for_result(
    client: &dyn JudgeClient,
    token: &str,
    policy: &PollPolicy,
) -> Result<JudgeResult, JudgeClientError> {
    let started = Instant::now();
    let mut delay = policy.initial_delay;
    let mut attempts = 0u32;

    loop {
        sleep(delay).await;
        attempts += 1;

        let result = client.fetch(token).await?;
        if result.status().is_terminal() {
            debug!(
                "Token {} finished after {} fetches: {}",
                token, attempts, result.status_description
            );
            return Ok(result);
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            return Err(JudgeClientError::PollTimeout(policy.timeout));
        }

        delay = policy.next_delay(delay).min(policy.timeout - elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge_client::fake::{judge_result, ScriptedJudge};
    use crate::judge_client::status_codes;

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_terminal() {
        let judge = ScriptedJudge::new();
        judge.push_sequence(vec![
            judge_result(status_codes::IN_QUEUE, None),
            judge_result(status_codes::PROCESSING, None),
            judge_result(status_codes::ACCEPTED, Some("[0,1]")),
        ]);

        let token = judge.dispatch("program", 62, "").await.unwrap();
        let result = wait_for_result(&judge, &token, &PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(result.status_id, status_codes::ACCEPTED);
        assert_eq!(result.stdout.as_deref(), Some("[0,1]"));
        assert_eq!(judge.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_on_stuck_run() {
        let judge = ScriptedJudge::new();
        judge.push_sequence(vec![judge_result(status_codes::PROCESSING, None)]);

        let policy = PollPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
            timeout: Duration::from_secs(2),
        };
        let token = judge.dispatch("program", 62, "").await.unwrap();
        let err = wait_for_result(&judge, &token, &policy).await.unwrap_err();

        assert!(matches!(err, JudgeClientError::PollTimeout(t) if t == Duration::from_secs(2)));
        let fetches = judge.fetch_count();
        assert!((6..=8).contains(&fetches), "unexpected fetch count {}", fetches);
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = PollPolicy::default();
        assert_eq!(policy.next_delay(Duration::from_millis(250)), Duration::from_millis(500));
        assert_eq!(policy.next_delay(Duration::from_millis(1500)), Duration::from_secs(2));
    }
}

//! Waiting for a stored submission to be finalized
//!
//! Used by callers that want a synchronous answer. The wait is capped: once
//! the cap is hit the latest snapshot is returned as it is, possibly still
//! `PENDING`. The evaluation itself is never cancelled.
//!
//! [`report_submission`] turns the snapshot into the caller-facing report,
//! with a status message, a hint for failures and the user's counters once
//! the problem is solved.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::core::{Submission, SubmissionStatus};
use crate::stats::{StatisticsUpdater, Tally};

/// Where submission snapshots are read from
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    async fn load_submission(&self, id: &str) -> Result<Option<Submission>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// Poll `source` until submission `id` leaves `PENDING` or the cap is reached
pub async fn wait_for_completion(
    source: &dyn SubmissionSource,
    id: &str,
    policy: &WaitPolicy,
) -> Result<Submission> {
    let started = Instant::now();

    loop {
        let submission = source
            .load_submission(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Submission {} not found", id))?;

        if !submission.status.is_pending() {
            return Ok(submission);
        }

        if started.elapsed() >= policy.max_wait {
            debug!(
                "Submission {} still pending after {}s, returning snapshot",
                id,
                policy.max_wait.as_secs()
            );
            return Ok(submission);
        }

        sleep(policy.interval).await;
    }
}

/// Report returned to a caller waiting on a graded submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub submission_id: String,
    pub status: SubmissionStatus,
    pub test_cases_passed: usize,
    pub total_test_cases: usize,
    pub execution_time: f64,
    pub memory_usage: u64,
    pub output: String,
    pub error: String,
    pub language: String,
    pub submitted_at: DateTime<Utc>,
    pub problem_solved: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Only present for accepted submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_stats: Option<Tally>,
}

impl SubmissionReport {
    pub fn new(submission: &Submission, user_stats: Option<Tally>) -> Self {
        let (message, hint) = describe(submission.status);
        let problem_solved = submission.status == SubmissionStatus::Accepted;

        Self {
            submission_id: submission.id.clone(),
            status: submission.status,
            test_cases_passed: submission.test_cases_passed,
            total_test_cases: submission.total_test_cases,
            execution_time: submission.execution_time,
            memory_usage: submission.memory_usage,
            output: submission.output.clone(),
            error: submission.error.clone(),
            language: submission.language.clone(),
            submitted_at: submission.submitted_at,
            problem_solved,
            message,
            hint: hint.map(String::from),
            user_stats: user_stats.filter(|_| problem_solved),
        }
    }
}

/// Caller-facing message and hint for a final status
fn describe(status: SubmissionStatus) -> (String, Option<&'static str>) {
    match status {
        SubmissionStatus::Accepted => ("🎉 Congratulations! All test cases passed!".into(), None),
        SubmissionStatus::TimeLimitExceeded => (
            "⏰ Time Limit Exceeded! Try optimizing your algorithm.".into(),
            Some("Consider using more efficient data structures or algorithms with better time complexity."),
        ),
        SubmissionStatus::MemoryLimitExceeded => (
            "💾 Memory Limit Exceeded! Your solution uses too much memory.".into(),
            Some("Try to optimize memory usage by using more efficient data structures."),
        ),
        SubmissionStatus::WrongAnswer => (
            "❌ Wrong Answer. Some test cases failed.".into(),
            Some("Check your logic and edge cases. Review the problem constraints."),
        ),
        SubmissionStatus::CompilationError => (
            "🔧 Compilation Error. Please fix syntax errors.".into(),
            Some("Check for syntax errors, missing semicolons, or incorrect variable declarations."),
        ),
        SubmissionStatus::RuntimeError => (
            "💥 Runtime Error occurred during execution.".into(),
            Some("Check for array bounds, null pointer exceptions, or division by zero."),
        ),
        other => (format!("❓ Submission completed with status: {}", other), None),
    }
}

/// Wait for submission `id` and build its report. The user's counters are
/// only looked up when the submission was accepted.
pub async fn report_submission(
    source: &dyn SubmissionSource,
    stats: &StatisticsUpdater,
    id: &str,
    policy: &WaitPolicy,
) -> Result<SubmissionReport> {
    let submission = wait_for_completion(source, id, policy).await?;

    let user_stats = if submission.status == SubmissionStatus::Accepted {
        stats.user_tally(&submission.user_id).await
    } else {
        None
    };

    Ok(SubmissionReport::new(&submission, user_stats))
}

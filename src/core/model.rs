//! Data model shared by the judging pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::verdict::SubmissionStatus;

/// Code submitted by a user, as received from the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub problem_id: String,
    pub source_code: String,
    /// Language name (e.g. "java", "cpp", "python")
    pub language: String,
    /// Backend language id; falls back to the language registry when absent
    #[serde(default)]
    pub language_id: Option<u32>,
}

/// One user's attempt at one problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    pub problem_id: String,
    pub source_code: String,
    pub language: String,
    pub language_id: u32,
    pub status: SubmissionStatus,
    /// Human-readable per test case transcript
    pub output: String,
    /// Aggregated error log
    pub error: String,
    /// Maximum observed execution time in seconds
    pub execution_time: f64,
    /// Maximum observed memory in KB
    pub memory_usage: u64,
    pub submitted_at: DateTime<Utc>,
    pub test_cases_passed: usize,
    pub total_test_cases: usize,
}

impl Submission {
    /// Create a `PENDING` submission from a request
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        request: &SubmissionRequest,
        language_id: u32,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            problem_id: request.problem_id.clone(),
            source_code: request.source_code.clone(),
            language: request.language.clone(),
            language_id,
            status: SubmissionStatus::Pending,
            output: String::new(),
            error: String::new(),
            execution_time: 0.0,
            memory_usage: 0,
            submitted_at: Utc::now(),
            test_cases_passed: 0,
            total_test_cases: 0,
        }
    }
}

/// Authoritative grading case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// User-facing illustrative case, used by the sample run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    /// Prose input such as `nums = [2,7,11,15], target = 9`
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub explanation: String,
}

/// A coding exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    /// Stable problem family tag (e.g. "two_sum"); preferred over the title
    #[serde(default)]
    pub problem_type: Option<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub total_submissions: u64,
    #[serde(default)]
    pub total_solved: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_submission_is_pending() {
        let request = SubmissionRequest {
            problem_id: "p1".into(),
            source_code: "class Solution {}".into(),
            language: "java".into(),
            language_id: Some(62),
        };
        let submission = Submission::new("s1", "u1", &request, 62);

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.problem_id, "p1");
        assert_eq!(submission.test_cases_passed, 0);
    }

    #[test]
    fn test_problem_deserializes_with_defaults() {
        let problem: Problem = serde_json::from_str(
            r#"{"id":"p1","title":"Two Sum","test_cases":[{"input":"[1,2]\n3","expected_output":"[0,1]"}]}"#,
        )
        .unwrap();

        assert_eq!(problem.test_cases.len(), 1);
        assert!(!problem.test_cases[0].is_hidden);
        assert!(problem.examples.is_empty());
        assert!(problem.problem_type.is_none());
    }
}

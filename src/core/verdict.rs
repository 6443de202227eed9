use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompilationError,
    InternalError,
}

impl SubmissionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionStatus::Pending)
    }

    /// Terminal classifications that stop the test case loop.
    ///
    /// `WrongAnswer` is listed because it is only ever assigned during the
    /// loop when the backend itself reported it; a locally detected output
    /// mismatch does not touch the status until the loop is done.
    pub fn is_fail_fast(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::WrongAnswer
                | SubmissionStatus::TimeLimitExceeded
                | SubmissionStatus::MemoryLimitExceeded
                | SubmissionStatus::RuntimeError
                | SubmissionStatus::CompilationError
                | SubmissionStatus::InternalError
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Accepted => "ACCEPTED",
            SubmissionStatus::WrongAnswer => "WRONG_ANSWER",
            SubmissionStatus::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
            SubmissionStatus::MemoryLimitExceeded => "MEMORY_LIMIT_EXCEEDED",
            SubmissionStatus::RuntimeError => "RUNTIME_ERROR",
            SubmissionStatus::CompilationError => "COMPILATION_ERROR",
            SubmissionStatus::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

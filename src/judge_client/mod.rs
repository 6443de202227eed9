//! Judge client module - access to the external execution backend
//!
//! The backend compiles and runs a complete program against one stdin and
//! reports status, output and resource usage. Execution is queued on the
//! backend side: `dispatch` only hands the program over and returns a token,
//! `fetch` reads whatever the backend currently knows about that token.
//! Waiting for a terminal result is done by [`poll::wait_for_result`].
//!
//! The client does NOT:
//! - Compare outputs or assign verdicts
//! - Generate harness code
//! - Keep state between calls

#[cfg(test)]
pub mod fake;
pub mod judge0;
pub mod poll;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use judge0::{Judge0Client, Judge0Config};
pub use poll::{wait_for_result, PollPolicy};

/// Backend status codes
pub mod status_codes {
    pub const IN_QUEUE: i32 = 1;
    pub const PROCESSING: i32 = 2;
    pub const ACCEPTED: i32 = 3;
    pub const WRONG_ANSWER: i32 = 4;
    pub const TIME_LIMIT_EXCEEDED: i32 = 5;
    pub const COMPILATION_ERROR: i32 = 6;
    /// SIGSEGV
    pub const RUNTIME_ERROR_FIRST: i32 = 7;
    /// Other runtime error
    pub const RUNTIME_ERROR_LAST: i32 = 12;
    pub const INTERNAL_ERROR: i32 = 13;
}

/// Interpreted backend status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    /// SIGSEGV, SIGXFSZ, SIGFPE, SIGABRT, NZEC or other, keeps the raw code
    RuntimeError(i32),
    InternalError,
    Unknown(i32),
}

impl BackendStatus {
    pub fn from_id(id: i32) -> Self {
        use status_codes::*;
        match id {
            IN_QUEUE => BackendStatus::InQueue,
            PROCESSING => BackendStatus::Processing,
            ACCEPTED => BackendStatus::Accepted,
            WRONG_ANSWER => BackendStatus::WrongAnswer,
            TIME_LIMIT_EXCEEDED => BackendStatus::TimeLimitExceeded,
            COMPILATION_ERROR => BackendStatus::CompilationError,
            RUNTIME_ERROR_FIRST..=RUNTIME_ERROR_LAST => BackendStatus::RuntimeError(id),
            INTERNAL_ERROR => BackendStatus::InternalError,
            other => BackendStatus::Unknown(other),
        }
    }

    /// Whether the backend is done with the run
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BackendStatus::InQueue | BackendStatus::Processing)
    }
}

/// Outcome of a single run on the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub status_id: i32,
    pub status_description: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    /// Execution time in seconds
    pub time: Option<f64>,
    /// Peak memory in KB
    pub memory: Option<u64>,
}

impl JudgeResult {
    pub fn status(&self) -> BackendStatus {
        BackendStatus::from_id(self.status_id)
    }
}

/// Errors raised while talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum JudgeClientError {
    #[error("Judge rejected submission: {0}")]
    SubmissionRejected(String),

    #[error("Judge result unavailable: {0}")]
    ResultUnavailable(String),

    #[error("Judge unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Judge did not finish within {}s", .0.as_secs_f32())]
    PollTimeout(Duration),
}

/// Execution backend seen by the judger
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Hand a complete program and its stdin to the backend, returning a token
    async fn dispatch(
        &self,
        program: &str,
        language_id: u32,
        stdin: &str,
    ) -> Result<String, JudgeClientError>;

    /// Read the current result for a token
    async fn fetch(&self, token: &str) -> Result<JudgeResult, JudgeClientError>;
}

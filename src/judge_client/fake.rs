//! Scripted in-process backend for tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{status_codes, JudgeClient, JudgeClientError, JudgeResult};

/// Build a result with the stock description for `status_id`
pub fn judge_result(status_id: i32, stdout: Option<&str>) -> JudgeResult {
    let description = match status_id {
        status_codes::IN_QUEUE => "In Queue",
        status_codes::PROCESSING => "Processing",
        status_codes::ACCEPTED => "Accepted",
        status_codes::WRONG_ANSWER => "Wrong Answer",
        status_codes::TIME_LIMIT_EXCEEDED => "Time Limit Exceeded",
        status_codes::COMPILATION_ERROR => "Compilation Error",
        status_codes::RUNTIME_ERROR_FIRST..=status_codes::RUNTIME_ERROR_LAST => {
            "Runtime Error (NZEC)"
        }
        status_codes::INTERNAL_ERROR => "Internal Error",
        _ => "Exec Format Error",
    };

    JudgeResult {
        status_id,
        status_description: description.to_string(),
        stdout: stdout.map(str::to_string),
        ..Default::default()
    }
}

/// Accepted run printing `stdout` with the given usage
pub fn accepted_with_usage(stdout: &str, time: f64, memory: u64) -> JudgeResult {
    JudgeResult {
        time: Some(time),
        memory: Some(memory),
        ..judge_result(status_codes::ACCEPTED, Some(stdout))
    }
}

enum Script {
    /// Fetch results in order, the last one repeats
    Results(VecDeque<JudgeResult>),
    RejectDispatch,
    FailFetch,
}

/// Program handed to the fake backend
#[derive(Debug, Clone)]
pub struct DispatchedRun {
    pub program: String,
    pub language_id: u32,
    pub stdin: String,
}

#[derive(Default)]
struct State {
    scripts: VecDeque<Script>,
    runs: HashMap<String, Script>,
    dispatched: Vec<DispatchedRun>,
    fetches: usize,
}

/// Each dispatch consumes the next queued script
#[derive(Default)]
pub struct ScriptedJudge {
    state: Mutex<State>,
}

impl ScriptedJudge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: JudgeResult) {
        self.push_sequence(vec![result]);
    }

    pub fn push_sequence(&self, results: Vec<JudgeResult>) {
        self.push(Script::Results(results.into()));
    }

    pub fn push_dispatch_error(&self) {
        self.push(Script::RejectDispatch);
    }

    pub fn push_fetch_error(&self) {
        self.push(Script::FailFetch);
    }

    fn push(&self, script: Script) {
        self.state.lock().unwrap().scripts.push_back(script);
    }

    pub fn dispatched(&self) -> Vec<DispatchedRun> {
        self.state.lock().unwrap().dispatched.clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.state.lock().unwrap().dispatched.len()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }
}

#[async_trait]
impl JudgeClient for ScriptedJudge {
    async fn dispatch(
        &self,
        program: &str,
        language_id: u32,
        stdin: &str,
    ) -> Result<String, JudgeClientError> {
        let mut state = self.state.lock().unwrap();
        state.dispatched.push(DispatchedRun {
            program: program.to_string(),
            language_id,
            stdin: stdin.to_string(),
        });

        match state.scripts.pop_front() {
            None => Err(JudgeClientError::SubmissionRejected("no scripted run left".into())),
            Some(Script::RejectDispatch) => Err(JudgeClientError::SubmissionRejected(
                "HTTP 503: scripted rejection".into(),
            )),
            Some(script) => {
                let token = format!("token-{}", state.dispatched.len());
                state.runs.insert(token.clone(), script);
                Ok(token)
            }
        }
    }

    async fn fetch(&self, token: &str) -> Result<JudgeResult, JudgeClientError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;

        match state.runs.get_mut(token) {
            Some(Script::Results(results)) => {
                let result = if results.len() > 1 {
                    results.pop_front()
                } else {
                    results.front().cloned()
                };
                result.ok_or_else(|| JudgeClientError::ResultUnavailable("empty script".into()))
            }
            Some(Script::FailFetch) => Err(JudgeClientError::ResultUnavailable(
                "scripted fetch failure".into(),
            )),
            _ => Err(JudgeClientError::ResultUnavailable(format!("unknown token {}", token))),
        }
    }
}

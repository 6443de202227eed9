//! Judger module - evaluation of submissions against a problem
//!
//! A submission is wrapped once into a runnable program, then executed on
//! the judge backend for every test case in problem order. Each run is
//! checked for resource usage first and then by backend status. Terminal
//! classifications (compilation, runtime, resource limits, backend wrong
//! answer, internal error) stop the loop; a local output mismatch does not.
//!
//! The case loop runs on its own task. If it dies, the submission is
//! finalized as `INTERNAL_ERROR` with whatever was logged up to that point.

mod examples;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::core::{Problem, Submission, SubmissionRequest, SubmissionStatus, TestCase};
use crate::harness::{self, ProblemKind};
use crate::judge_client::{
    wait_for_result, BackendStatus, JudgeClient, JudgeClientError, JudgeResult, PollPolicy,
};
use crate::languages;
use crate::stats::StatisticsUpdater;

pub use examples::ExampleRunReport;

/// Time limit used when the constraints carry no hint, in seconds
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 2.0;

/// Constraint markers and the time limit they imply, first match wins
const TIME_LIMIT_MARKERS: &[(&[&str], f64)] = &[
    (&["1 second", "1s"], 1.0),
    (&["2 second", "2s"], 2.0),
    (&["3 second", "3s"], 3.0),
    (&["5 second", "5s"], 5.0),
    (&["10^6", "1000000"], 3.0),
    (&["10^5", "100000"], 2.0),
    (&["10^4", "10000"], 1.0),
];

/// Errors that prevent an evaluation from starting
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Problem {0} has no test cases")]
    ProblemNotFound(String),

    #[error("No example test cases found for problem {0}")]
    NoExamples(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Resolve the time limit in seconds from a problem's constraints
pub fn resolve_time_limit(constraints: &[String]) -> f64 {
    let text = constraints.join("\n").to_lowercase();

    TIME_LIMIT_MARKERS
        .iter()
        .find(|(markers, _)| markers.iter().any(|marker| text.contains(marker)))
        .map(|(_, limit)| *limit)
        .unwrap_or(DEFAULT_TIME_LIMIT_SECS)
}

/// Backend language id for a request: the explicit id, else the registry default
pub fn resolve_language_id(request: &SubmissionRequest) -> Result<u32, EvaluationError> {
    request
        .language_id
        .or_else(|| languages::get_language_config(&request.language).map(|c| c.language_id))
        .ok_or_else(|| EvaluationError::UnsupportedLanguage(request.language.clone()))
}

/// Wrap user source for the problem's family. Languages without a harness are
/// sent as written.
pub fn build_program(source: &str, language: &str, problem: &Problem) -> String {
    let kind = ProblemKind::resolve(problem.problem_type.as_deref(), &problem.title);

    match languages::get_language_config(language) {
        Some(config) => harness::wrap(source, config.language, kind),
        None => {
            warn!(
                "No harness for language {}, sending source unchanged",
                language
            );
            source.to_string()
        }
    }
}

/// Drives evaluations against the judge backend
pub struct Judger {
    client: Arc<dyn JudgeClient>,
    stats: StatisticsUpdater,
    poll: PollPolicy,
    memory_limit_kb: u64,
}

impl Judger {
    pub fn new(
        client: Arc<dyn JudgeClient>,
        stats: StatisticsUpdater,
        poll: PollPolicy,
        memory_limit_kb: u64,
    ) -> Self {
        Self {
            client,
            stats,
            poll,
            memory_limit_kb,
        }
    }

    /// Evaluate a submission against every test case of `problem`.
    ///
    /// The submission is finalized in place: status, transcript, error log,
    /// peak usage and passed count. Statistics are recorded exactly once.
    pub async fn evaluate(
        &self,
        submission: &mut Submission,
        problem: &Problem,
    ) -> Result<(), EvaluationError> {
        if problem.test_cases.is_empty() {
            return Err(EvaluationError::ProblemNotFound(problem.id.clone()));
        }

        let total = problem.test_cases.len();
        submission.total_test_cases = total;

        let time_limit = resolve_time_limit(&problem.constraints);
        let program = build_program(&submission.source_code, &submission.language, problem);

        info!(
            "Evaluating submission {}: problem={}, language={}, cases={}, time_limit={:.1}s",
            submission.id, problem.id, submission.language, total, time_limit
        );

        let progress = Arc::new(Mutex::new(Progress::default()));
        let run = CaseRun {
            client: self.client.clone(),
            poll: self.poll.clone(),
            program,
            language_id: submission.language_id,
            test_cases: problem.test_cases.clone(),
            limits: Limits {
                time_secs: time_limit,
                memory_kb: self.memory_limit_kb,
            },
            progress: progress.clone(),
        };

        let outcome = tokio::spawn(run.execute()).await;
        let progress = std::mem::take(&mut *lock(&progress));

        submission.status = progress.status;
        submission.output = progress.output;
        submission.error = progress.error;
        submission.execution_time = progress.max_time;
        submission.memory_usage = progress.max_memory;
        submission.test_cases_passed = progress.passed;

        match outcome {
            Ok(()) => {
                if submission.status.is_pending() {
                    submission.status = if progress.passed == total {
                        SubmissionStatus::Accepted
                    } else {
                        SubmissionStatus::WrongAnswer
                    };
                }
            }
            Err(e) => {
                warn!("Evaluation of submission {} aborted: {}", submission.id, e);
                submission.status = SubmissionStatus::InternalError;
                submission
                    .error
                    .push_str(&format!("System error during execution: {}", e));
            }
        }

        let solved = submission.status == SubmissionStatus::Accepted;
        self.stats
            .record(&submission.user_id, &submission.problem_id, solved)
            .await;

        info!(
            "Submission {} finished: status={}, passed={}/{}, max_time={:.3}s, max_memory={}KB",
            submission.id,
            submission.status,
            submission.test_cases_passed,
            total,
            submission.execution_time,
            submission.memory_usage
        );

        Ok(())
    }
}

/// Run one program on the backend and wait for its terminal result
async fn run_once(
    client: &dyn JudgeClient,
    poll: &PollPolicy,
    program: &str,
    language_id: u32,
    stdin: &str,
) -> Result<JudgeResult, JudgeClientError> {
    let token = client.dispatch(program, language_id, stdin).await?;
    wait_for_result(client, &token, poll).await
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    time_secs: f64,
    memory_kb: u64,
}

/// State accumulated by the case loop
#[derive(Debug, Default)]
struct Progress {
    status: SubmissionStatus,
    output: String,
    error: String,
    passed: usize,
    max_time: f64,
    max_memory: u64,
}

impl Progress {
    fn track_usage(&mut self, result: &JudgeResult) {
        if let Some(time) = result.time {
            self.max_time = self.max_time.max(time);
        }
        if let Some(memory) = result.memory {
            self.max_memory = self.max_memory.max(memory);
        }
    }

    /// Fold one terminal backend result into the progress
    fn grade(&mut self, case: &TestCase, result: &JudgeResult, limits: Limits) {
        self.track_usage(result);

        if let Some(time) = result.time.filter(|t| *t > limits.time_secs) {
            self.status = SubmissionStatus::TimeLimitExceeded;
            self.output.push_str("❌ Time Limit Exceeded\n");
            self.output.push_str(&format!(
                "Execution Time: {:.3}s (Limit: {:.1}s)\n\n",
                time, limits.time_secs
            ));
            self.error
                .push_str("Time Limit Exceeded: Your code took too long to execute.\n");
            self.error
                .push_str("Consider optimizing your algorithm for better time complexity.\n");
            return;
        }

        if let Some(memory) = result.memory.filter(|m| *m > limits.memory_kb) {
            self.status = SubmissionStatus::MemoryLimitExceeded;
            self.output.push_str("❌ Memory Limit Exceeded\n");
            self.output.push_str(&format!(
                "Memory Usage: {} KB (Limit: {} KB)\n\n",
                memory, limits.memory_kb
            ));
            self.error
                .push_str("Memory Limit Exceeded: Your code used too much memory.\n");
            return;
        }

        match result.status() {
            BackendStatus::Accepted => {
                let expected = case.expected_output.trim();
                let actual = result.stdout.as_deref().unwrap_or_default().trim();

                if actual == expected {
                    self.passed += 1;
                    self.output.push_str("✅ Passed\n");
                    self.output.push_str(&format!("Expected: {}\n", expected));
                    self.output.push_str(&format!("Got: {}\n", actual));
                    if let Some(time) = result.time {
                        self.output.push_str(&format!("Time: {:.3}s\n", time));
                    }
                } else {
                    // Recorded, but the loop keeps going
                    self.output.push_str("❌ Wrong Answer\n");
                    self.output.push_str(&format!("Expected: {}\n", expected));
                    self.output.push_str(&format!("Got: {}\n", actual));
                }
            }
            BackendStatus::WrongAnswer => {
                self.status = SubmissionStatus::WrongAnswer;
                self.output.push_str("❌ Wrong Answer\n");
                self.output
                    .push_str(&format!("Expected: {}\n", case.expected_output));
                self.output.push_str(&format!(
                    "Got: {}\n",
                    result.stdout.as_deref().unwrap_or("null")
                ));
            }
            BackendStatus::TimeLimitExceeded => {
                self.status = SubmissionStatus::TimeLimitExceeded;
                self.output.push_str("❌ Time Limit Exceeded\n");
                self.error
                    .push_str("Time Limit Exceeded: Your algorithm is too slow.\n");
            }
            BackendStatus::CompilationError => {
                self.status = SubmissionStatus::CompilationError;
                self.output.push_str("❌ Compilation Error\n");
                self.append_error(
                    "Compilation Error",
                    result.compile_output.as_deref(),
                    "Unknown compilation error",
                );
            }
            BackendStatus::RuntimeError(_) => {
                self.status = SubmissionStatus::RuntimeError;
                self.output.push_str("❌ Runtime Error\n");
                self.append_error(
                    "Runtime Error",
                    result.stderr.as_deref(),
                    "Unknown runtime error",
                );
            }
            BackendStatus::InternalError => {
                self.status = SubmissionStatus::InternalError;
                self.output.push_str("❌ Internal Error\n");
                self.error
                    .push_str("Internal Error: Please try again later.\n");
            }
            BackendStatus::InQueue | BackendStatus::Processing | BackendStatus::Unknown(_) => {
                self.output.push_str("❌ Unknown Error\n");
                self.output
                    .push_str(&format!("Status: {}\n", result.status_description));
                self.error
                    .push_str(&format!("Unknown Error: {}\n", result.status_description));
            }
        }

        self.output.push('\n');
    }

    /// A case that never produced a backend result
    fn record_execution_error(&mut self, error: &JudgeClientError) {
        self.output.push_str("❌ Execution Error\n");
        self.output.push_str(&format!("Error: {}\n\n", error));
        self.error
            .push_str(&format!("Execution Error: {}\n", error));
    }

    fn append_error(&mut self, label: &str, detail: Option<&str>, fallback: &str) {
        let detail = detail.filter(|d| !d.trim().is_empty()).unwrap_or(fallback);
        self.error.push_str(&format!("{}:\n{}", label, detail));
        if !detail.ends_with('\n') {
            self.error.push('\n');
        }
    }
}

fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owned inputs of one evaluation's case loop
struct CaseRun {
    client: Arc<dyn JudgeClient>,
    poll: PollPolicy,
    program: String,
    language_id: u32,
    test_cases: Vec<TestCase>,
    limits: Limits,
    progress: Arc<Mutex<Progress>>,
}

impl CaseRun {
    async fn execute(self) {
        lock(&self.progress)
            .output
            .push_str("=== Test Case Results ===\n");

        for (index, case) in self.test_cases.iter().enumerate() {
            let number = index + 1;
            lock(&self.progress)
                .output
                .push_str(&format!("Test Case {}:\n", number));

            let run = run_once(
                self.client.as_ref(),
                &self.poll,
                &self.program,
                self.language_id,
                &case.input,
            )
            .await;

            let stop = {
                let mut progress = lock(&self.progress);
                match run {
                    Ok(result) => {
                        debug!(
                            "Test case {}: status={} time={:?} memory={:?}",
                            number, result.status_description, result.time, result.memory
                        );
                        progress.grade(case, &result, self.limits);
                    }
                    Err(e) => {
                        warn!("Test case {} could not be executed: {}", number, e);
                        progress.record_execution_error(&e);
                    }
                }
                progress.status.is_fail_fast()
            };

            if stop {
                debug!("Stopping after test case {}", number);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SubmissionRequest;
    use crate::judge_client::fake::{accepted_with_usage, judge_result, ScriptedJudge};
    use crate::judge_client::status_codes;
    use crate::stats::MemoryStatsStore;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn fast_poll() -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            timeout: Duration::from_secs(1),
        }
    }

    fn judger_with(
        client: Arc<dyn JudgeClient>,
        store: Arc<MemoryStatsStore>,
    ) -> Judger {
        let _ = languages::init_languages();
        Judger::new(client, StatisticsUpdater::new(store), fast_poll(), 256_000)
    }

    fn problem(cases: &[(&str, &str)], constraints: &[&str]) -> Problem {
        Problem {
            id: "p1".into(),
            title: "Two Sum".into(),
            constraints: constraints.iter().map(|c| c.to_string()).collect(),
            test_cases: cases
                .iter()
                .map(|(input, expected)| TestCase {
                    input: input.to_string(),
                    expected_output: expected.to_string(),
                    is_hidden: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn new_submission() -> Submission {
        let request = SubmissionRequest {
            problem_id: "p1".into(),
            source_code: "class Solution { public int[] twoSum(int[] n, int t) { return n; } }"
                .into(),
            language: "java".into(),
            language_id: Some(62),
        };
        Submission::new("s1", "u1", &request, 62)
    }

    fn three_cases() -> Problem {
        problem(
            &[
                ("[2,7,11,15]\n9", "[0,1]"),
                ("[3,2,4]\n6", "[1,2]"),
                ("[3,3]\n6", "[0,1]"),
            ],
            &[],
        )
    }

    #[test]
    fn test_time_limit_table() {
        let limit = |c: &str| resolve_time_limit(&[c.to_string()]);

        assert_eq!(limit("Time limit: 1 second"), 1.0);
        assert_eq!(limit("runs in 5s"), 5.0);
        assert_eq!(limit("1 <= nums.length <= 10^6"), 3.0);
        assert_eq!(limit("n <= 100000"), 2.0);
        assert_eq!(limit("n <= 10^4"), 1.0);
        assert_eq!(limit("no hint here"), DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(resolve_time_limit(&[]), DEFAULT_TIME_LIMIT_SECS);
    }

    #[test]
    fn test_time_limit_markers_are_case_insensitive() {
        assert_eq!(resolve_time_limit(&["Limit: 3 SECONDS".into()]), 3.0);
    }

    #[test]
    fn test_language_id_resolution() {
        let _ = languages::init_languages();
        let mut request = submission_request("python", None);
        assert_eq!(resolve_language_id(&request).unwrap(), 71);

        request.language_id = Some(92);
        assert_eq!(resolve_language_id(&request).unwrap(), 92);

        let request = submission_request("brainfuck", None);
        assert!(matches!(
            resolve_language_id(&request),
            Err(EvaluationError::UnsupportedLanguage(_))
        ));
    }

    fn submission_request(language: &str, language_id: Option<u32>) -> SubmissionRequest {
        SubmissionRequest {
            problem_id: "p1".into(),
            source_code: "print(1)".into(),
            language: language.into(),
            language_id,
        }
    }

    #[test]
    fn test_unknown_language_is_sent_verbatim() {
        let _ = languages::init_languages();
        let program = build_program("main = print 1", "haskell", &three_cases());
        assert_eq!(program, "main = print 1");
    }

    #[tokio::test]
    async fn test_all_cases_pass_is_accepted() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(accepted_with_usage("[0,1]\n", 0.10, 1200));
        judge.push_result(accepted_with_usage("[1,2]", 0.30, 2400));
        judge.push_result(accepted_with_usage("  [0,1]  ", 0.20, 1800));
        let store = Arc::new(MemoryStatsStore::new());
        let judger = judger_with(judge.clone(), store.clone());

        let mut submission = new_submission();
        assert_ok!(judger.evaluate(&mut submission, &three_cases()).await);

        assert_eq!(submission.status, SubmissionStatus::Accepted);
        assert_eq!(submission.test_cases_passed, 3);
        assert_eq!(submission.total_test_cases, 3);
        assert_eq!(submission.execution_time, 0.30);
        assert_eq!(submission.memory_usage, 2400);
        assert!(submission.output.starts_with("=== Test Case Results ===\n"));
        assert_eq!(submission.output.matches("✅ Passed").count(), 3);

        let user = store.user_tally("u1").await;
        assert_eq!((user.total_submissions, user.total_solved), (1, 1));
    }

    #[tokio::test]
    async fn test_generated_program_reaches_backend() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        let problem = problem(&[("[2,7,11,15]\n9", "[0,1]")], &[]);
        judger.evaluate(&mut submission, &problem).await.unwrap();

        let runs = judge.dispatched();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].language_id, 62);
        assert_eq!(runs[0].stdin, "[2,7,11,15]\n9");
        assert!(runs[0].program.contains("public class Main"));
        assert!(runs[0].program.contains(&submission.source_code));
    }

    #[tokio::test]
    async fn test_time_over_resolved_limit_stops_evaluation() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(accepted_with_usage("[0,1]", 3.5, 1000));
        judge.push_result(accepted_with_usage("[1,2]", 0.1, 1000));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut problem = three_cases();
        problem.constraints = vec!["1 <= nums.length <= 10^6".into()];
        let mut submission = new_submission();
        judger.evaluate(&mut submission, &problem).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::TimeLimitExceeded);
        assert_eq!(submission.test_cases_passed, 0);
        assert_eq!(judge.dispatch_count(), 1);
        assert!(submission.output.contains("Execution Time: 3.500s (Limit: 3.0s)"));
        assert_eq!(submission.execution_time, 3.5);
    }

    #[tokio::test]
    async fn test_resource_checks_precede_status() {
        let judge = Arc::new(ScriptedJudge::new());
        // The output is correct, the memory is not
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 300_000));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::MemoryLimitExceeded);
        assert_eq!(submission.test_cases_passed, 0);
        assert_eq!(judge.dispatch_count(), 1);
        assert!(submission.output.contains("Memory Usage: 300000 KB (Limit: 256000 KB)"));
    }

    #[tokio::test]
    async fn test_compilation_error_after_first_pass() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let mut compile_failure = judge_result(status_codes::COMPILATION_ERROR, None);
        compile_failure.compile_output = Some("Main.java:3: error: ';' expected".into());
        judge.push_result(compile_failure);
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::CompilationError);
        assert_eq!(submission.test_cases_passed, 1);
        assert_eq!(judge.dispatch_count(), 2);
        assert!(!submission.output.contains("Test Case 3:"));
        assert!(submission.error.contains("Compilation Error:\nMain.java:3"));
    }

    #[tokio::test]
    async fn test_backend_wrong_answer_stops_but_local_mismatch_continues() {
        // Local mismatch on case 1 keeps evaluating all cases
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(accepted_with_usage("[9,9]", 0.1, 100));
        judge.push_result(accepted_with_usage("[1,2]", 0.1, 100));
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::WrongAnswer);
        assert_eq!(submission.test_cases_passed, 2);
        assert_eq!(judge.dispatch_count(), 3);

        // Backend wrong answer on case 1 stops right there
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(judge_result(status_codes::WRONG_ANSWER, Some("[9,9]")));
        judge.push_result(accepted_with_usage("[1,2]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::WrongAnswer);
        assert_eq!(submission.test_cases_passed, 0);
        assert_eq!(judge.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_runtime_error_is_terminal() {
        let judge = Arc::new(ScriptedJudge::new());
        let mut crash = judge_result(11, None);
        crash.stderr = Some("Exception in thread \"main\" java.lang.NullPointerException".into());
        judge.push_result(crash);
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::RuntimeError);
        assert_eq!(judge.dispatch_count(), 1);
        assert!(submission.error.contains("NullPointerException"));
    }

    #[tokio::test]
    async fn test_backend_time_limit_is_terminal() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(judge_result(status_codes::TIME_LIMIT_EXCEEDED, None));
        judge.push_result(accepted_with_usage("[1,2]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::TimeLimitExceeded);
        assert_eq!(submission.test_cases_passed, 0);
        assert_eq!(judge.dispatch_count(), 1);
        assert!(submission.output.contains("❌ Time Limit Exceeded"));
        assert!(submission
            .error
            .contains("Time Limit Exceeded: Your algorithm is too slow."));
    }

    #[tokio::test]
    async fn test_execution_error_does_not_abort() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_dispatch_error();
        judge.push_fetch_error();
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::WrongAnswer);
        assert_eq!(submission.test_cases_passed, 1);
        assert_eq!(judge.dispatch_count(), 3);
        assert_eq!(submission.output.matches("❌ Execution Error").count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_status_fails_case_without_stopping() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(judge_result(14, None));
        judge.push_result(accepted_with_usage("[1,2]", 0.1, 100));
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::WrongAnswer);
        assert_eq!(submission.test_cases_passed, 2);
        assert!(submission.output.contains("Status: Exec Format Error"));
    }

    #[tokio::test]
    async fn test_stuck_backend_is_recorded_as_execution_error() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(judge_result(status_codes::PROCESSING, None));
        judge.push_result(accepted_with_usage("[1,2]", 0.1, 100));
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::WrongAnswer);
        assert!(submission.error.contains("did not finish"));
        assert_eq!(submission.test_cases_passed, 2);
    }

    #[tokio::test]
    async fn test_no_test_cases_is_rejected() {
        let judge = Arc::new(ScriptedJudge::new());
        let store = Arc::new(MemoryStatsStore::new());
        let judger = judger_with(judge.clone(), store.clone());

        let mut submission = new_submission();
        let result = judger.evaluate(&mut submission, &problem(&[], &[])).await;

        assert!(matches!(result, Err(EvaluationError::ProblemNotFound(_))));
        assert!(submission.status.is_pending());
        assert_eq!(judge.dispatch_count(), 0);
        assert_eq!(store.user_tally("u1").await.total_submissions, 0);
    }

    struct PanickingJudge;

    #[async_trait]
    impl JudgeClient for PanickingJudge {
        async fn dispatch(&self, _: &str, _: u32, _: &str) -> Result<String, JudgeClientError> {
            panic!("backend client crashed");
        }

        async fn fetch(&self, _: &str) -> Result<JudgeResult, JudgeClientError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_internal_error() {
        let store = Arc::new(MemoryStatsStore::new());
        let judger = judger_with(Arc::new(PanickingJudge), store.clone());

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::InternalError);
        assert!(submission.error.contains("System error during execution"));
        assert!(submission.output.contains("Test Case 1:"));

        let user = store.user_tally("u1").await;
        assert_eq!((user.total_submissions, user.total_solved), (1, 0));
    }

    #[tokio::test]
    async fn test_resubmitting_a_solved_problem() {
        let judge = Arc::new(ScriptedJudge::new());
        for _ in 0..2 {
            judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        }
        let store = Arc::new(MemoryStatsStore::new());
        let judger = judger_with(judge.clone(), store.clone());
        let problem = problem(&[("[2,7,11,15]\n9", "[0,1]")], &[]);

        for _ in 0..2 {
            let mut submission = new_submission();
            judger.evaluate(&mut submission, &problem).await.unwrap();
            assert_eq!(submission.status, SubmissionStatus::Accepted);
        }

        let user = store.user_tally("u1").await;
        assert_eq!(user.total_submissions, 2);
        assert_eq!(user.total_solved, 1);
        assert_eq!(store.problem_tally("p1").await.total_solved, 2);
    }

    #[tokio::test]
    async fn test_passed_never_exceeds_total() {
        let judge = Arc::new(ScriptedJudge::new());
        judge.push_result(accepted_with_usage("[0,1]", 0.1, 100));
        judge.push_result(judge_result(status_codes::INTERNAL_ERROR, None));
        let judger = judger_with(judge.clone(), Arc::new(MemoryStatsStore::new()));

        let mut submission = new_submission();
        judger.evaluate(&mut submission, &three_cases()).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::InternalError);
        assert!(submission.test_cases_passed <= submission.total_test_cases);
        assert_eq!(submission.test_cases_passed, 1);
    }
}

//! Sample run against a problem's examples
//!
//! Nothing is persisted and no statistics are recorded. Example inputs are
//! prose, so each one goes through [`example_to_stdin`] first. Resource usage
//! is reported but not enforced, and only a compilation error ends the run
//! early.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{build_program, resolve_language_id, run_once, EvaluationError, Judger};
use crate::core::{Example, Problem, SubmissionRequest};
use crate::harness::example_to_stdin;
use crate::judge_client::{BackendStatus, JudgeResult};

/// Overall outcome of a sample run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExampleRunStatus {
    Success,
    CompilationError,
    RuntimeError,
    TimeLimitExceeded,
    WrongAnswer,
}

/// Report returned to the caller of a sample run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRunReport {
    /// False when the run could not be carried out at all
    pub success: bool,
    pub all_examples_passed: bool,
    pub examples_passed: usize,
    pub total_examples: usize,
    pub output: String,
    pub error: String,
    pub execution_time: f64,
    pub memory_usage: u64,
    pub language: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExampleRunStatus>,
}

impl ExampleRunReport {
    /// Report for a run that never started
    pub fn failure(language: &str, error: &EvaluationError) -> Self {
        Self {
            success: false,
            all_examples_passed: false,
            examples_passed: 0,
            total_examples: 0,
            output: String::new(),
            error: format!("Failed to run code: {}", error),
            execution_time: 0.0,
            memory_usage: 0,
            language: language.to_string(),
            message: "❌ Failed to run code. Please try again.".into(),
            status: None,
        }
    }
}

/// Pick the run status from the error log, most severe first
fn classify(all_passed: bool, error_log: &str, passed: usize, total: usize) -> (ExampleRunStatus, String) {
    if all_passed {
        (
            ExampleRunStatus::Success,
            "✅ All example test cases passed! You can now submit your solution.".into(),
        )
    } else if error_log.contains("Compilation Error") {
        (
            ExampleRunStatus::CompilationError,
            "🔧 Compilation Error. Please fix syntax errors before running.".into(),
        )
    } else if error_log.contains("Runtime Error") {
        (
            ExampleRunStatus::RuntimeError,
            "💥 Runtime Error. Check your code for potential issues.".into(),
        )
    } else if error_log.contains("Time Limit Exceeded") {
        (
            ExampleRunStatus::TimeLimitExceeded,
            "⏰ Time Limit Exceeded. Consider optimizing your algorithm.".into(),
        )
    } else {
        (
            ExampleRunStatus::WrongAnswer,
            format!(
                "❌ {}/{} example test cases passed. Check your logic.",
                passed, total
            ),
        )
    }
}

#[derive(Default)]
struct SampleLog {
    output: String,
    error: String,
    passed: usize,
    all_passed: bool,
    compile_failed: bool,
    max_time: f64,
    max_memory: u64,
}

impl SampleLog {
    fn grade(&mut self, example: &Example, result: &JudgeResult) {
        if let Some(time) = result.time {
            self.max_time = self.max_time.max(time);
        }
        if let Some(memory) = result.memory {
            self.max_memory = self.max_memory.max(memory);
        }

        match result.status() {
            BackendStatus::Accepted => {
                let actual = result.stdout.as_deref().unwrap_or_default().trim();

                if actual == example.output.trim() {
                    self.passed += 1;
                    self.output.push_str("✅ Passed\n");
                    self.output.push_str(&format!("Your Output: {}\n", actual));
                    if let Some(time) = result.time {
                        self.output.push_str(&format!("Runtime: {:.3}s\n", time));
                    }
                    if let Some(memory) = result.memory {
                        self.output.push_str(&format!("Memory: {} KB\n", memory));
                    }
                } else {
                    self.all_passed = false;
                    self.output.push_str("❌ Failed\n");
                    self.output.push_str(&format!("Your Output: {}\n", actual));
                    self.output
                        .push_str("Output doesn't match expected result.\n");
                }
            }
            BackendStatus::CompilationError => {
                self.all_passed = false;
                self.compile_failed = true;
                self.output.push_str("❌ Compilation Error\n");
                let detail = result
                    .compile_output
                    .as_deref()
                    .unwrap_or("Unknown compilation error");
                self.error
                    .push_str(&format!("Compilation Error:\n{}\n", detail.trim_end()));
            }
            BackendStatus::RuntimeError(_) => {
                self.all_passed = false;
                self.output.push_str("❌ Runtime Error\n");
                let detail = result.stderr.as_deref().unwrap_or("Unknown runtime error");
                self.error
                    .push_str(&format!("Runtime Error:\n{}\n", detail.trim_end()));
            }
            BackendStatus::TimeLimitExceeded => {
                self.all_passed = false;
                self.output.push_str("❌ Time Limit Exceeded\n");
                self.error.push_str(
                    "Time Limit Exceeded: Your code is taking too long to execute.\n",
                );
            }
            _ => {
                self.all_passed = false;
                self.output.push_str("❌ Error\n");
                self.output
                    .push_str(&format!("Status: {}\n", result.status_description));
                self.error
                    .push_str(&format!("Execution Error: {}\n", result.status_description));
            }
        }
    }
}

impl Judger {
    /// Run a request against the problem's examples without persisting anything
    pub async fn run_against_examples(
        &self,
        user_id: &str,
        request: &SubmissionRequest,
        problem: &Problem,
    ) -> Result<ExampleRunReport, EvaluationError> {
        if problem.examples.is_empty() {
            return Err(EvaluationError::NoExamples(problem.id.clone()));
        }

        let language_id = resolve_language_id(request)?;
        let program = build_program(&request.source_code, &request.language, problem);
        let total = problem.examples.len();

        info!(
            "Running {} examples of problem {} for user {} ({})",
            total, problem.id, user_id, request.language
        );

        let mut log = SampleLog {
            all_passed: true,
            output: String::from("=== Running Example Test Cases ===\n\n"),
            ..Default::default()
        };

        for (index, example) in problem.examples.iter().enumerate() {
            log.output.push_str(&format!("Example {}:\n", index + 1));
            log.output.push_str(&format!("Input: {}\n", example.input));
            log.output
                .push_str(&format!("Expected Output: {}\n", example.output));

            let stdin = example_to_stdin(&example.input);
            match run_once(self.client.as_ref(), &self.poll, &program, language_id, &stdin).await {
                Ok(result) => log.grade(example, &result),
                Err(e) => {
                    warn!("Example {} could not be executed: {}", index + 1, e);
                    log.all_passed = false;
                    log.output.push_str("❌ Execution Error\n");
                    log.output.push_str(&format!("Error: {}\n", e));
                    log.error.push_str(&format!("Execution Error: {}\n", e));
                }
            }

            log.output.push('\n');

            if log.compile_failed {
                break;
            }
        }

        let (status, message) = classify(log.all_passed, &log.error, log.passed, total);
        info!(
            "Example run for user {} finished: {:?} ({}/{})",
            user_id, status, log.passed, total
        );

        Ok(ExampleRunReport {
            success: true,
            all_examples_passed: log.all_passed,
            examples_passed: log.passed,
            total_examples: total,
            output: log.output,
            error: log.error,
            execution_time: log.max_time,
            memory_usage: log.max_memory,
            language: request.language.clone(),
            message,
            status: Some(status),
        })
    }
}

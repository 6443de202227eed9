//! Worker jobs
//!
//! Jobs arrive as JSON tagged by `job_type`. A submit job is judged against
//! the problem's test cases and its snapshot is stored twice: once as
//! `PENDING` before evaluation and once finalized. A run-examples job only
//! produces a report for the waiting caller.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{Problem, Submission, SubmissionRequest, SubmissionStatus};
use crate::judger::{resolve_language_id, ExampleRunReport, Judger};

/// Worker job enum - represents different types of jobs the worker can process
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum WorkerJob {
    /// Judge a submission against the problem's test cases
    #[serde(rename = "submit")]
    Submit(SubmitJob),
    /// Try a submission against the problem's examples
    #[serde(rename = "run_examples")]
    RunExamples(RunExamplesJob),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJob {
    pub submission_id: String,
    pub user_id: String,
    pub request: SubmissionRequest,
    pub problem: Problem,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunExamplesJob {
    /// List the caller is blocking on
    pub result_key: String,
    pub user_id: String,
    pub request: SubmissionRequest,
    pub problem: Problem,
}

/// Destination of job results
#[async_trait]
pub trait ResultSink: Send {
    async fn store_submission(&mut self, submission: &Submission) -> Result<()>;

    async fn store_example_report(&mut self, key: &str, report: &ExampleRunReport) -> Result<()>;
}

/// Process one job and hand its result to `sink`
pub async fn process_job(judger: &Judger, sink: &mut dyn ResultSink, job: WorkerJob) -> Result<()> {
    match job {
        WorkerJob::Submit(job) => {
            info!(
                "Received submit job: submission_id={}, problem={}, language={}",
                job.submission_id, job.problem.id, job.request.language
            );
            let submission = process_submit(judger, sink, &job).await?;
            info!(
                "Submit job completed: submission_id={}, status={}",
                submission.id, submission.status
            );
        }
        WorkerJob::RunExamples(job) => {
            info!(
                "Received run_examples job: user={}, problem={}, language={}",
                job.user_id, job.problem.id, job.request.language
            );
            let report = process_run_examples(judger, sink, &job).await?;
            info!(
                "Run examples job completed: problem={}, passed={}/{}",
                job.problem.id, report.examples_passed, report.total_examples
            );
        }
    }

    Ok(())
}

/// Judge a submission. A submission that cannot be evaluated at all is stored
/// as `INTERNAL_ERROR` with the reason in its error log.
pub async fn process_submit(
    judger: &Judger,
    sink: &mut dyn ResultSink,
    job: &SubmitJob,
) -> Result<Submission> {
    let mut submission = Submission::new(
        job.submission_id.clone(),
        job.user_id.clone(),
        &job.request,
        0,
    );

    let evaluated = match resolve_language_id(&job.request) {
        Ok(language_id) => {
            submission.language_id = language_id;
            submission.total_test_cases = job.problem.test_cases.len();
            sink.store_submission(&submission).await?;
            judger.evaluate(&mut submission, &job.problem).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = evaluated {
        warn!("Submission {} was not evaluated: {}", submission.id, e);
        submission.status = SubmissionStatus::InternalError;
        submission.error = e.to_string();
    }

    sink.store_submission(&submission).await?;
    Ok(submission)
}

pub async fn process_run_examples(
    judger: &Judger,
    sink: &mut dyn ResultSink,
    job: &RunExamplesJob,
) -> Result<ExampleRunReport> {
    let report = match judger
        .run_against_examples(&job.user_id, &job.request, &job.problem)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            warn!("Example run for problem {} failed: {}", job.problem.id, e);
            ExampleRunReport::failure(&job.request.language, &e)
        }
    };

    sink.store_example_report(&job.result_key, &report).await?;
    Ok(report)
}

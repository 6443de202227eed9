//! Redis Manager - Centralized Redis connection and operations
//!
//! This module handles all Redis-related operations including:
//! - Job queue operations (BLPOP)
//! - Submission snapshot storage and publishing
//! - Example run reports for blocking callers
//! - Atomic user and problem statistics

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::completion::SubmissionSource;
use crate::core::Submission;
use crate::jobs::{ResultSink, WorkerJob};
use crate::judger::ExampleRunReport;
use crate::stats::{StatsStore, Tally};

/// Redis key constants
pub mod keys {
    /// Job queue key
    pub const JOB_QUEUE: &str = "judge:queue";

    /// Submission snapshot key prefix (for polling)
    pub const SUBMISSION_PREFIX: &str = "submission:";

    /// Finalized submission channel (for pub/sub)
    pub const SUBMISSION_CHANNEL: &str = "submission:results";

    pub fn submission(id: &str) -> String {
        format!("{}{}", SUBMISSION_PREFIX, id)
    }

    pub fn user_stats(user_id: &str) -> String {
        format!("user:{}:stats", user_id)
    }

    pub fn user_solved(user_id: &str) -> String {
        format!("user:{}:solved", user_id)
    }

    pub fn problem_stats(problem_id: &str) -> String {
        format!("problem:{}:stats", problem_id)
    }

    pub const TOTAL_SUBMISSIONS: &str = "total_submissions";
    pub const TOTAL_SOLVED: &str = "total_solved";
}

const SUBMISSION_EXPIRY_SECS: u64 = 3600; // 1 hour
const EXAMPLE_REPORT_EXPIRY_SECS: i64 = 300; // 5 minutes

/// Centralized Redis manager for all Redis operations
pub struct RedisManager {
    client: redis::Client,
    conn: MultiplexedConnection,
}

impl RedisManager {
    /// Connect to Redis, retrying until the server is reachable
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = get_connection_with_retry(&client).await?;
        info!("Connected to Redis at {}", redis_url);

        Ok(Self { client, conn })
    }

    /// Statistics store sharing this manager's connection
    pub fn stats_store(&self) -> RedisStatsStore {
        RedisStatsStore {
            conn: self.conn.clone(),
        }
    }

    /// Block and wait for the next job from the queue.
    ///
    /// Payloads that fail to parse are logged and skipped.
    /// Automatically reconnects on connection failure.
    pub async fn pop_job(&mut self) -> Result<WorkerJob> {
        loop {
            let result: Option<(String, String)> =
                match self.conn.blpop(keys::JOB_QUEUE, 0.0).await {
                    Ok(res) => res,
                    Err(e) => {
                        warn!("Redis BLPOP failed: {}. Reconnecting...", e);
                        self.reconnect().await?;
                        continue;
                    }
                };

            if let Some((_, job_data)) = result {
                match serde_json::from_str::<WorkerJob>(&job_data) {
                    Ok(job) => return Ok(job),
                    Err(e) => {
                        warn!("Failed to parse job data: {}. Data: {}", e, job_data);
                        continue;
                    }
                }
            }
        }
    }

    /// Store a submission snapshot for 1 hour. Finalized snapshots are also
    /// published for real-time subscribers.
    pub async fn store_submission(&mut self, submission: &Submission) -> Result<()> {
        let key = keys::submission(&submission.id);
        let json = serde_json::to_string(submission)?;

        if let Err(e) = self
            .conn
            .set_ex::<_, _, ()>(&key, &json, SUBMISSION_EXPIRY_SECS)
            .await
        {
            warn!("Failed to store submission: {}. Reconnecting...", e);
            self.reconnect().await?;
            self.conn
                .set_ex::<_, _, ()>(&key, &json, SUBMISSION_EXPIRY_SECS)
                .await?;
        }

        // Publish errors are ignored, there may be no subscribers
        if !submission.status.is_pending() {
            let _ = self
                .conn
                .publish::<_, _, ()>(keys::SUBMISSION_CHANNEL, &json)
                .await;
        }

        Ok(())
    }

    /// Push an example run report to the list the caller is blocking on
    pub async fn store_example_report(&mut self, key: &str, report: &ExampleRunReport) -> Result<()> {
        let json = serde_json::to_string(report)?;

        // RPUSH so the caller's BLPOP picks it up
        if let Err(e) = self.conn.rpush::<_, _, ()>(key, &json).await {
            warn!("Failed to push example report: {}. Reconnecting...", e);
            self.reconnect().await?;
            self.conn.rpush::<_, _, ()>(key, &json).await?;
        }

        // Don't let the list linger if the caller went away
        let _ = self
            .conn
            .expire::<_, ()>(key, EXAMPLE_REPORT_EXPIRY_SECS)
            .await;

        Ok(())
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.conn = get_connection_with_retry(&self.client).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultSink for RedisManager {
    async fn store_submission(&mut self, submission: &Submission) -> Result<()> {
        RedisManager::store_submission(self, submission).await
    }

    async fn store_example_report(&mut self, key: &str, report: &ExampleRunReport) -> Result<()> {
        RedisManager::store_example_report(self, key, report).await
    }
}

#[async_trait]
impl SubmissionSource for RedisManager {
    async fn load_submission(&self, id: &str) -> Result<Option<Submission>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn
            .get(keys::submission(id))
            .await
            .with_context(|| format!("Failed to load submission {}", id))?;

        json.map(|json| {
            serde_json::from_str(&json)
                .with_context(|| format!("Malformed snapshot for submission {}", id))
        })
        .transpose()
    }
}

/// Statistics kept in Redis hashes and sets.
///
/// Counters only ever move through HINCRBY, and the user's solved counter is
/// bumped only when SADD actually added the problem.
#[derive(Clone)]
pub struct RedisStatsStore {
    conn: MultiplexedConnection,
}

#[async_trait]
impl StatsStore for RedisStatsStore {
    async fn record_user_submission(
        &self,
        user_id: &str,
        problem_id: &str,
        solved: bool,
    ) -> Result<bool> {
        let mut conn = self.conn.clone();
        let stats_key = keys::user_stats(user_id);

        conn.hincr::<_, _, _, ()>(&stats_key, keys::TOTAL_SUBMISSIONS, 1)
            .await
            .context("Failed to count user submission")?;

        if !solved {
            return Ok(false);
        }

        let added: i64 = conn
            .sadd(keys::user_solved(user_id), problem_id)
            .await
            .context("Failed to update solved set")?;

        if added == 1 {
            conn.hincr::<_, _, _, ()>(&stats_key, keys::TOTAL_SOLVED, 1)
                .await
                .context("Failed to count solved problem")?;
        }

        Ok(added == 1)
    }

    async fn record_problem_submission(&self, problem_id: &str, solved: bool) -> Result<()> {
        let mut conn = self.conn.clone();
        let stats_key = keys::problem_stats(problem_id);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .hincr(&stats_key, keys::TOTAL_SUBMISSIONS, 1)
            .ignore();
        if solved {
            pipe.hincr(&stats_key, keys::TOTAL_SOLVED, 1).ignore();
        }

        pipe.query_async::<()>(&mut conn)
            .await
            .context("Failed to update problem stats")?;

        Ok(())
    }

    async fn load_user_tally(&self, user_id: &str) -> Result<Tally> {
        let mut conn = self.conn.clone();
        let (total_submissions, total_solved): (Option<u64>, Option<u64>) = redis::cmd("HMGET")
            .arg(keys::user_stats(user_id))
            .arg(keys::TOTAL_SUBMISSIONS)
            .arg(keys::TOTAL_SOLVED)
            .query_async(&mut conn)
            .await
            .context("Failed to load user stats")?;

        Ok(Tally {
            total_submissions: total_submissions.unwrap_or(0),
            total_solved: total_solved.unwrap_or(0),
        })
    }
}

/// Get a Redis connection with retry logic
async fn get_connection_with_retry(client: &redis::Client) -> Result<MultiplexedConnection> {
    loop {
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                warn!(
                    "Failed to connect to Redis: {}. Retrying in 3 seconds...",
                    e
                );
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}

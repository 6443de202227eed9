//! Solved-problem bookkeeping
//!
//! Every finished evaluation is recorded once. The user's solved set is
//! idempotent, the problem's solved counter is not deduplicated per user.
//! Stores must make the "add to solved set, then bump the solved counter"
//! step atomic so concurrent submissions cannot double count.

#[cfg(test)]
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(test)]
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Counters kept for users and problems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub total_submissions: u64,
    pub total_solved: u64,
}

/// Persistence boundary for statistics
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Count a submission for the user. Returns whether `problem_id` was newly
    /// added to the user's solved set.
    async fn record_user_submission(
        &self,
        user_id: &str,
        problem_id: &str,
        solved: bool,
    ) -> Result<bool>;

    async fn record_problem_submission(&self, problem_id: &str, solved: bool) -> Result<()>;

    /// Current counters of a user, zero when nothing was recorded yet
    async fn load_user_tally(&self, user_id: &str) -> Result<Tally>;
}

/// In-process store
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStatsStore {
    inner: Mutex<MemoryStats>,
}

#[cfg(test)]
#[derive(Default)]
struct MemoryStats {
    users: HashMap<String, Tally>,
    solved: HashMap<String, HashSet<String>>,
    problems: HashMap<String, Tally>,
}

#[cfg(test)]
impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_tally(&self, user_id: &str) -> Tally {
        self.inner.lock().await.users.get(user_id).copied().unwrap_or_default()
    }

    pub async fn problem_tally(&self, problem_id: &str) -> Tally {
        self.inner
            .lock()
            .await
            .problems
            .get(problem_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn solved_problems(&self, user_id: &str) -> HashSet<String> {
        self.inner
            .lock()
            .await
            .solved
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn record_user_submission(
        &self,
        user_id: &str,
        problem_id: &str,
        solved: bool,
    ) -> Result<bool> {
        let mut stats = self.inner.lock().await;
        stats.users.entry(user_id.to_string()).or_default().total_submissions += 1;

        if !solved {
            return Ok(false);
        }

        let newly_solved = stats
            .solved
            .entry(user_id.to_string())
            .or_default()
            .insert(problem_id.to_string());

        if newly_solved {
            stats.users.entry(user_id.to_string()).or_default().total_solved += 1;
        }

        Ok(newly_solved)
    }

    async fn record_problem_submission(&self, problem_id: &str, solved: bool) -> Result<()> {
        let mut stats = self.inner.lock().await;
        let tally = stats.problems.entry(problem_id.to_string()).or_default();
        tally.total_submissions += 1;
        if solved {
            tally.total_solved += 1;
        }
        Ok(())
    }

    async fn load_user_tally(&self, user_id: &str) -> Result<Tally> {
        Ok(self.user_tally(user_id).await)
    }
}

/// Best-effort recorder used by the judger
#[derive(Clone)]
pub struct StatisticsUpdater {
    store: Arc<dyn StatsStore>,
}

impl StatisticsUpdater {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }

    /// Record one finished evaluation. Store failures are logged, never returned.
    pub async fn record(&self, user_id: &str, problem_id: &str, solved: bool) {
        match self
            .store
            .record_user_submission(user_id, problem_id, solved)
            .await
        {
            Ok(true) => debug!("User {} solved problem {} for the first time", user_id, problem_id),
            Ok(false) => {}
            Err(e) => warn!("Failed to update stats for user {}: {:#}", user_id, e),
        }

        if let Err(e) = self.store.record_problem_submission(problem_id, solved).await {
            warn!("Failed to update stats for problem {}: {:#}", problem_id, e);
        }
    }

    /// Read a user's counters, `None` when the store is unavailable
    pub async fn user_tally(&self, user_id: &str) -> Option<Tally> {
        match self.store.load_user_tally(user_id).await {
            Ok(tally) => Some(tally),
            Err(e) => {
                warn!("Failed to load stats for user {}: {:#}", user_id, e);
                None
            }
        }
    }
}

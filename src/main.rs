mod completion;
mod config;
mod core;
mod harness;
mod jobs;
mod judge_client;
mod judger;
mod languages;
mod redis_manager;
mod stats;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::completion::{report_submission, WaitPolicy};
use crate::config::JudgeConfig;
use crate::judge_client::Judge0Client;
use crate::judger::Judger;
use crate::redis_manager::RedisManager;
use crate::stats::StatisticsUpdater;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("judge=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    languages::init_languages()?;
    info!(
        "Loaded language configurations: {}",
        languages::get_supported_languages().join(", ")
    );

    let config = JudgeConfig::from_env().context("Invalid configuration")?;
    let mut redis = RedisManager::connect(&config.redis_url).await?;

    let stats = StatisticsUpdater::new(Arc::new(redis.stats_store()));

    // `judge wait <submission_id>` prints the report once the submission is finalized
    let args: Vec<String> = std::env::args().collect();
    if let [_, command, submission_id] = args.as_slice() {
        if command == "wait" {
            let report =
                report_submission(&redis, &stats, submission_id, &WaitPolicy::default()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
    }

    let client = Judge0Client::new(config.judge0.clone())?;
    check_backend_languages(&client).await;

    let judger = Judger::new(
        Arc::new(client),
        stats,
        config.poll.clone(),
        config.memory_limit_kb,
    );

    info!(
        "Starting Judge Worker (backend {}, memory limit {}KB)",
        config.judge0.base_url, config.memory_limit_kb
    );
    info!("Waiting for jobs...");

    loop {
        let job = redis.pop_job().await?;

        if let Err(e) = jobs::process_job(&judger, &mut redis, job).await {
            error!("Failed to process job: {:#}", e);
        }
    }
}

/// Warn about registry languages the backend does not offer
async fn check_backend_languages(client: &Judge0Client) {
    let offered = match client.supported_languages().await {
        Ok(offered) => offered,
        Err(e) => {
            warn!("Could not list judge backend languages: {}", e);
            return;
        }
    };
    info!("Judge backend offers {} languages", offered.len());

    let mut checked = HashSet::new();
    for name in languages::get_supported_languages() {
        if let Some(config) = languages::get_language_config(&name) {
            if !checked.insert(config.language_id) {
                continue;
            }
            if !offered.iter().any(|language| language.id == config.language_id) {
                warn!(
                    "Language {} uses backend id {}, which the judge does not offer",
                    name, config.language_id
                );
            }
        }
    }
}

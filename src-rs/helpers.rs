use std::path::Path;

use crate::collector::{Collector, ErrorLog, RetryPolicy, SampleStore};
use crate::config::ChroniclerConfig;
use crate::error::Result;
use crate::github::{ClientConfig, Fetch, GitHubClient, RepoRef};
use crate::shutdown::ShutdownSignal;
use crate::token::Token;

/// The repository owner doubles as the User-Agent.
pub fn build_client(cfg: &ChroniclerConfig, token: Token, repo: &RepoRef) -> Result<GitHubClient> {
    GitHubClient::new(ClientConfig {
        token,
        user_agent: repo.owner.clone(),
        timeout: cfg.timeout,
    })
}

pub fn build_collector<F: Fetch>(
    cfg: &ChroniclerConfig,
    fetcher: F,
    url: &str,
    output: &Path,
    chronicle: Option<&Path>,
    shutdown: ShutdownSignal,
) -> Collector<F> {
    let collector = Collector::new(
        fetcher,
        url,
        SampleStore::new(output, cfg.keep_samples),
        ErrorLog::new(&cfg.error_log),
        RetryPolicy::from_config(cfg),
        shutdown,
    );
    match chronicle {
        Some(path) => collector.with_chronicle(path),
        None => collector,
    }
}

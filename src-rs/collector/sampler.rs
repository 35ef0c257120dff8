use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use super::errlog::ErrorLog;
use super::policy::{RetryPolicy, StopReason};
use super::store::{timestamp, SampleStore};
use crate::chronicle::TrafficChronicle;
use crate::error::{ChroniclerError, Result};
use crate::github::{Endpoint, Fetch, RawResponse};
use crate::shutdown::ShutdownSignal;

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub iterations: u64,
    pub samples: u64,
    pub failures: u64,
}

/// Repeatedly snapshots one URL into a `SampleStore`.
///
/// Failed iterations are logged and never end the loop on their own; only
/// the `RetryPolicy` limits or the `ShutdownSignal` do.
pub struct Collector<F: Fetch> {
    fetcher: F,
    url: String,
    store: SampleStore,
    errors: ErrorLog,
    policy: RetryPolicy,
    shutdown: ShutdownSignal,
    clock: Clock,
    chronicle: Option<PathBuf>,
}

impl<F: Fetch> Collector<F> {
    pub fn new(
        fetcher: F,
        url: &str,
        store: SampleStore,
        errors: ErrorLog,
        policy: RetryPolicy,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
            store,
            errors,
            policy,
            shutdown,
            clock: Box::new(Utc::now),
            chronicle: None,
        }
    }

    /// Also merges every stored sample into the chronicle at `path`.
    pub fn with_chronicle(mut self, path: impl Into<PathBuf>) -> Self {
        self.chronicle = Some(path.into());
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn run(&self) -> (StopReason, CollectorStats) {
        info!(url = %self.url, output = %self.store.path().display(), "starting collector");
        let mut stats = CollectorStats::default();
        let mut consecutive_failures = 0u32;

        loop {
            if self.shutdown.is_triggered() {
                return (StopReason::Cancelled, stats);
            }
            stats.iterations += 1;

            let mut response = None;
            match self.sample_once(&mut response) {
                Ok(held) => {
                    stats.samples += 1;
                    consecutive_failures = 0;
                    info!(url = %self.url, held, "sample stored");
                }
                Err(err) => {
                    stats.failures += 1;
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    let message =
                        describe_failure(&err, &self.url, self.store.path(), response.as_ref());
                    error!("{}", message);
                    if let Err(log_err) = self.errors.append(&message) {
                        error!(error = %log_err, "cannot append to error log");
                    }
                }
            }

            if let Some(reason) = self.policy.check(consecutive_failures, stats.samples) {
                return (reason, stats);
            }

            info!("Sleeping for {} seconds...", self.policy.interval.as_secs());
            if self.shutdown.wait_timeout(self.policy.interval) {
                return (StopReason::Cancelled, stats);
            }
        }
    }

    fn sample_once(&self, response: &mut Option<RawResponse>) -> Result<usize> {
        let resp = response.insert(self.fetcher.get(&self.url)?);
        let body = resp.json()?;
        let now = (self.clock)();
        let held = self.store.record(&self.url, &timestamp(now), body.clone())?;
        if let Some(path) = &self.chronicle {
            if let Err(err) = self.update_chronicle(path, &body, now) {
                let message = format!(
                    "Caught a {} error while updating chronicle {}: {}",
                    err.kind(),
                    path.display(),
                    err
                );
                warn!("{}", message);
                if let Err(log_err) = self.errors.append(&message) {
                    error!(error = %log_err, "cannot append to error log");
                }
            }
        }
        Ok(held)
    }

    /// A chronicle failure does not undo the stored sample.
    fn update_chronicle(&self, path: &Path, body: &Value, now: DateTime<Utc>) -> Result<()> {
        let Some(endpoint) = Endpoint::from_url(&self.url) else {
            warn!(url = %self.url, "not a traffic endpoint, chronicle left alone");
            return Ok(());
        };
        let mut chronicle = TrafficChronicle::load(path)?;
        if chronicle.absorb(endpoint, body, now) {
            chronicle.save(path)?;
        }
        Ok(())
    }
}

pub fn describe_failure(
    err: &ChroniclerError,
    url: &str,
    output: &Path,
    response: Option<&RawResponse>,
) -> String {
    format!(
        "Caught a {} error while collecting samples: {}, for URL {}, outputting to file {}, got response {}",
        err.kind(),
        err,
        url,
        output.display(),
        response
            .map(RawResponse::describe)
            .unwrap_or_else(|| "<none>".to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn failure_description_names_context() {
        let err = ChroniclerError::io("/nowhere/out.json", io::Error::from(io::ErrorKind::NotFound));
        let text = describe_failure(&err, "https://example/u", Path::new("/nowhere/out.json"), None);
        assert!(text.starts_with("Caught a io_error error while collecting samples"));
        assert!(text.contains("for URL https://example/u"));
        assert!(text.contains("outputting to file /nowhere/out.json"));
        assert!(text.ends_with("got response <none>"));
    }

    #[test]
    fn failure_description_includes_response() {
        let resp = RawResponse {
            status: 502,
            reason: "Bad Gateway".to_string(),
            headers: vec![],
            body: b"<html>oops</html>".to_vec(),
        };
        let err = resp.json().unwrap_err();
        let text = describe_failure(&err, "u", Path::new("o.json"), Some(&resp));
        assert!(text.contains("decode_error"));
        assert!(text.ends_with("got response 502 Bad Gateway: <html>oops</html>"));
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ChroniclerError, Result};
use crate::github::types::{CloneTraffic, PopularPath, Referrer, TrafficBucket, ViewTraffic};
use crate::github::Endpoint;
use crate::jsonfile::{read_json, write_json};

pub const CHRONICLE_INDENT: usize = 2;

/// GitHub keeps referrers and popular paths for a rolling 14 days.
const POPULAR_WINDOW_DAYS: i64 = 14;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantifiableEvents {
    pub amount: u64,
    pub amount_unique: u64,
}

impl QuantifiableEvents {
    /// Raises both counters to at least the observed values and returns how
    /// far each one grew. Counters never go down.
    pub fn raise_to(&mut self, amount: u64, amount_unique: u64) -> (u64, u64) {
        let grown = (
            amount.saturating_sub(self.amount),
            amount_unique.saturating_sub(self.amount_unique),
        );
        self.amount = self.amount.max(amount);
        self.amount_unique = self.amount_unique.max(amount_unique);
        grown
    }
}

type Timeline = BTreeMap<String, QuantifiableEvents>;

/// All-time traffic ledger built up from individual endpoint payloads.
///
/// Views and clones are keyed by the bucket timestamp GitHub reports, so a
/// bucket seen again only ever grows to its largest observed value. The
/// running totals follow the daily buckets. Referrers and popular paths carry
/// no timestamp; they are keyed by the start of the 14 day window they were
/// observed in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficChronicle {
    pub total_views: u64,
    pub total_views_unique: u64,
    pub total_clones: u64,
    pub total_clones_unique: u64,
    pub total_content_visits: u64,
    pub total_content_visits_unique: u64,
    pub total_referrals: u64,
    pub total_referrals_unique: u64,

    pub all_time_referrals: Timeline,
    pub all_time_content_paths: Timeline,

    pub daily_views: Timeline,
    pub daily_clones: Timeline,
    pub weekly_views: Timeline,
    pub weekly_clones: Timeline,

    pub windowed_referrals: BTreeMap<String, Timeline>,
    pub windowed_content_visits: BTreeMap<String, Timeline>,
}

impl TrafficChronicle {
    /// A missing file is an empty chronicle.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let value = read_json(path)?;
        serde_json::from_value(value).map_err(|err| ChroniclerError::json(path, err))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let value = serde_json::to_value(self).map_err(|err| ChroniclerError::json(path, err))?;
        write_json(path, &value, Some(CHRONICLE_INDENT))
    }

    /// Merges one payload of `endpoint` observed at `observed_at`. Returns
    /// `false` when the body is not that endpoint's traffic shape.
    pub fn absorb(&mut self, endpoint: Endpoint, body: &Value, observed_at: DateTime<Utc>) -> bool {
        match endpoint {
            Endpoint::ViewsDaily => match ViewTraffic::deserialize(body) {
                Ok(parsed) => {
                    let (views, unique) = merge_buckets(&mut self.daily_views, &parsed.views);
                    self.total_views += views;
                    self.total_views_unique += unique;
                    true
                }
                Err(_) => false,
            },
            Endpoint::ClonesDaily => match CloneTraffic::deserialize(body) {
                Ok(parsed) => {
                    let (clones, unique) = merge_buckets(&mut self.daily_clones, &parsed.clones);
                    self.total_clones += clones;
                    self.total_clones_unique += unique;
                    true
                }
                Err(_) => false,
            },
            Endpoint::ViewsWeekly => match ViewTraffic::deserialize(body) {
                Ok(parsed) => {
                    merge_buckets(&mut self.weekly_views, &parsed.views);
                    true
                }
                Err(_) => false,
            },
            Endpoint::ClonesWeekly => match CloneTraffic::deserialize(body) {
                Ok(parsed) => {
                    merge_buckets(&mut self.weekly_clones, &parsed.clones);
                    true
                }
                Err(_) => false,
            },
            Endpoint::PopularReferrers => match Vec::<Referrer>::deserialize(body) {
                Ok(parsed) => {
                    let window = window_start(observed_at);
                    for entry in parsed {
                        let (count, unique) = merge_windowed(
                            &mut self.windowed_referrals,
                            &mut self.all_time_referrals,
                            &entry.referrer,
                            &window,
                            entry.count,
                            entry.uniques,
                        );
                        self.total_referrals += count;
                        self.total_referrals_unique += unique;
                    }
                    true
                }
                Err(_) => false,
            },
            Endpoint::PopularPaths => match Vec::<PopularPath>::deserialize(body) {
                Ok(parsed) => {
                    let window = window_start(observed_at);
                    for entry in parsed {
                        let (count, unique) = merge_windowed(
                            &mut self.windowed_content_visits,
                            &mut self.all_time_content_paths,
                            &entry.path,
                            &window,
                            entry.count,
                            entry.uniques,
                        );
                        self.total_content_visits += count;
                        self.total_content_visits_unique += unique;
                    }
                    true
                }
                Err(_) => false,
            },
        }
    }

    /// Replays collector samples (`{ timestamp: body }`) of one endpoint.
    /// Returns how many samples were merged; keys that are not RFC 3339
    /// timestamps and bodies of the wrong shape are skipped.
    pub fn absorb_samples(&mut self, endpoint: Endpoint, samples: &Map<String, Value>) -> usize {
        let mut merged = 0;
        for (stamp, body) in samples {
            let observed_at = match DateTime::parse_from_rfc3339(stamp) {
                Ok(at) => at.with_timezone(&Utc),
                Err(_) => {
                    debug!(stamp = %stamp, "skipping sample with unreadable timestamp");
                    continue;
                }
            };
            if self.absorb(endpoint, body, observed_at) {
                merged += 1;
            }
        }
        merged
    }
}

impl fmt::Display for TrafficChronicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "views {} ({} unique), clones {} ({} unique), referrals {} ({} unique) from {} referrers, \
             content visits {} ({} unique) over {} paths",
            self.total_views,
            self.total_views_unique,
            self.total_clones,
            self.total_clones_unique,
            self.total_referrals,
            self.total_referrals_unique,
            self.all_time_referrals.len(),
            self.total_content_visits,
            self.total_content_visits_unique,
            self.all_time_content_paths.len()
        )
    }
}

fn merge_buckets(timeline: &mut Timeline, buckets: &[TrafficBucket]) -> (u64, u64) {
    let mut grown = (0, 0);
    for bucket in buckets {
        let (count, unique) = timeline
            .entry(bucket.timestamp.clone())
            .or_default()
            .raise_to(bucket.count, bucket.uniques);
        grown.0 += count;
        grown.1 += unique;
    }
    grown
}

fn merge_windowed(
    windows: &mut BTreeMap<String, Timeline>,
    all_time: &mut Timeline,
    key: &str,
    window: &str,
    count: u64,
    uniques: u64,
) -> (u64, u64) {
    let (grown, grown_unique) = windows
        .entry(key.to_string())
        .or_default()
        .entry(window.to_string())
        .or_default()
        .raise_to(count, uniques);
    let total = all_time.entry(key.to_string()).or_default();
    total.amount += grown;
    total.amount_unique += grown_unique;
    (grown, grown_unique)
}

fn window_start(observed_at: DateTime<Utc>) -> String {
    (observed_at - Duration::days(POPULAR_WINDOW_DAYS))
        .format("%Y-%m-%dT00:00:00Z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).single().expect("valid")
    }

    fn daily_views(buckets: &[(&str, u64, u64)]) -> Value {
        let views: Vec<Value> = buckets
            .iter()
            .map(|(ts, count, uniques)| json!({"timestamp": ts, "count": count, "uniques": uniques}))
            .collect();
        json!({"count": 0, "uniques": 0, "views": views})
    }

    #[test]
    fn smaller_resample_never_lowers_a_bucket() {
        let mut chronicle = TrafficChronicle::default();
        let first = daily_views(&[("2024-03-01T00:00:00Z", 10, 4)]);
        let second = daily_views(&[("2024-03-01T00:00:00Z", 6, 2)]);

        assert!(chronicle.absorb(Endpoint::ViewsDaily, &first, at(1, 12)));
        assert!(chronicle.absorb(Endpoint::ViewsDaily, &second, at(1, 13)));

        let bucket = chronicle.daily_views["2024-03-01T00:00:00Z"];
        assert_eq!(bucket, QuantifiableEvents { amount: 10, amount_unique: 4 });
        assert_eq!(chronicle.total_views, 10);
        assert_eq!(chronicle.total_views_unique, 4);
    }

    #[test]
    fn growing_bucket_adds_only_the_difference() {
        let mut chronicle = TrafficChronicle::default();
        chronicle.absorb(Endpoint::ViewsDaily, &daily_views(&[("2024-03-01T00:00:00Z", 3, 1)]), at(1, 6));
        chronicle.absorb(
            Endpoint::ViewsDaily,
            &daily_views(&[("2024-03-01T00:00:00Z", 5, 2), ("2024-03-02T00:00:00Z", 7, 3)]),
            at(2, 6),
        );

        assert_eq!(chronicle.total_views, 12);
        assert_eq!(chronicle.total_views_unique, 5);
        assert_eq!(chronicle.daily_views.len(), 2);
    }

    #[test]
    fn weekly_clones_merge_without_touching_totals() {
        let mut chronicle = TrafficChronicle::default();
        let body = json!({
            "count": 9, "uniques": 3,
            "clones": [{"timestamp": "2024-02-26T00:00:00Z", "count": 9, "uniques": 3}]
        });
        assert!(chronicle.absorb(Endpoint::ClonesWeekly, &body, at(1, 0)));
        assert_eq!(chronicle.weekly_clones["2024-02-26T00:00:00Z"].amount, 9);
        assert_eq!(chronicle.total_clones, 0);
    }

    #[test]
    fn referrers_are_windowed_and_max_merged() {
        let mut chronicle = TrafficChronicle::default();
        let busy = json!([{"referrer": "github.com", "count": 8, "uniques": 3}]);
        let quiet = json!([{"referrer": "github.com", "count": 5, "uniques": 1}]);

        chronicle.absorb(Endpoint::PopularReferrers, &busy, at(20, 10));
        chronicle.absorb(Endpoint::PopularReferrers, &quiet, at(20, 11));

        let windows = &chronicle.windowed_referrals["github.com"];
        assert_eq!(windows.len(), 1);
        assert_eq!(windows["2024-03-06T00:00:00Z"].amount, 8);
        assert_eq!(chronicle.all_time_referrals["github.com"].amount, 8);
        assert_eq!(chronicle.total_referrals, 8);

        chronicle.absorb(Endpoint::PopularReferrers, &quiet, at(21, 10));
        assert_eq!(chronicle.windowed_referrals["github.com"].len(), 2);
        assert_eq!(chronicle.total_referrals, 13);
    }

    #[test]
    fn popular_paths_feed_content_visits() {
        let mut chronicle = TrafficChronicle::default();
        let body = json!([{"path": "/o/n", "title": "n", "count": 4, "uniques": 2}]);
        assert!(chronicle.absorb(Endpoint::PopularPaths, &body, at(15, 0)));
        assert_eq!(chronicle.total_content_visits, 4);
        assert_eq!(chronicle.all_time_content_paths["/o/n"].amount_unique, 2);
    }

    #[test]
    fn error_payload_is_not_absorbed() {
        let mut chronicle = TrafficChronicle::default();
        let body = json!({"message": "Must have push access to repository"});
        assert!(!chronicle.absorb(Endpoint::ViewsDaily, &body, at(1, 0)));
        assert!(!chronicle.absorb(Endpoint::PopularReferrers, &body, at(1, 0)));
        assert_eq!(chronicle, TrafficChronicle::default());
    }

    #[test]
    fn replaying_collector_samples() {
        let mut samples = Map::new();
        samples.insert(
            "2024-03-01T23:59:59Z".to_string(),
            daily_views(&[("2024-03-01T00:00:00Z", 4, 2)]),
        );
        samples.insert(
            "2024-03-02T00:00:01Z".to_string(),
            daily_views(&[("2024-03-01T00:00:00Z", 2, 1), ("2024-03-02T00:00:00Z", 1, 1)]),
        );
        samples.insert("not a time".to_string(), daily_views(&[]));

        let mut chronicle = TrafficChronicle::default();
        assert_eq!(chronicle.absorb_samples(Endpoint::ViewsDaily, &samples), 2);
        assert_eq!(chronicle.total_views, 5);
        assert_eq!(chronicle.total_views_unique, 3);
    }

    #[test]
    fn save_then_load_keeps_ledger() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("chronicle.json");
        assert_eq!(TrafficChronicle::load(&path).expect("missing is empty"), TrafficChronicle::default());

        let mut chronicle = TrafficChronicle::default();
        chronicle.absorb(Endpoint::ViewsDaily, &daily_views(&[("2024-03-01T00:00:00Z", 2, 1)]), at(1, 1));
        chronicle.save(&path).expect("save");

        let loaded = TrafficChronicle::load(&path).expect("load");
        assert_eq!(loaded.total_views, 2);
        assert_eq!(loaded.to_string(), chronicle.to_string());
    }

    #[test]
    fn corrupt_chronicle_is_json_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("chronicle.json");
        std::fs::write(&path, r#"{"total_views": "many"}"#).expect("seed");
        let err = TrafficChronicle::load(&path).unwrap_err();
        assert_eq!(err.kind(), "json_error");
    }
}

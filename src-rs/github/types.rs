use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::endpoints::Endpoint;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrafficBucket {
    pub timestamp: String,
    pub count: u64,
    pub uniques: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewTraffic {
    pub count: u64,
    pub uniques: u64,
    pub views: Vec<TrafficBucket>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CloneTraffic {
    pub count: u64,
    pub uniques: u64,
    pub clones: Vec<TrafficBucket>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopularPath {
    pub path: String,
    pub title: String,
    pub count: u64,
    pub uniques: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Referrer {
    pub referrer: String,
    pub count: u64,
    pub uniques: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrafficSummary {
    Series {
        label: &'static str,
        count: u64,
        uniques: u64,
        buckets: usize,
        latest: Option<String>,
    },
    Popular {
        label: &'static str,
        entries: usize,
        top: Option<(String, u64)>,
    },
}

impl fmt::Display for TrafficSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficSummary::Series {
                label,
                count,
                uniques,
                buckets,
                latest,
            } => {
                write!(f, "{}: {} total, {} unique over {} buckets", label, count, uniques, buckets)?;
                if let Some(latest) = latest {
                    write!(f, " (latest {})", latest)?;
                }
                Ok(())
            }
            TrafficSummary::Popular { label, entries, top } => {
                write!(f, "{}: {} entries", label, entries)?;
                if let Some((name, count)) = top {
                    write!(f, ", top {} with {}", name, count)?;
                }
                Ok(())
            }
        }
    }
}

/// Reads the body as the shape GitHub documents for `endpoint`.
/// Anything else, error payloads included, yields `None`.
pub fn summarize(endpoint: Endpoint, body: &Value) -> Option<TrafficSummary> {
    match endpoint {
        Endpoint::ViewsWeekly | Endpoint::ViewsDaily => {
            let parsed = ViewTraffic::deserialize(body).ok()?;
            Some(series("views", parsed.count, parsed.uniques, &parsed.views))
        }
        Endpoint::ClonesWeekly | Endpoint::ClonesDaily => {
            let parsed = CloneTraffic::deserialize(body).ok()?;
            Some(series("clones", parsed.count, parsed.uniques, &parsed.clones))
        }
        Endpoint::PopularPaths => {
            let parsed = Vec::<PopularPath>::deserialize(body).ok()?;
            let top = parsed
                .iter()
                .max_by_key(|entry| entry.count)
                .map(|entry| (entry.path.clone(), entry.count));
            Some(TrafficSummary::Popular {
                label: "paths",
                entries: parsed.len(),
                top,
            })
        }
        Endpoint::PopularReferrers => {
            let parsed = Vec::<Referrer>::deserialize(body).ok()?;
            let top = parsed
                .iter()
                .max_by_key(|entry| entry.count)
                .map(|entry| (entry.referrer.clone(), entry.count));
            Some(TrafficSummary::Popular {
                label: "referrers",
                entries: parsed.len(),
                top,
            })
        }
    }
}

fn series(label: &'static str, count: u64, uniques: u64, buckets: &[TrafficBucket]) -> TrafficSummary {
    TrafficSummary::Series {
        label,
        count,
        uniques,
        buckets: buckets.len(),
        latest: buckets.iter().map(|b| b.timestamp.clone()).max(),
    }
}

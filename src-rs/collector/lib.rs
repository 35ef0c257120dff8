pub mod errlog;
pub mod policy;
pub mod sampler;
pub mod store;

pub use errlog::ErrorLog;
pub use policy::{RetryPolicy, StopReason};
pub use sampler::{Collector, CollectorStats};
pub use store::{timestamp, SampleStore, STORE_INDENT};

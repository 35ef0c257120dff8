pub mod chronicle;
pub mod config;
pub mod error;
pub mod helpers;
pub mod jsonfile;
pub mod shutdown;
pub mod token;

#[path = "github/lib.rs"]
pub mod github;
#[path = "collector/lib.rs"]
pub mod collector;

pub use chronicle::{QuantifiableEvents, TrafficChronicle};
pub use config::ChroniclerConfig;
pub use error::{ChroniclerError, Result};
pub use shutdown::ShutdownSignal;
pub use token::{load_token, LoadedToken, Token};

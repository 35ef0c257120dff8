use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CLIOptions {
    /// Output file for the collector, when one was requested.
    pub collect: Option<PathBuf>,
    /// Ledger file that every fetched traffic payload is merged into.
    pub chronicle: Option<PathBuf>,
    pub help: bool,
    pub warnings: Vec<String>,
}

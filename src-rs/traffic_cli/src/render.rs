use std::io::{self, Write};
use std::path::Path;

use github_chronicler_rs::collector::{CollectorStats, StopReason};
use github_chronicler_rs::github::{summarize, Endpoint, RawResponse};
use github_chronicler_rs::jsonfile::to_string_indented;
use github_chronicler_rs::TrafficChronicle;

use crate::cli::USAGE;

const CONSOLE_INDENT: usize = 4;

pub fn usage() {
    println!("{}", USAGE);
}

pub fn collector_queued(output: &Path) {
    println!("Collector will run after prompting, writing to {}.", output.display());
}

pub fn token_warning() {
    println!(
        "WARNING: Whitespace got stripped from the end of the token file. \
         You might want to get rid of that, or some requests may fail.\n"
    );
}

pub fn using_url(url: &str) {
    println!("\n\nUsing {}..\n", url);
}

pub fn collector_started(interval_secs: u64) {
    println!(
        "Starting collector, sampling every {} seconds. Ctrl-C stops it, a second Ctrl-C exits at once.",
        interval_secs
    );
}

pub fn collector_stopped(reason: StopReason, stats: CollectorStats) {
    println!(
        "Collector stopped: {} ({} iterations, {} samples, {} failures)",
        reason, stats.iterations, stats.samples, stats.failures
    );
}

/// Status, headers, then the body: indented JSON when it parses, raw
/// text plus the decode error otherwise.
pub fn response<W: Write>(out: &mut W, resp: &RawResponse, endpoint: Endpoint) -> io::Result<()> {
    writeln!(out, "STATUS: {}\n", resp.status)?;
    writeln!(out, "---")?;
    for (name, value) in &resp.headers {
        writeln!(out, "{}: {}", name, value)?;
    }
    writeln!(out, "---")?;

    match resp.json() {
        Ok(value) => {
            let pretty = to_string_indented(&value, CONSOLE_INDENT).unwrap_or_else(|_| value.to_string());
            writeln!(out, "{}\n", pretty)?;
            writeln!(out, "\n\nResponse content was formatted as JSON")?;
            if let Some(summary) = summarize(endpoint, &value) {
                writeln!(out, "{}", summary)?;
            }
        }
        Err(err) => {
            writeln!(out, "{}\n", resp.text_lossy())?;
            writeln!(out, "\n\nResponse content was not valid JSON\n---\n{}", err)?;
        }
    }

    writeln!(out, "\nNothing left to do.\n...Exiting...")?;
    out.flush()
}

pub fn chronicle(path: &Path, chronicle: &TrafficChronicle) {
    println!("Chronicle {}: {}", path.display(), chronicle);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}

use std::path::PathBuf;
use std::time::Duration;

use github_chronicler_rs::ChroniclerConfig;

use crate::models::CLIOptions;

pub const USAGE: &str =
    "Just run it, or use --collect (-c) <file> to gather debug samples from an API endpoint.\n\
     --chronicle <file> merges every traffic response into an all-time ledger.";

/// Scans `args` (program name first) and applies overrides to `cfg`.
pub fn parse_args(args: &[String], cfg: &mut ChroniclerConfig) -> CLIOptions {
    let mut opts = CLIOptions::default();
    let mut idx = 1;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "--collect" | "-c" => {
                if let Some(value) = args.get(idx + 1) {
                    if opts.collect.is_some() {
                        opts.warnings
                            .push(format!("ignoring extra {} {}, only one collector runs", flag, value));
                    } else {
                        opts.collect = Some(PathBuf::from(value));
                    }
                    idx += 1;
                } else {
                    opts.warnings.push(format!("{} needs an output path", flag));
                }
            }
            "--help" | "-h" => opts.help = true,
            "--interval" => {
                if let Some(value) = value_after(args, idx, &mut opts) {
                    if let Some(parsed) = numeric::<u64>(flag, value, &mut opts) {
                        cfg.interval = Duration::from_secs(parsed);
                    }
                    idx += 1;
                }
            }
            "--max-failures" => {
                if let Some(value) = value_after(args, idx, &mut opts) {
                    if let Some(parsed) = numeric::<u32>(flag, value, &mut opts) {
                        cfg.max_failures = Some(parsed);
                    }
                    idx += 1;
                }
            }
            "--max-samples" => {
                if let Some(value) = value_after(args, idx, &mut opts) {
                    if let Some(parsed) = numeric::<u64>(flag, value, &mut opts) {
                        cfg.max_samples = Some(parsed);
                    }
                    idx += 1;
                }
            }
            "--keep" => {
                if let Some(value) = value_after(args, idx, &mut opts) {
                    if let Some(parsed) = numeric::<usize>(flag, value, &mut opts) {
                        cfg.keep_samples = Some(parsed);
                    }
                    idx += 1;
                }
            }
            "--token-file" => {
                if let Some(value) = value_after(args, idx, &mut opts) {
                    cfg.token_file = PathBuf::from(value);
                    idx += 1;
                }
            }
            "--chronicle" => {
                if let Some(value) = value_after(args, idx, &mut opts) {
                    opts.chronicle = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    opts
}

/// The argument following `args[idx]`, unless it is missing or another flag.
fn value_after<'a>(args: &'a [String], idx: usize, opts: &mut CLIOptions) -> Option<&'a String> {
    match args.get(idx + 1) {
        Some(value) if !value.starts_with('-') => Some(value),
        _ => {
            opts.warnings.push(format!("{} needs a value", args[idx]));
            None
        }
    }
}

fn numeric<T: std::str::FromStr>(flag: &str, value: &str, opts: &mut CLIOptions) -> Option<T> {
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            opts.warnings
                .push(format!("{} expects a number, got {}", flag, value));
            None
        }
    }
}

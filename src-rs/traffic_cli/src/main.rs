mod cli;
mod menu;
mod models;
mod render;

use std::env;
use std::io;
use std::process;

use chrono::Utc;

use github_chronicler_rs::github::{build_url, Fetch};
use github_chronicler_rs::helpers::{build_client, build_collector};
use github_chronicler_rs::shutdown::install_ctrl_c;
use github_chronicler_rs::{load_token, ChroniclerConfig, ShutdownSignal, TrafficChronicle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let mut config = ChroniclerConfig::from_env();
    let args: Vec<String> = env::args().collect();
    let opts = cli::parse_args(&args, &mut config);
    if opts.help {
        render::usage();
    }
    for warning in &opts.warnings {
        render::error(warning);
    }
    if let Some(output) = &opts.collect {
        render::collector_queued(output);
    }

    let loaded = match load_token(&config.token_file) {
        Ok(loaded) => loaded,
        Err(err) => {
            render::error(&err.to_string());
            process::exit(1);
        }
    };
    if loaded.stripped {
        render::token_warning();
    }

    let picked = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut input = stdin.lock();
        let mut out = stdout.lock();
        menu::select_endpoint(&mut input, &mut out).and_then(|endpoint| match endpoint {
            Some(endpoint) => menu::prompt_repo(&mut input, &mut out).map(|repo| Some((endpoint, repo))),
            None => Ok(None),
        })
    };
    let (endpoint, repo) = match picked {
        Ok(Some(choice)) => choice,
        Ok(None) => {
            render::info("\nNo endpoint selected, nothing to do.");
            return;
        }
        Err(err) => {
            render::error(&format!("cannot read input: {}", err));
            process::exit(1);
        }
    };

    let url = build_url(&config.api_base, &repo, endpoint);
    render::using_url(&url);

    if opts.collect.is_some() {
        config.timeout = Some(config.collector_timeout());
    }

    let client = match build_client(&config, loaded.token, &repo) {
        Ok(client) => client,
        Err(err) => {
            render::error(&err.to_string());
            process::exit(1);
        }
    };

    if let Some(output) = opts.collect {
        let shutdown = ShutdownSignal::new();
        if let Err(err) = install_ctrl_c(shutdown.clone()) {
            warn!(error = %err, "ctrl-c handler unavailable, stop the process externally");
        }
        render::collector_started(config.interval.as_secs());
        let collector = build_collector(
            &config,
            client,
            &url,
            &output,
            opts.chronicle.as_deref(),
            shutdown,
        );
        let (reason, stats) = collector.run();
        render::collector_stopped(reason, stats);
        return;
    }

    let resp = match client.get(&url) {
        Ok(resp) => resp,
        Err(err) => {
            render::error(&err.to_string());
            process::exit(1);
        }
    };
    if let Err(err) = render::response(&mut io::stdout().lock(), &resp, endpoint) {
        render::error(&format!("cannot write output: {}", err));
        process::exit(1);
    }

    if let Some(path) = &opts.chronicle {
        let merged = resp.json().map_err(|err| err.to_string()).and_then(|body| {
            let mut chronicle = TrafficChronicle::load(path).map_err(|err| err.to_string())?;
            if chronicle.absorb(endpoint, &body, Utc::now()) {
                chronicle.save(path).map_err(|err| err.to_string())?;
            }
            Ok(chronicle)
        });
        match merged {
            Ok(chronicle) => render::chronicle(path, &chronicle),
            Err(err) => render::error(&format!("chronicle not updated: {}", err)),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

//! capdispatch - command dispatcher harness
//!
//! This is the main entry point for the dispatcher CLI.
//! It reads `<command> [<json>]` requests from stdin, one per line, and
//! writes one JSON reply (or `ERR <message>`) per line to stdout.

use anyhow::Context;
use capdispatch::config::Config;
use capdispatch::dispatch::{ReloadWatcher, WatchConfig};
use capdispatch::protocol::{parse_request, ParseError};
use capdispatch::service::Service;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line options
#[derive(Default)]
struct Options {
    /// Link values handed to `Config::init`
    values: HashMap<String, String>,
    /// `--watch` override
    watch_path: Option<String>,
    /// `--watch-interval` override
    watch_interval_ms: Option<u64>,
}

impl Options {
    /// Parse options from command-line arguments
    fn from_args() -> Self {
        let mut options = Options::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config-json" | "-c" => {
                    if i + 1 < args.len() {
                        options
                            .values
                            .insert("config_json".to_string(), args[i + 1].clone());
                        i += 2;
                    } else {
                        eprintln!("Error: --config-json requires a value");
                        std::process::exit(1);
                    }
                }
                "--watch" | "-w" => {
                    if i + 1 < args.len() {
                        options.watch_path = Some(args[i + 1].clone());
                        i += 2;
                    } else {
                        eprintln!("Error: --watch requires a value");
                        std::process::exit(1);
                    }
                }
                "--watch-interval" => {
                    if i + 1 < args.len() {
                        options.watch_interval_ms = Some(args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid interval");
                            std::process::exit(1);
                        }));
                        i += 2;
                    } else {
                        eprintln!("Error: --watch-interval requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("capdispatch version {}", capdispatch::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        options
    }

    /// Builds the config from link values and environment, then applies
    /// command-line overrides
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = Config::init(self.values).context("loading configuration")?;
        if let Some(path) = self.watch_path {
            config.watch_path = Some(path);
        }
        if let Some(ms) = self.watch_interval_ms {
            config.watch_interval_ms = Some(ms);
        }
        config.validate().context("validating configuration")?;
        Ok(config)
    }
}

fn print_help() {
    println!(
        r#"
capdispatch - suffix-routed command dispatcher

USAGE:
    capdispatch [OPTIONS] < requests

OPTIONS:
    -c, --config-json <JSON>     Configuration as JSON
    -w, --watch <PATH>           Reload handlers when this file changes
        --watch-interval <MS>    Poll the watched file in the background
    -v, --version                Print version information
    -h, --help                   Print this help message

ENVIRONMENT:
    DISPATCH_WATCH               Same as --watch
    DISPATCH_WATCH_INTERVAL_MS   Same as --watch-interval
    RUST_LOG                     Log filter (default: info)

REQUESTS:
    One per line: <command> [<json argument>]

    $ capdispatch
    ns.factorial 5
    120
    ns.hello "World"
    "Hello World!"
    ns.big_response 3
    "xxx"
    reload
    true
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let options = Options::from_args();

    // Set up logging; stdout carries replies, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = options.into_config()?;
    let service = Arc::new(Service::with_config(config).await);

    // With a background watcher, reloads happen off the request path
    let watcher = match (&service.config().watch_path, service.config().watch_interval()) {
        (Some(path), Some(interval)) => Some(ReloadWatcher::start(
            Arc::clone(service.dispatcher()),
            WatchConfig::new(path).with_interval(interval),
        )),
        _ => None,
    };
    let check_on_call = watcher.is_none();

    info!(version = capdispatch::VERSION, "Ready to accept requests");

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping...");
    };

    tokio::select! {
        result = request_loop(Arc::clone(&service), check_on_call) => result?,
        _ = shutdown => {}
    }

    let stats = service.dispatcher().stats().snapshot();
    info!(
        dispatched = stats.dispatched,
        unmatched = stats.unmatched,
        failed = stats.failed,
        reloads = stats.reloads,
        "Dispatcher exiting"
    );
    Ok(())
}

/// Reads requests from stdin until EOF and prints one reply per line
async fn request_loop(service: Arc<Service>, check_on_call: bool) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let request = match parse_request(&line) {
            Ok(Some(request)) => request,
            Ok(None) | Err(ParseError::EmptyInput) => continue,
            Err(e) => {
                warn!(error = %e, "Rejected request");
                println!("ERR {}", e);
                continue;
            }
        };

        let result = if check_on_call {
            service.check_invoke(&request.command, &request.arg).await
        } else {
            service.invoke(&request.command, &request.arg).await
        };

        match result {
            Ok(reply) => println!("{}", String::from_utf8_lossy(&reply)),
            Err(e) => println!("ERR {}", e),
        }
    }

    Ok(())
}

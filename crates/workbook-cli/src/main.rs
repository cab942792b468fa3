// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::DispatchRuntime;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;
use workbook_app::WorkbookState;
use workbook_dispatch::{Dispatcher, SimulatedDispatcher, WebhookClient};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `workbook --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let delay = config.submission_delay()?;
    let dispatcher: Arc<dyn Dispatcher> = match config.dispatch_endpoint() {
        Some(endpoint) if config.dispatch_enabled() => Arc::new(
            WebhookClient::new(endpoint, config.dispatch_timeout()?).with_context(|| {
                format!(
                    "invalid [dispatch] config in {}; fix endpoint/timeout values",
                    options.config_path.display()
                )
            })?,
        ),
        _ => Arc::new(SimulatedDispatcher),
    };
    if options.check_only {
        return Ok(());
    }

    init_logging(&config)?;
    let mode = if config.dispatch_enabled() {
        "webhook"
    } else {
        "simulated"
    };
    info!(
        config = %options.config_path.display(),
        dispatch = mode,
        demo = options.demo,
        "starting workbook"
    );

    let mut state = if options.demo {
        WorkbookState::demo()
    } else {
        WorkbookState::default()
    };
    let mut runtime = DispatchRuntime::new(dispatcher, delay);
    workbook_tui::run_app(&mut state, &mut runtime, config.view_options())
}

/// Routes `tracing` output to the log file. `WORKBOOK_LOG` wins over `[log].level`.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable location",
                path.display()
            )
        })?;

    let filter = EnvFilter::try_from_env("WORKBOOK_LOG")
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .context("build log filter")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("workbook: The First Step, a ten-page reflection workbook");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with pre-filled answers and values");
    println!("  --check                  Validate config and dispatch settings, then exit");
    println!("  --help                   Show this help");
}

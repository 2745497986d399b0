//! Application orchestrator.
//! Loads XML defaults, merges CLI flags over them, initializes logging,
//! installs the Ctrl-C handler, validates options and runs the copy/move.

use anyhow::{Context, Result, bail};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use file_by_date::config::{Defaults, create_template_config, load_defaults};
use file_by_date::output as out;
use file_by_date::{Outcome, default_config_path, execute, shutdown, validate};

use crate::cli::Args;
use crate::logging::init_tracing;

fn print_config_location() {
    if let Ok(explicit) = std::env::var(file_by_date::config::CONFIG_ENV) {
        out::print_info(&format!(
            "Using {} (explicit):\n  {explicit}",
            file_by_date::config::CONFIG_ENV
        ));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file there yet. Run with --init-config to create a template.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn init_config() -> Result<()> {
    let Some(path) = default_config_path() else {
        bail!("could not determine a config path; set {}", file_by_date::config::CONFIG_ENV);
    };
    create_template_config(&path)?;
    out::print_success(&format!("Template config written to: {}", path.display()));
    Ok(())
}

fn load_file_defaults() -> Result<Defaults> {
    match load_defaults() {
        Ok(Some((path, defaults))) => {
            debug!(path = %path.display(), ?defaults, "Loaded config defaults");
            Ok(defaults)
        }
        Ok(None) => Ok(Defaults::default()),
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            Err(e)
        }
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Both handled before logging init.
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        return init_config();
    }

    let defaults = load_file_defaults()?;
    let log_level = args
        .effective_log_level()
        .or_else(|| defaults.log_level.clone())
        .unwrap_or_default();
    let log_file = args.log_file.clone().or_else(|| defaults.log_file.clone());

    let guard_opt = init_tracing(&log_level, log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    // The guard is dropped on SIGINT so buffered file logs are flushed.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; stopping after the current file...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("install Ctrl-C handler")?;
    }

    debug!(?args, "Starting file_by_date");

    let result = run_validated(&args, &defaults);

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn run_validated(args: &Args, defaults: &Defaults) -> Result<()> {
    let cfg = match validate(args.to_raw_options(defaults)) {
        Ok(cfg) => cfg,
        Err(errors) => {
            for msg in errors.messages() {
                out::print_error(&msg);
            }
            error!(count = errors.len(), %errors, "Invalid options");
            bail!("invalid options");
        }
    };
    debug!(%cfg, "Validated configuration");

    let summary = execute(&cfg, |result| match result.outcome {
        Outcome::Failed => out::print_warn(&result.to_string()),
        _ => out::print_user(&result.to_string()),
    })
    .map_err(|e| {
        error!(code = e.code(), error = %e, "Run failed");
        out::print_error(&e.to_string());
        e
    })?;

    if summary.failed > 0 || summary.interrupted {
        out::print_warn(&format!("Finished with problems: {summary}"));
    } else {
        out::print_success(&format!("Done: {summary}"));
    }

    if summary.interrupted {
        bail!(file_by_date::FileByDateError::Interrupted);
    }
    if summary.failed > 0 {
        bail!("{} file(s) failed", summary.failed);
    }
    Ok(())
}

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use config::{load_config, Args, Command, Config, Settings};
use std::process;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            process::exit(1);
        }
    };

    match run(args.command, &config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Runs one command. `Ok(false)` means it finished but some hunks did not apply.
fn run(command: Command, config: &Config) -> Result<bool> {
    let settings = Settings::resolve(config, &command);

    match command {
        Command::Parse { patch, json } => {
            let content = commands::read_patch(patch.as_deref())?;
            commands::run_parse(&content, json)?;
            Ok(true)
        }

        Command::Apply { document, patch, .. } => {
            let content = commands::read_patch(patch.as_deref())?;
            commands::run_apply(&document, &content, settings.dry_run, settings.backup)
        }

        Command::Review { document, patch, .. } => {
            let content = commands::read_patch(patch.as_deref())?;
            commands::run_review(&document, &content, settings.review, patch.is_none())?;
            Ok(true)
        }

        Command::Prompt {
            document,
            selection,
            instruction,
            ..
        } => {
            commands::run_prompt(
                &document,
                selection.as_deref(),
                &instruction.join(" "),
                settings.fenced,
            )?;
            Ok(true)
        }
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub apply: ApplyConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApplyConfig {
    /// Keep a `<document>.orig` copy before overwriting.
    pub backup: bool,
    pub dry_run: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            backup: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    pub default_action: ReviewAction,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    #[default]
    Ask,
    Accept,
    Reject,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub fenced: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { fenced: true }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "docpatch",
    version,
    about = "Review and apply loosely formatted diffs to markdown documents"
)]
#[command(after_help = r#"INPUT:
    PATCH may be a file or piped on stdin. Chat replies are fine: when the
    text holds a ```diff fence only the fenced lines are read.

CONFIG:
    Default config location: ~/.config/docpatch/config.toml
    Use --ignore-config to use built-in defaults instead."#)]
pub struct Args {
    #[arg(
        short,
        long,
        global = true,
        help = "Path to config file [default: ~/.config/docpatch/config.toml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Use built-in defaults, ignore config file"
    )]
    pub ignore_config: bool,

    #[arg(short, long, global = true, help = "Log resolution details to stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the hunks found in a patch
    Parse {
        #[arg(help = "Patch file [default: stdin]")]
        patch: Option<PathBuf>,

        #[arg(long, help = "Print hunks as JSON")]
        json: bool,
    },

    /// Apply every hunk to a document as plain text
    Apply {
        document: PathBuf,

        #[arg(help = "Patch file [default: stdin]")]
        patch: Option<PathBuf>,

        #[arg(long, help = "Report what would change without writing")]
        dry_run: bool,

        #[arg(long, help = "Do not keep a <document>.orig copy")]
        no_backup: bool,
    },

    /// Accept or reject each hunk against the document's blocks
    Review {
        document: PathBuf,

        #[arg(help = "Patch file [default: stdin]")]
        patch: Option<PathBuf>,

        #[arg(long, conflicts_with = "reject_all", help = "Accept every proposal")]
        accept_all: bool,

        #[arg(long, help = "Reject every proposal")]
        reject_all: bool,
    },

    /// Print the editing prompt to send along with a document
    Prompt {
        document: PathBuf,

        #[arg(long, help = "Part of the document the edit should focus on")]
        selection: Option<String>,

        #[arg(long, help = "Ask for bare unified lines instead of a ```diff fence")]
        unified: bool,

        #[arg(required = true, num_args = 1.., help = "What to change")]
        instruction: Vec<String>,
    },
}

/// How `review` settles proposals once flags and config are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPolicy {
    AcceptAll,
    RejectAll,
    /// Ask for every proposal; an empty answer falls back to `default`.
    Prompt { default: ReviewAction },
}

/// Config values with the flags of one command applied on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub dry_run: bool,
    pub backup: bool,
    pub review: ReviewPolicy,
    pub fenced: bool,
}

impl Settings {
    pub fn resolve(config: &Config, command: &Command) -> Self {
        let mut settings = Settings {
            dry_run: config.apply.dry_run,
            backup: config.apply.backup,
            review: ReviewPolicy::Prompt {
                default: config.review.default_action,
            },
            fenced: config.prompt.fenced,
        };

        match command {
            Command::Apply { dry_run, no_backup, .. } => {
                settings.dry_run |= *dry_run;
                settings.backup &= !*no_backup;
            }
            Command::Review {
                accept_all,
                reject_all,
                ..
            } => {
                if *accept_all {
                    settings.review = ReviewPolicy::AcceptAll;
                } else if *reject_all {
                    settings.review = ReviewPolicy::RejectAll;
                }
            }
            Command::Prompt { unified, .. } => settings.fenced &= !*unified,
            Command::Parse { .. } => {}
        }

        settings
    }
}

const CONFIG_FILE_NAME: &str = "config.toml";

/// Reads the config named on the command line or the per-user default one.
/// A missing file is written out with the built-in defaults first.
pub fn load_config(args: &Args) -> Result<Config> {
    if args.ignore_config {
        return Ok(Config::default());
    }

    let path = args.config.clone().unwrap_or_else(default_config_path);
    match std::fs::read_to_string(&path) {
        Ok(content) => toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {:?}", path)),
        Err(e) if e.kind() == ErrorKind::NotFound => write_default_config(&path),
        Err(e) => Err(e).with_context(|| format!("Failed to read config file at {:?}", path)),
    }
}

fn write_default_config(path: &Path) -> Result<Config> {
    let config = Config::default();
    let body = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory at {:?}", dir))?;
    }
    std::fs::write(path, format!("# docpatch settings\n\n{}", body))
        .with_context(|| format!("Failed to write default config to {:?}", path))?;

    eprintln!("Created default config at {:?}", path);
    Ok(config)
}

fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "docpatch")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

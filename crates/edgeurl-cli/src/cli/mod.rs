//! CLI for the edgeurl CDN URL builder.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use edgeurl_core::config::{self, EdgeConfig};
use edgeurl_core::edge_url::{Fit, Gravity, Metadata, Variant};
use edgeurl_core::MediaType;
use std::path::{Path, PathBuf};

use commands::{run_batch_from_path, run_build, run_completions, run_config, run_man};

/// Top-level CLI for edgeurl.
#[derive(Debug, Parser)]
#[command(name = "edgeurl")]
#[command(about = "edgeurl: build CDN variant URLs for stored media", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// CDN base location; overrides the config file and EDGEURL_IMAGE_LOCATION.
    #[arg(long, global = true, value_name = "URL")]
    pub base_location: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Build the edge URL for one asset.
    Build(BuildArgs),

    /// Build edge URLs for JSON Lines requests read from a file or stdin.
    Batch {
        /// Path to a JSON Lines file; `-` or omitted reads stdin.
        path: Option<PathBuf>,
    },

    /// Show the config file location and effective settings.
    Config,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page (roff).
    Man,
}

/// Options of `edgeurl build`. Variant flags are emitted in declaration order,
/// followed by `--param` entries in the order given.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Stored asset key (URLs starting with http/blob are printed unchanged).
    pub src: String,

    /// Display name used to derive the filename.
    #[arg(long)]
    pub name: Option<String>,

    /// Media kind: image, video or audio.
    #[arg(long = "type", value_name = "KIND")]
    pub media_type: Option<MediaType>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// scale-down, contain, cover, crop or pad.
    #[arg(long)]
    pub fit: Option<Fit>,

    /// Blur radius (0-250).
    #[arg(long)]
    pub blur: Option<u16>,

    /// Quality (0-100).
    #[arg(long)]
    pub quality: Option<u8>,

    /// auto, side, left, right, top or bottom.
    #[arg(long)]
    pub gravity: Option<Gravity>,

    /// keep, copyright or none.
    #[arg(long)]
    pub metadata: Option<Metadata>,

    /// Background color.
    #[arg(long)]
    pub background: Option<String>,

    #[arg(long)]
    pub gamma: Option<f64>,

    #[arg(long)]
    pub optimized: bool,

    /// Request an animated variant.
    #[arg(long)]
    pub anim: bool,

    #[arg(long)]
    pub transcode: bool,

    /// Extra variant parameter as KEY=VALUE (repeatable).
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<Variant>,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Build(ref args) => {
                let cfg = load_config(cli.config.as_deref(), cli.base_location.clone())?;
                run_build(&cfg, args)?;
            }
            CliCommand::Batch { ref path } => {
                let cfg = load_config(cli.config.as_deref(), cli.base_location.clone())?;
                run_batch_from_path(&cfg, path.as_deref())?;
            }
            CliCommand::Config => {
                let cfg = load_config(cli.config.as_deref(), cli.base_location.clone())?;
                run_config(&cfg, cli.config.as_deref())?;
            }
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

/// Loads config from `path` (or the XDG default) and applies env and flag overrides.
pub(crate) fn load_config(path: Option<&Path>, base_location: Option<String>) -> Result<EdgeConfig> {
    let cfg = match path {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init().context("load config")?,
    };
    let cfg = cfg
        .with_env_overrides()
        .with_image_location_override(base_location);
    tracing::debug!("effective config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;

//! Command-line interface for the `feedbackhub` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::logging::Verbosity;

/// feedbackhub - file-backed feedback API and dashboard
#[derive(Debug, Parser)]
#[command(name = "feedbackhub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML configuration file (default: ./feedbackhub.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Open the desktop dashboard
    Gui(GuiArgs),

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// JSON file holding the feedback collection
    #[arg(long, value_name = "FILE")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Default, Args)]
pub struct GuiArgs {
    /// Base URL of the feedback API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

impl ServeArgs {
    /// Command-line flags win over file and environment settings.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(data_file) = &self.data_file {
            config.storage.data_file = data_file.clone();
        }
    }
}

impl GuiArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.gui.api_url = url.clone();
        }
    }
}

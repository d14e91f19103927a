//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// Share text end-to-end encrypted; the server only ever sees ciphertext.
#[derive(Debug, Parser)]
#[command(name = "pastectl", version, about)]
pub struct Cli {
    /// Use the local paste directory even when a server is configured.
    #[arg(long, global = true)]
    pub local: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt text and print a share link.
    Create(CreateArgs),
    /// Fetch and decrypt a paste from its share link.
    View(ViewArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Read the text from this file instead of stdin.
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Protect the paste with a password instead of a link key.
    #[arg(long, short)]
    pub password: bool,

    /// How long the paste stays available (e.g. `10m`, `2h`, `7days`).
    #[arg(long, short, default_value = "1day", value_parser = humantime::parse_duration)]
    pub expires: Duration,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Share link printed by `pastectl create`.
    pub link: String,
}

//! `pastectl`: command-line client for client-side-encrypted pastes.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from `PASTECTL_*` environment variables.
//! 3. Initialise logging on stderr.
//! 4. Open the paste store (remote server or local directory).
//! 5. Run the command, printing only its result to stdout.

mod cli;
mod commands;
mod config;
mod link;
mod prompt;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use paste_crypto::EncryptionService;

use cli::{Cli, Command};
use commands::NewPaste;
use crate::config::Config;
use link::ShareLink;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        eprintln!("ERROR: pastectl configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Store
    // -----------------------------------------------------------------------
    let store = commands::open_store(&cfg, cli.local).await?;
    let crypto = EncryptionService::new();
    let mut passwords = prompt::from_config(cfg.password.clone());

    // -----------------------------------------------------------------------
    // 5. Command
    // -----------------------------------------------------------------------
    match cli.command {
        Command::Create(args) => {
            let plaintext = commands::read_plaintext(args.file.as_deref()).await?;
            let new = NewPaste {
                plaintext,
                with_password: args.password,
                ttl: args.expires,
            };
            let url = commands::create(
                store.as_ref(),
                &crypto,
                passwords.as_mut(),
                &cfg.share_base()?,
                new,
            )
            .await?;
            println!("{url}");
        }
        Command::View(args) => {
            let link = ShareLink::parse(&args.link)?;
            let text = commands::view(store.as_ref(), &crypto, passwords.as_mut(), &link).await?;
            print!("{text}");
        }
    }

    Ok(())
}

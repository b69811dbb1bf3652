//! Pixkit Demo CLI
//!
//! Command-line interface for generating, inspecting and timing BR Code
//! payment payloads.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixkit_lib::PixConfig;
use std::path::{Path, PathBuf};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "pixkit-demo")]
#[command(about = "Pixkit Demo CLI - Generate and inspect Pix payment codes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file (can also be set via PIXKIT_CONFIG env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment code operations - generate and parse
    Qr {
        #[command(subcommand)]
        action: QrAction,
    },

    /// Recipient key operations
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Compute the CRC16 checksum of a text
    Crc {
        /// Text to checksum
        text: String,
    },
}

#[derive(Subcommand)]
enum QrAction {
    /// Build a payment code and display it as a QR code
    Generate {
        /// Recipient key (CPF, CNPJ, phone, e-mail or random key)
        #[arg(short, long, required_unless_present = "request")]
        key: Option<String>,

        /// Amount in BRL, e.g. 49.90 (omit to let the payer choose)
        #[arg(short, long)]
        amount: Option<String>,

        /// Merchant name
        #[arg(short, long)]
        name: Option<String>,

        /// Merchant city
        #[arg(short, long)]
        city: Option<String>,

        /// Transaction id (generated when omitted)
        #[arg(short, long)]
        txid: Option<String>,

        /// Message shown to the payer
        #[arg(short, long)]
        description: Option<String>,

        /// Minutes until the code expires
        #[arg(short, long)]
        expires: Option<u32>,

        /// Read the whole request from a JSON file instead of flags
        #[arg(long, conflicts_with = "key")]
        request: Option<PathBuf>,

        /// Keep running and show the expiration countdown
        #[arg(short, long)]
        watch: bool,

        /// With --watch, replace the code with a fresh one when it expires
        #[arg(long, requires = "watch")]
        auto_refresh: bool,

        /// Copy the payload text into this file
        #[arg(long)]
        copy_to: Option<PathBuf>,

        /// Print only the payload text
        #[arg(long)]
        raw: bool,
    },

    /// Parse and verify a copy-and-paste payment code
    Parse {
        /// Payload text
        payload: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Detect the type of a recipient key and show its canonical form
    Classify {
        /// Raw key as entered
        raw: String,
    },
}

fn load_config(path: Option<&Path>) -> Result<PixConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os("PIXKIT_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => return Ok(PixConfig::default()),
        },
    };

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = PixConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pixkit_demo_cli=debug,pixkit_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("pixkit_demo_cli=info,pixkit_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Qr { action } => match action {
            QrAction::Generate {
                key,
                amount,
                name,
                city,
                txid,
                description,
                expires,
                request,
                watch,
                auto_refresh,
                copy_to,
                raw,
            } => {
                let request = match request {
                    Some(path) => commands::qr::load_request(&path)?,
                    None => commands::qr::request_from_flags(commands::qr::RequestFlags {
                        key: key.unwrap_or_default(),
                        amount,
                        name,
                        city,
                        txid,
                        description,
                        expires,
                    })?,
                };
                let options = commands::qr::GenerateOptions {
                    watch,
                    auto_refresh,
                    copy_to,
                    raw,
                };
                commands::qr::generate(config, request, options, cli.verbose).await?;
            }
            QrAction::Parse { payload, json } => {
                commands::qr::parse(&payload, json, cli.verbose)?;
            }
        },
        Commands::Key { action } => match action {
            KeyAction::Classify { raw } => {
                commands::key::classify(&raw, cli.verbose)?;
            }
        },
        Commands::Crc { text } => {
            commands::crc::run(&text, cli.verbose)?;
        }
    }

    Ok(())
}

//! `euterpe-cli` — issue HTTP requests through the Euterpe client session.
//!
//! Commands:
//! - get: buffered GET, prints status and body
//! - post: buffered POST with an explicit content type
//! - stream: streaming GET, copies the body to stdout as it arrives

mod fetch;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use euterpe_http::{CancellationToken, SessionConfig, SessionProvider};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "euterpe-cli", version)]
struct Args {
    /// Optional session config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a URL and print the whole response.
    Get {
        url: String,
        /// Extra request header, e.g. "Accept: application/json"
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Pretty-print JSON bodies.
        #[arg(long)]
        json: bool,
    },
    /// POST a body and print the whole response.
    Post {
        url: String,
        #[arg(long, default_value = "application/json")]
        content_type: String,
        #[arg(long)]
        data: String,
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Stream a URL to stdout.
    Stream {
        url: String,
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Cancel the request after this many body bytes.
        #[arg(long)]
        max_bytes: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,euterpe_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = match args.config.as_ref() {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let provider = Arc::new(SessionProvider::new(config));

    match args.command {
        Command::Get { url, headers, json } => {
            let headers = fetch::parse_headers(&headers)?;
            fetch::buffered(provider, &url, headers, None, json, &mut io::stdout().lock())
        }
        Command::Post {
            url,
            content_type,
            data,
            headers,
            json,
        } => {
            let headers = fetch::parse_headers(&headers)?;
            let entity = Some((content_type, data));
            fetch::buffered(provider, &url, headers, entity, json, &mut io::stdout().lock())
        }
        Command::Stream {
            url,
            headers,
            max_bytes,
        } => {
            let headers = fetch::parse_headers(&headers)?;
            let cancel = CancellationToken::new();
            ctrlc::set_handler({
                let cancel = cancel.clone();
                move || cancel.cancel()
            })
            .context("install ctrl-c handler")?;
            fetch::stream(provider, &url, headers, max_bytes, cancel, &mut io::stdout().lock())
        }
    }
}

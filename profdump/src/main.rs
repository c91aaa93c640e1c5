//! # profdump - Main Entry Point
//!
//! Two modes:
//! - **Receiver** (`profdump serve`): accept OTLP/HTTP profile exports and
//!   print a report per submission
//! - **Offline** (`profdump render FILE...`): render captured export requests
//!   from disk

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::path::Path;

use profdump::cli::{Args, Command};
use profdump::config::RenderConfig;
use profdump::domain::{DecodeError, ServeError};
use profdump::report::{write_report, OutputFormat};
use profdump::server::{self, ServerState};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_DATAERR: i32 = 65;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<DecodeError>().is_some() {
        return EXIT_DATAERR;
    }
    match err.downcast_ref::<ServeError>() {
        Some(ServeError::Bind { source, .. }) if source.kind() == std::io::ErrorKind::PermissionDenied => EXIT_NOPERM,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.render.to_config();
    debug!("Render config: {config:?}");

    match args.command {
        Command::Serve { listen } => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(server::serve(listen, ServerState::new(config, args.format)))?;
        }
        Command::Render { files } => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for path in &files {
                render_file(path, &config, args.format, &mut out)?;
            }
            out.flush().context("Failed to write report")?;
        }
    }
    Ok(())
}

fn render_file(path: &Path, config: &RenderConfig, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let payload = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let request = profdump::decode_request(&payload).with_context(|| format!("Failed to decode {}", path.display()))?;
    let report = profdump::render(&request, config).with_context(|| format!("Failed to render {}", path.display()))?;
    info!("{}: {} profile(s), {} sample(s)", path.display(), report.profiles().count(), report.samples().count());

    write_report(&report, format, out).context("Failed to write report")
}

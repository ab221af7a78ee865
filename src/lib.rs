//! NatureID: species identification from a photo.
//!
//! The library wires together the domains; the binary is a thin shell
//! over [`run`]. No business logic lives here, only module declarations
//! and startup.
//!
//! Domains:
//!   - llm         : prompt wrapper, provider clients, output schema
//!   - pipeline    : the identifier orchestrator (session state machine)
//!   - favorites   : persisted saved results + their images
//!   - capture     : image files, data URIs, camera sessions
//!   - geolocation : one-shot position lookup
//!   - report      : plain-text rendering of results
//!   - settings    : env/keychain configuration
//!   - cli         : clap subcommands

pub mod capture;
mod cli;
pub mod error;
pub mod favorites;
pub mod geolocation;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod settings;

use clap::Parser;
use std::process::ExitCode;

/// Entry point: called by the `natureid` binary.
pub fn run() -> ExitCode {
    settings::load_env_files();
    env_logger::init();

    let args = cli::Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("NatureID starting up");
    runtime.block_on(cli::dispatch(args))
}

//! # Britannia Headless Client
//!
//! Bootstraps the client against a local install and runs frames without a
//! window. Device commands are validated and counted, not drawn.
//!
//! ```bash
//! # Use the stored install, run 600 frames
//! britannia_client --frames 600
//!
//! # Override the install directory
//! britannia_client --data-dir "/games/Ultima Online Classic"
//!
//! # More logging
//! RUST_LOG=britannia=debug britannia_client
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use britannia::{Capabilities, ConsolePrompt, GameClient, IdleEngine, SystemClock};
use britannia_core::{SettingsStore, TomlSettingsStore, APPLICATION_NAME};
use britannia_networking::OfflineNetworkClient;
use britannia_rendering::HeadlessDevice;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Frames run when `--frames` is not given.
const DEFAULT_FRAMES: u64 = 300;

#[derive(Debug, Default)]
struct Args {
    data_dir: Option<PathBuf>,
    frames: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data-dir" => {
                let value = iter.next().ok_or("--data-dir needs a path")?;
                args.data_dir = Some(PathBuf::from(value));
            }
            "--frames" => {
                let value = iter.next().ok_or("--frames needs a number")?;
                let frames = value
                    .parse()
                    .map_err(|_| format!("--frames: '{value}' is not a number"))?;
                args.frames = Some(frames);
            }
            "--help" | "-h" => {
                return Err(String::from(
                    "usage: britannia_client [--data-dir <path>] [--frames <n>]",
                ));
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(args)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let store = match TomlSettingsStore::for_application(APPLICATION_NAME) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "no settings location");
            return ExitCode::FAILURE;
        }
    };
    info!(settings = %store.path().display(), "britannia client starting");

    let (width, height) = match store.load() {
        Ok(settings) => (settings.display.width, settings.display.height),
        Err(e) => {
            error!(error = %e, "settings unreadable");
            return ExitCode::FAILURE;
        }
    };

    let device = HeadlessDevice::new(width, height).without_recording();
    let mut client = GameClient::new(IdleEngine::new(), OfflineNetworkClient::new(), device);

    let mut capabilities = Capabilities::new(ConsolePrompt::stdio(), store);
    capabilities.data_directory = args.data_dir;

    if let Err(e) = client.bootstrap(capabilities) {
        error!(error = %e, state = ?client.state(), "client could not start");
        return ExitCode::FAILURE;
    }

    let frames = args.frames.unwrap_or(DEFAULT_FRAMES);
    let result = client.run(&mut SystemClock::new(), Some(frames));
    client.shutdown();

    match result {
        Ok(ran) => {
            info!(
                frames = ran,
                presented = client.scheduler().device().frames_presented(),
                "run finished"
            );
            println!("{}", client.scheduler().stats());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "frame loop failed");
            ExitCode::FAILURE
        }
    }
}

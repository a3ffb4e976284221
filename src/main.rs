//! outloud - play a file on a chosen output device
//!
//! Lists devices, resolves a device by partial name and plays a WAV or MP3
//! through stream or overlap mode, optionally deleting it afterwards.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outloud_lib::playback::{PlaybackEngine, PlaybackMode, PlaybackOutcome};
use outloud_lib::settings::PlayerSettings;

#[derive(Parser, Debug)]
#[command(name = "outloud")]
#[command(about = "Audio output manager")]
#[command(version)]
struct Args {
    /// Directory holding settings.json
    #[arg(long, env = "OUTLOUD_SETTINGS_DIR")]
    settings_dir: Option<PathBuf>,

    /// Part of the output device name, e.g. MIXLINE
    #[arg(short, long, env = "OUTLOUD_DEVICE")]
    device: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List output and input devices, and the device --device resolves to
    Devices,

    /// Play an audio file
    Play {
        path: PathBuf,

        /// Return as soon as playback starts
        #[arg(long)]
        no_wait: bool,

        /// Delete the file once it has played
        #[arg(long)]
        delete: bool,

        /// Play as an overlapping one-shot voice instead of the exclusive stream
        #[arg(long)]
        overlap: bool,

        /// Exit with an error if the file could not be deleted
        #[arg(long, requires = "delete")]
        strict: bool,
    },

    /// Write the current settings (with --device applied) to settings.json
    SaveSettings,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outloud=info,outloud_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut settings = match &args.settings_dir {
        Some(dir) => PlayerSettings::load(dir).context("Failed to load settings")?,
        None => PlayerSettings::default(),
    };
    if args.device.is_some() {
        settings.output.device_name = args.device.clone();
    }

    match args.command {
        Command::Devices => {
            let engine = PlaybackEngine::with_default_output(settings.output.device_name.as_deref());
            // Logs each device; a host without enumeration only warns
            engine.list_devices();

            if let Some(requested) = engine.selection().requested() {
                match engine.resolved_device() {
                    Some(device) => println!("\n'{}' resolves to: {}", requested, device),
                    None => println!("\n'{}' matches no output device", requested),
                }
            }
        }
        Command::Play {
            path,
            no_wait,
            delete,
            overlap,
            strict,
        } => {
            let engine = PlaybackEngine::with_default_output(settings.output.device_name.as_deref());

            let mut request = settings.playback.request(&path);
            if no_wait {
                request = request.wait(false);
            }
            if delete {
                request = request.delete(true);
            }
            if overlap {
                request = request.mode(PlaybackMode::Overlap);
            }

            let outcome = engine
                .play(&request)
                .with_context(|| format!("Failed to play {:?}", path))?;
            let outcome = if strict { outcome.ensure_deleted()? } else { outcome };

            if outcome == PlaybackOutcome::Started {
                // The output closes when the engine drops, so stay alive
                // until the user is done listening
                info!("Playing without waiting, press Enter to stop");
                let mut line = String::new();
                std::io::stdin().read_line(&mut line)?;
            }
            info!(?outcome, "Done");
        }
        Command::SaveSettings => {
            let dir = args
                .settings_dir
                .context("--settings-dir is required to save settings")?;
            settings.save(&dir).context("Failed to save settings")?;
        }
    }

    Ok(())
}

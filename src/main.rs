//! Launchpad Modes - simulator for the grid controller mode selector
//!
//! Drives the mode selector against an in-memory host from a REPL, with
//! hot-reloaded configuration.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use launchpad_modes::cli::{self, ReplCommand};
use launchpad_modes::config::ConfigWatcher;
use launchpad_modes::paths::AppPaths;
use launchpad_modes::selector::{Dispatch, ModeSelector};
use launchpad_modes::sim::{self, SimMixerModes, SimOverview, SimSelector, SimSession, SimSong};
use launchpad_modes::surface::{ButtonEvent, Control, SurfaceShape};

/// How long a `tap` keeps the button down
const TAP_DURATION: Duration = Duration::from_millis(50);

/// Launchpad Modes - session, mixer and user mode routing for 8x8 grid controllers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "LAUNCHPAD_MODES_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write JSON logs to the logs directory (rotated daily)
    #[arg(long)]
    log_file: bool,

    /// Run commands (separated by ';') instead of the REPL, then exit
    #[arg(short, long)]
    exec: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut paths = AppPaths::detect();
    if let Some(config) = &args.config {
        paths = paths.with_config(config);
    }
    paths.ensure().await?;

    let _log_guard = init_logging(
        &args.log_level,
        args.log_file.then_some(paths.logs_dir.as_path()),
    )?;

    info!("Starting Launchpad Modes v{}...", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", paths.config.display());

    let (config_watcher, config) = ConfigWatcher::new(&paths.config).await?;

    let song = SimSong::demo(config.session.tracks, config.session.scenes);
    let session = SimSession::new(config.session.tracks, config.session.scenes);
    let mut selector = ModeSelector::new(
        SurfaceShape::LAUNCHPAD,
        session,
        SimOverview::new(),
        SimMixerModes::new(),
        config,
    )
    .context("Controller layout rejected")?;
    flush_leds(&mut selector);

    if let Some(script) = &args.exec {
        return run_script(selector, song, script);
    }

    run_app(selector, song, config_watcher, shutdown_signal()).await?;

    info!("Launchpad Modes shutdown complete");
    Ok(())
}

/// Execute `;`-separated commands against a fresh selector
fn run_script(mut selector: SimSelector, mut song: SimSong, script: &str) -> Result<()> {
    for line in script.split(';') {
        let Some(command) = cli::parse_command(line)? else {
            continue;
        };
        if !apply_command(&mut selector, &mut song, command)? {
            break;
        }
    }
    selector.disconnect();
    flush_leds(&mut selector);
    Ok(())
}

async fn run_app(
    mut selector: SimSelector,
    mut song: SimSong,
    mut config_watcher: ConfigWatcher,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _repl = cli::spawn_repl(tx);

    println!("{}", sim::render(&selector, &song));
    println!("Type 'help' for commands");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else {
                    break;
                };
                match apply_command(&mut selector, &mut song, command) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => warn!("⚠️  Command failed: {:#}", e),
                }
            }

            Some(update) = config_watcher.next_config() => {
                debug!("Applying config change {:?}", update.change);
                selector.reconfigure(update.config);
                flush_leds(&mut selector);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    info!("Shutting down...");
    selector.disconnect();
    flush_leds(&mut selector);

    Ok(())
}

/// Apply one REPL command. Returns false when the session should end.
fn apply_command(selector: &mut SimSelector, song: &mut SimSong, command: ReplCommand) -> Result<bool> {
    let now = Instant::now();

    match command {
        ReplCommand::Press(control) => send(selector, song, control, 127, now)?,
        ReplCommand::Release(control) => send(selector, song, control, 0, now)?,
        ReplCommand::Tap(control) => {
            send(selector, song, control, 127, now)?;
            send(selector, song, control, 0, now + TAP_DURATION)?;
        }
        ReplCommand::Hold(control) => {
            let held = selector.gestures().threshold();
            send(selector, song, control, 127, now)?;
            send(selector, song, control, 0, now + held)?;
        }
        ReplCommand::Mode(mode) => selector.set_mode(mode),
        ReplCommand::Show => {}
        ReplCommand::State => {
            println!("{}", sim::Snapshot::capture(selector, song).to_json()?);
            return Ok(true);
        }
        ReplCommand::Disconnect => selector.disconnect(),
        ReplCommand::Help => {
            println!("{}", cli::HELP);
            return Ok(true);
        }
        ReplCommand::Quit => return Ok(false),
    }

    flush_leds(selector);
    println!("{}", sim::render(selector, song));
    Ok(true)
}

fn send(
    selector: &mut SimSelector,
    song: &mut SimSong,
    control: Control,
    value: u8,
    at: Instant,
) -> Result<()> {
    let button = selector
        .surface()
        .id_of(control)
        .with_context(|| format!("No button for {:?}", control))?;

    let outcome = selector.handle_event(ButtonEvent::new(button, value, at), song);
    println!(
        "[{}] {:?} value={} → {}",
        chrono::Local::now().format("%H:%M:%S%.3f"),
        control,
        value,
        describe(outcome)
    );
    Ok(())
}

fn describe(outcome: Dispatch) -> String {
    match outcome {
        Dispatch::Handled => "handled".to_string(),
        Dispatch::Forwarded => "mixer sub-mode".to_string(),
        Dispatch::Released(_) => "released (no owner in this mode)".to_string(),
        Dispatch::Ignored => "ignored".to_string(),
    }
}

/// Drain queued LED messages; the simulator only logs them
fn flush_leds(selector: &mut SimSelector) {
    let sent = selector.surface_mut().drain_output();
    if sent.is_empty() {
        return;
    }
    debug!("💡 {} LED update(s)", sent.len());
    for message in &sent {
        trace!(
            "LED {:?} ch={} value={}",
            message.button,
            message.channel,
            message.value
        );
    }
}

fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "launchpad-modes.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

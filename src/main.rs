//! Notch Touch CLI
//!
//! Drives the controller against the simulated platform.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use notch_touch::{
    config::Config,
    core::{NotchService, PressDelays, TapTiming},
    platform::{PlatformCall, SimulatedPlatform},
    runtime::{load_script, read_events, replay, run_event_loop},
    stats::create_shared_log,
    GESTURE_CARD, VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notch-touch")]
#[command(version = VERSION)]
#[command(about = "Tap, double-tap and torch controls on the display cutout", long_about = None)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read JSON-lines events from stdin and react in real time
    Listen,

    /// Replay a JSON-lines script on a virtual clock
    Replay {
        /// Script file
        script: PathBuf,
    },

    /// Show the hold delays derived from the timing settings
    Timeouts {
        /// Long-press timeout override in milliseconds
        #[arg(long)]
        long_press: Option<u64>,

        /// Double-tap timeout override in milliseconds
        #[arg(long)]
        double_tap: Option<u64>,
    },

    /// Display the gesture reference card
    Gestures,

    /// Show configuration
    Config {
        /// Write the default configuration if no file exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Listen => cmd_listen(load_config(cli.config.as_deref())?),
        Commands::Replay { script } => cmd_replay(load_config(cli.config.as_deref())?, &script),
        Commands::Timeouts {
            long_press,
            double_tap,
        } => {
            cmd_timeouts(load_config(cli.config.as_deref())?, long_press, double_tap);
            Ok(())
        }
        Commands::Gestures => {
            println!("{GESTURE_CARD}");
            Ok(())
        }
        Commands::Config { init } => cmd_config(cli.config.as_deref(), init),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            Config::default()
        })),
    }
}

fn cmd_listen(config: Config) -> anyhow::Result<()> {
    println!("Notch Touch v{VERSION}");
    println!();
    println!("Reading events from stdin, one JSON object per line.");
    println!("Press Ctrl+C to stop");
    println!();

    let (tx, rx) = unbounded();
    let platform = SimulatedPlatform::new(config.simulation.clone()).with_ack_sender(tx.clone());
    let activity = create_shared_log();
    let mut service = NotchService::new(platform, &config).with_activity(activity.clone());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    thread::spawn(move || read_events(std::io::stdin().lock(), &tx));

    service.on_connect();
    run_event_loop(&mut service, &rx, &running);
    service.on_disconnect();

    println!();
    println!("{}", activity.summary());
    Ok(())
}

fn cmd_replay(config: Config, script: &Path) -> anyhow::Result<()> {
    let lines = load_script(script)
        .with_context(|| format!("Failed to load script {}", script.display()))?;
    let report = replay(&config, &lines);

    println!("Replay of {} ({} events)", script.display(), lines.len());
    println!();
    for step in &report.steps {
        println!("{:>8} ms  {}", step.at_ms, describe(&step.call));
    }
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&report.stats).context("Failed to format statistics")?
    );
    Ok(())
}

fn cmd_timeouts(config: Config, long_press: Option<u64>, double_tap: Option<u64>) {
    let long_press_ms = long_press.unwrap_or(config.timing.long_press_timeout.as_millis() as u64);
    let double_tap_ms = double_tap.unwrap_or(config.timing.double_tap_timeout.as_millis() as u64);
    let delays = PressDelays::from_timeouts(long_press_ms, double_tap_ms);
    let taps = TapTiming::from(&config.timing);

    println!("Hold Delays");
    println!("===========");
    println!();
    println!("  Long-press timeout:   {long_press_ms} ms");
    println!("  Double-tap timeout:   {double_tap_ms} ms");
    println!();
    println!("  Torch off -> on:      {} ms", delays.switch_on_ms);
    println!("  Torch on -> off:      {} ms", delays.switch_off_ms);
    println!();
    println!("  Double-tap min gap:   {} ms", taps.double_tap_min_time_ms);
    println!("  Touch slop:           {} px", taps.touch_slop);
    println!("  Double-tap slop:      {} px", taps.double_tap_slop);
}

fn cmd_config(custom: Option<&Path>, init: bool) -> anyhow::Result<()> {
    let path = custom.map(Path::to_path_buf).unwrap_or_else(Config::config_path);

    if init && !path.exists() {
        let defaults = Config::default();
        match custom {
            Some(path) => defaults.save_to(path),
            None => defaults.save(),
        }
        .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote default configuration");
    }

    let config = if path.exists() {
        Config::load_from(&path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::default()
    };

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", path);
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("Failed to format configuration")?
    );
    Ok(())
}

fn describe(call: &PlatformCall) -> String {
    match call {
        PlatformCall::AddSurface(params) => format!("add overlay {:?}", params.bounds),
        PlatformCall::UpdateSurface(params) => format!("move overlay {:?}", params.bounds),
        PlatformCall::RemoveSurface => "remove overlay".to_string(),
        PlatformCall::SetTorchMode {
            entry,
            camera_id,
            enabled,
            level,
        } => format!(
            "torch {} on camera {camera_id} via {entry:?} (level {level})",
            if *enabled { "on" } else { "off" }
        ),
        PlatformCall::RegisterTorchCallback => "register torch callback".to_string(),
        PlatformCall::UnregisterTorchCallback => "unregister torch callback".to_string(),
        PlatformCall::HeavyClick => "haptic heavy click".to_string(),
        PlatformCall::NudgeVolume => "show volume UI".to_string(),
        PlatformCall::LockScreen => "lock screen".to_string(),
        PlatformCall::Subscribe(path) => format!("subscribe {path:?} notifications"),
        PlatformCall::Unsubscribe(path) => format!("unsubscribe {path:?} notifications"),
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{Backend, BusKind, Config, LoggingConfig};
use crate::daemon::BacklightDaemon;
use crate::device::{DeviceClass, Directory};

#[macro_use]
extern crate tracing;

mod brightness;
#[cfg(feature = "frame-capture")]
mod capture;
mod config;
mod daemon;
mod device;
mod error;
mod interface;
#[cfg(test)]
mod testing;

#[derive(Parser, Debug)]
#[command(name = "clightd")]
#[command(author, version, about = "Backlight and webcam brightness D-Bus service", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/clightd/config.toml, then /etc/clightd/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Register on the session bus instead of the system bus
    #[arg(long, global = true)]
    session: bool,

    /// Walk this sysfs tree instead of asking udev
    #[arg(long, global = true, value_name = "PATH")]
    sysfs_root: Option<PathBuf>,

    /// Do not expose captureframes
    #[arg(long, global = true)]
    no_capture: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Serve the D-Bus interface (default)
    Serve,

    /// List devices of a class in enumeration order
    List {
        #[arg(value_enum, default_value_t = DeviceClass::Backlight)]
        class: DeviceClass,
    },
}

impl Cli {
    /// Command line flags take precedence over the config file
    fn apply_overrides(&self, config: &mut Config) {
        if self.session {
            config.bus = BusKind::Session;
        }
        if let Some(root) = &self.sysfs_root {
            config.backend = Backend::Sysfs;
            config.sysfs_root = root.clone();
        }
        if self.no_capture {
            config.capture.enabled = false;
        }
    }
}

fn setup_logs(logging: &LoggingConfig, verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { logging.level.as_str() };
    let default_filter = format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level);

    let filter_layer = if verbose {
        EnvFilter::new(default_filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };
    let fmt_layer = fmt::layer().with_target(false);
    let journal_layer = if logging.journald {
        tracing_journald::layer().ok()
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(journal_layer)
        .init();
}

fn list(directory: &Directory, class: DeviceClass) -> anyhow::Result<()> {
    let devices = directory
        .enumerate(class)
        .with_context(|| format!("Failed to enumerate {} devices", class))?;

    if devices.is_empty() {
        println!("No {} devices found", class);
        return Ok(());
    }

    for device in devices {
        match class {
            DeviceClass::Backlight => {
                let attr = |name: &str| device.attribute(name).unwrap_or_else(|| "?".to_string());
                println!(
                    "{}\tbrightness={} max_brightness={} actual_brightness={}",
                    device.name(),
                    attr(brightness::BRIGHTNESS),
                    attr(brightness::MAX_BRIGHTNESS),
                    attr(brightness::ACTUAL_BRIGHTNESS)
                );
            }
            DeviceClass::Video => {
                let devnode = device
                    .devnode()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}", device.name(), devnode);
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = Config::locate(cli.config.as_deref());
    let mut config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    setup_logs(&config.logging, cli.verbose);
    match &config_path {
        Some(path) => info!("Using configuration from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting clightd {}", env!("CARGO_PKG_VERSION"));
            BacklightDaemon::new(config).run().await?;
        }
        Commands::List { class } => {
            list(&Directory::from_config(&config), class)?;
        }
    }

    Ok(())
}

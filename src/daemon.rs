// SPDX-License-Identifier: GPL-3.0-only
//! Bus service lifecycle
//!
//! Connects to the configured bus, registers the interface object, takes the
//! well-known name and then serves calls until SIGINT or SIGTERM. Any failure
//! before serving starts is fatal.

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use zbus::connection::Builder;

use crate::config::{BusKind, Config};
use crate::device::Directory;
#[cfg(feature = "frame-capture")]
use crate::interface::CaptureBacklightInterface;
use crate::interface::{BUS_NAME, BacklightInterface, OBJECT_PATH};

pub struct BacklightDaemon {
    config: Config,
}

impl BacklightDaemon {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let directory = Directory::from_config(&self.config);
        info!("Resolving devices through {:?}", directory);

        let builder = match self.config.bus {
            BusKind::System => Builder::system(),
            BusKind::Session => Builder::session(),
        }
        .context("Failed to connect to D-Bus")?;

        let builder = serve(builder, &self.config, directory)
            .with_context(|| format!("Failed to register object {}", OBJECT_PATH))?;

        let connection = builder
            .name(BUS_NAME)
            .context("Invalid bus name")?
            .build()
            .await
            .with_context(|| {
                format!(
                    "Failed to acquire service name {} on the {:?} bus",
                    BUS_NAME, self.config.bus
                )
            })?;

        info!(
            "Serving {} at {} on the {:?} bus",
            BUS_NAME, OBJECT_PATH, self.config.bus
        );

        wait_for_shutdown().await?;

        drop(connection);
        info!("Bus connection closed");
        Ok(())
    }
}

#[cfg(feature = "frame-capture")]
fn serve<'a>(builder: Builder<'a>, config: &Config, directory: Directory) -> zbus::Result<Builder<'a>> {
    use crate::capture::{FrameSampler, V4lFrameSource};

    if config.capture_enabled() {
        info!("Frame capture enabled");
        let sampler = FrameSampler::new(Box::new(V4lFrameSource::new(&config.capture)));
        builder.serve_at(OBJECT_PATH, CaptureBacklightInterface::new(directory, sampler))
    } else {
        info!("Frame capture disabled by configuration");
        builder.serve_at(OBJECT_PATH, BacklightInterface::new(directory))
    }
}

#[cfg(not(feature = "frame-capture"))]
fn serve<'a>(builder: Builder<'a>, _config: &Config, directory: Directory) -> zbus::Result<Builder<'a>> {
    info!("Built without frame capture support");
    builder.serve_at(OBJECT_PATH, BacklightInterface::new(directory))
}

async fn wait_for_shutdown() -> Result<()> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    tokio::select! {
        _ = terminate.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for SIGINT")?;
            info!("Received SIGINT, shutting down");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::os::unix::net::UnixStream;

    use zbus::{Connection, Guid};

    use super::*;
    use crate::testing::FakeSysfs;

    const INTROSPECTABLE: &str = "org.freedesktop.DBus.Introspectable";

    /// Serves the interface chosen for `config` on one end of a socket pair
    async fn peer_pair(config: &Config, directory: Directory) -> (Connection, Connection) {
        let (server, client) = UnixStream::pair().unwrap();
        let server = Builder::unix_stream(server)
            .server(Guid::generate())
            .unwrap()
            .p2p();
        let server = serve(server, config, directory).unwrap();

        tokio::try_join!(server.build(), Builder::unix_stream(client).p2p().build()).unwrap()
    }

    async fn introspect(client: &Connection) -> String {
        let reply = client
            .call_method(None::<&str>, OBJECT_PATH, Some(INTROSPECTABLE), "Introspect", &())
            .await
            .unwrap();
        reply.body().deserialize::<String>().unwrap()
    }

    fn exposes(xml: &str, method: &str) -> bool {
        xml.contains(&format!("name=\"{method}\""))
    }

    #[tokio::test]
    async fn test_capture_disabled_hides_captureframes() {
        let sysfs = FakeSysfs::new();
        let mut config = Config::default();
        config.capture.enabled = false;

        let (_server, client) = peer_pair(&config, sysfs.directory()).await;
        let xml = introspect(&client).await;

        assert!(xml.contains(BUS_NAME));
        for method in [
            "setbrightness",
            "getbrightness",
            "getmaxbrightness",
            "getactualbrightness",
        ] {
            assert!(exposes(&xml, method), "{method} missing");
        }
        assert!(!exposes(&xml, "captureframes"));
    }

    #[tokio::test]
    async fn test_default_config_follows_build_features() {
        let sysfs = FakeSysfs::new();
        let config = Config::default();

        let (_server, client) = peer_pair(&config, sysfs.directory()).await;
        let xml = introspect(&client).await;

        assert!(exposes(&xml, "setbrightness"));
        assert_eq!(exposes(&xml, "captureframes"), cfg!(feature = "frame-capture"));
        assert_eq!(exposes(&xml, "captureframes"), config.capture_enabled());
    }

    #[tokio::test]
    async fn test_setbrightness_errors_cross_the_bus() {
        let sysfs = FakeSysfs::new();
        sysfs.add_backlight("intel_backlight", 50, 100, 50);
        let (_server, client) = peer_pair(&Config::default(), sysfs.directory()).await;

        let err = client
            .call_method(
                None::<&str>,
                OBJECT_PATH,
                Some(BUS_NAME),
                "setbrightness",
                &("intel_backlight", 120i32),
            )
            .await
            .unwrap_err();
        match err {
            zbus::Error::MethodError(name, description, _) => {
                assert_eq!(name.as_str(), "org.freedesktop.DBus.Error.InvalidArgs");
                assert!(description.is_some_and(|d| d.contains("100")));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(sysfs.read_attribute("intel_backlight", "brightness"), "50");

        let reply = client
            .call_method(
                None::<&str>,
                OBJECT_PATH,
                Some(BUS_NAME),
                "setbrightness",
                &("", 80i32),
            )
            .await
            .unwrap();
        assert_eq!(reply.body().deserialize::<i32>().unwrap(), 80);
        assert_eq!(sysfs.read_attribute("intel_backlight", "brightness"), "80");
    }
}

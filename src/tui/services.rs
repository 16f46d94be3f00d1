use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{ApiClient, Result};
use crate::config::AppConfig;
use crate::core::poller::{PollEvent, PollerConfig};

use super::events::{notify, AppEvent, NotificationLevel};

/// Centralized handle to backend services.
///
/// Created once at startup, then passed by reference to views. The API
/// client is shared behind an `Arc` so spawned tasks can own a handle.
pub struct Services {
    pub api: Arc<ApiClient>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Sink for status poller events; the app loop drains the other end.
    pub poll_tx: mpsc::UnboundedSender<PollEvent>,
    poller: PollerConfig,
}

impl Services {
    /// Initialize services from config.
    ///
    /// Failure here is fatal — the TUI cannot run without an API client.
    pub fn init(
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        poll_tx: mpsc::UnboundedSender<PollEvent>,
    ) -> Result<Self> {
        let api = Arc::new(ApiClient::new(
            &config.server.base_url,
            config.request_timeout(),
        )?);
        log::info!("API client initialized for {}", config.server.base_url);

        Ok(Self {
            api,
            event_tx,
            poll_tx,
            poller: PollerConfig {
                interval: config.poll_interval(),
                horizon: config.poll_horizon(),
            },
        })
    }

    pub fn poller_config(&self) -> PollerConfig {
        self.poller
    }

    /// Push a notification onto the event loop.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        notify(&self.event_tx, level, message);
    }
}

use crate::aggregator::{collect, RunResult};
use crate::config::HarnessConfig;
use crate::coordinator::error::CoordinatorResult;
use crate::scheduler::{launch, raise_fd_limit};
use crate::session::{Connector, TcpConnector};
use std::sync::Arc;
use tracing::{info, warn};

/// Descriptors kept free for stdio, the metrics listener and the runtime
const FD_HEADROOM: u64 = 64;

/// Runs one full stress run: limit setup, throttled launch, collection
pub struct StressCoordinator<C: Connector = TcpConnector> {
    config: HarnessConfig,
    connector: Arc<C>,
}

impl StressCoordinator<TcpConnector> {
    pub fn new(config: HarnessConfig) -> CoordinatorResult<Self> {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> StressCoordinator<C> {
    pub fn with_connector(config: HarnessConfig, connector: C) -> CoordinatorResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            connector: Arc::new(connector),
        })
    }

    /// Raise the open-file limit so every session can hold its socket.
    ///
    /// Never fails the run: if the limit stays too low, the excess sessions
    /// surface as ordinary connection failures.
    pub fn prepare_limits(&self) -> Option<u64> {
        let configured = self.config.fd_limit?;
        let needed = self.config.clients as u64 + FD_HEADROOM;
        let wanted = configured.max(needed);

        match raise_fd_limit(wanted) {
            Ok(effective) => {
                if effective < needed {
                    warn!(
                        "Open-file limit is {} but {} clients need about {}; expect connection failures",
                        effective, self.config.clients, needed
                    );
                } else {
                    info!("Open-file limit: {}", effective);
                }
                Some(effective)
            }
            Err(e) => {
                warn!("Could not raise open-file limit: {}", e);
                None
            }
        }
    }

    pub async fn run(&self) -> CoordinatorResult<RunResult> {
        self.prepare_limits();

        let settings = self.config.launch_settings();
        let params = Arc::new(self.config.session_params());

        info!(
            "Starting {} {:?} clients against {} ({} per batch, {:?} apart, {:?} each)...",
            settings.total,
            self.config.script,
            self.config.target,
            settings.batch_size,
            settings.batch_delay,
            settings.duration
        );

        let handles = launch(self.connector.clone(), params, &settings).await?;
        let result = collect(handles).await;

        info!("{}", result);
        Ok(result)
    }
}

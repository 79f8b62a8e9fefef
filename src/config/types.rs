use crate::config::error::{ConfigError, ConfigResult};
use crate::protocol::{CommandTable, MoveConfig};
use crate::scheduler::LaunchSettings;
use crate::session::{Script, ScriptKind, SessionParams};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Full configuration of one stress run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Game server address, `host:port`
    pub target: String,
    pub clients: usize,
    pub duration_secs: f64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_in_flight: Option<usize>,
    /// Open-file limit to request before launching; `None` skips the step
    pub fd_limit: Option<u64>,
    pub script: ScriptKind,
    /// Defaults to the script's own prefix when unset
    pub username_prefix: Option<String>,
    pub password: String,
    pub verbose_sessions: usize,
    pub commands: CommandTable,
    pub moves: MoveConfig,
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target: "127.0.0.1:8080".to_string(),
            clients: 2000,
            duration_secs: 5.0,
            batch_size: 200,
            batch_delay_ms: 100,
            max_in_flight: None,
            fd_limit: Some(10_000),
            script: ScriptKind::default(),
            username_prefix: None,
            password: "password".to_string(),
            verbose_sessions: 5,
            commands: CommandTable::default(),
            moves: MoveConfig::default(),
            metrics_addr: None,
        }
    }
}

impl HarnessConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.target.trim().is_empty() {
            return Err(ConfigError::Invalid("target address is empty".into()));
        }
        if self.clients == 0 {
            return Err(ConfigError::Invalid("clients must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.max_in_flight == Some(0) {
            return Err(ConfigError::Invalid("max_in_flight must be at least 1".into()));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "duration_secs must be a non-negative number, got {}",
                self.duration_secs
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs).unwrap_or_default()
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn session_params(&self) -> SessionParams {
        let username_prefix = self
            .username_prefix
            .clone()
            .unwrap_or_else(|| self.script.default_username_prefix().to_string());

        SessionParams {
            target: self.target.clone(),
            script: Script::from(self.script),
            commands: self.commands.clone(),
            moves: self.moves,
            username_prefix,
            password: self.password.clone(),
            verbose_sessions: self.verbose_sessions,
        }
    }

    pub fn launch_settings(&self) -> LaunchSettings {
        LaunchSettings {
            total: self.clients,
            batch_size: self.batch_size,
            batch_delay: self.batch_delay(),
            duration: self.duration(),
            max_in_flight: self.max_in_flight,
        }
    }
}

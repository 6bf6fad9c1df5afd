//! Telemetry configuration and subscriber initialization.

use crate::logger::Severity;
use crate::{TelemetryError, TelemetryResult};
use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static ACTIVE_FLOOR: OnceLock<Severity> = OnceLock::new();

/// Returns the severity floor installed by [`init_telemetry`].
///
/// Before initialization this is [`Severity::Debug`], the development
/// default, so nothing is suppressed in tests.
pub(crate) fn severity_floor() -> Severity {
    ACTIVE_FLOOR.get().copied().unwrap_or(Severity::Debug)
}

/// Process-wide telemetry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Whether a tracing subscriber is installed at all.
    pub enabled: bool,
    /// Records below this severity are dropped. Errors always pass.
    pub severity_floor: Severity,
    /// Emit records as JSON lines instead of human-readable output.
    pub json_format: bool,
    /// Service name attached to emitted output.
    pub service_name: String,
}

impl TelemetryConfig {
    /// Development profile: everything emitted, human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            severity_floor: Severity::Debug,
            json_format: false,
            service_name: "meander".to_owned(),
        }
    }

    /// Production profile: warnings and errors only, JSON lines.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            severity_floor: Severity::Warn,
            json_format: true,
            service_name: "meander".to_owned(),
        }
    }

    /// Builds a config from `MEANDER_ENV` and `MEANDER_LOG`.
    ///
    /// `MEANDER_ENV=production` selects the production profile; anything
    /// else selects development. `MEANDER_LOG`, when set, overrides the
    /// severity floor.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfig`] when `MEANDER_LOG` does
    /// not name a severity.
    pub fn from_env() -> TelemetryResult<Self> {
        let mut config = match std::env::var("MEANDER_ENV").as_deref() {
            Ok("production") => Self::production(),
            _ => Self::development(),
        };
        if let Ok(level) = std::env::var("MEANDER_LOG") {
            config.severity_floor = level.parse()?;
        }
        Ok(config)
    }

    /// Sets whether telemetry is enabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the severity floor.
    #[must_use]
    pub fn with_severity_floor(mut self, floor: Severity) -> Self {
        self.severity_floor = floor;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_json_format(mut self, json: bool) -> Self {
        self.json_format = json;
        self
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// Installs the global tracing subscriber and severity floor.
///
/// Call once at process start. A second call fails because the global
/// subscriber is already set.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] when the filter cannot be
/// built or a subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_new(config.severity_floor.as_str())
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    if config.json_format {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false);
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let layer = tracing_subscriber::fmt::layer().pretty().with_target(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    ACTIVE_FLOOR.set(config.severity_floor).ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_profile() {
        let config = TelemetryConfig::development();
        assert!(config.enabled);
        assert_eq!(config.severity_floor, Severity::Debug);
        assert!(!config.json_format);
    }

    #[test]
    fn test_production_profile() {
        let config = TelemetryConfig::production();
        assert_eq!(config.severity_floor, Severity::Warn);
        assert!(config.json_format);
    }

    #[test]
    fn test_builders() {
        let config = TelemetryConfig::default()
            .with_enabled(false)
            .with_severity_floor(Severity::Error)
            .with_json_format(true)
            .with_service_name("meander-worker");
        assert!(!config.enabled);
        assert_eq!(config.severity_floor, Severity::Error);
        assert!(config.json_format);
        assert_eq!(config.service_name, "meander-worker");
    }

    #[test]
    fn test_disabled_init_is_noop() {
        let config = TelemetryConfig::development().with_enabled(false);
        assert!(init_telemetry(&config).is_ok());
    }

    #[test]
    fn test_uninitialized_floor_defaults_to_debug() {
        assert_eq!(severity_floor(), Severity::Debug);
    }
}

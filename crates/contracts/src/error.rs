//! Layered error definitions
//!
//! Categorized by source: config / source / sensor / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Position Source Errors =====
    /// Every publisher of the topic is gone
    #[error("position source '{topic}' disconnected")]
    SourceDisconnected { topic: String },

    /// Subscription was detached and can no longer be polled
    #[error("position subscription '{topic}' is detached")]
    SourceDetached { topic: String },

    /// Source-specific read failure (replay file, driver)
    #[error("position source '{topic}' error: {message}")]
    SourceRead { topic: String, message: String },

    // ===== Sensor Errors =====
    /// Temperature read failed or produced an invalid value
    #[error("sensor '{sensor_id}' {channel} read error: {message}")]
    SensorRead {
        sensor_id: String,
        channel: TemperatureChannel,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink could not be opened for writing
    #[error("sink '{sink_name}' open error for '{path}': {message}")]
    SinkOpen {
        sink_name: String,
        path: String,
        message: String,
    },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Write attempted after close
    #[error("sink '{sink_name}' is closed")]
    SinkClosed { sink_name: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// The two independent channels of the IR thermometer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureChannel {
    Ambient,
    Object,
}

impl TemperatureChannel {
    /// Lower-case label used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for TemperatureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sensor read error
    pub fn sensor_read(
        sensor_id: impl Into<String>,
        channel: TemperatureChannel,
        message: impl Into<String>,
    ) -> Self {
        Self::SensorRead {
            sensor_id: sensor_id.into(),
            channel,
            message: message.into(),
        }
    }

    /// Create source read error
    pub fn source_read(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceRead {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create sink open error
    pub fn sink_open(
        sink_name: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SinkOpen {
            sink_name: sink_name.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

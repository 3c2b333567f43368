use thiserror::Error;

use crate::schema::SchemaKind;

/// Failures talking to the pipeline's REST surface.
///
/// Reasons are carried as strings so results can cross the request
/// worker's channel and be cloned into status messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("fetch {path} failed: {reason}")]
    Fetch { path: String, reason: String },
    #[error("save failed: {0}")]
    Save(String),
    #[error("tempo update failed: {0}")]
    Tempo(String),
    #[error("trigger '{event}' failed: {reason}")]
    Trigger { event: String, reason: String },
    #[error("request worker disconnected")]
    Disconnected,
}

impl ApiError {
    pub fn fetch(path: &str, reason: impl ToString) -> Self {
        ApiError::Fetch { path: path.to_string(), reason: reason.to_string() }
    }
}

/// Structural mutation failures on the config model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("chain '{0}' not found")]
    ChainNotFound(String),
    #[error("effect '{effect}' not found in chain '{chain}'")]
    EffectNotFound { chain: String, effect: String },
    #[error("event '{0}' not found")]
    EventNotFound(String),
    #[error("event '{event}' has no action at index {index}")]
    ActionNotFound { event: String, index: usize },
    #[error("no {0} schemas loaded")]
    NoSchema(SchemaKind),
}

/// A user edit that could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{param}: malformed input ({reason})")]
    MalformedInput { param: String, reason: String },
    #[error("{param}: '{text}' is not a number")]
    NotANumber { param: String, text: String },
}

/// Anything the editor controller can reject.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("editor is not ready")]
    NotReady,
    #[error("no field for {0}")]
    UnknownTarget(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

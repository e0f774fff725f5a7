use thiserror::Error;

/// Errors raised while loading a model asset.
///
/// Surfaced synchronously to the caller of `load` and never retried.
/// Crosses the dispatch boundary as `{kind: "loadError", message}`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("model asset not found: {0}")]
    AssetNotFound(String),

    #[error("failed to map model asset: {0}")]
    Map(String),

    #[error("model construction failed: {0}")]
    Model(String),

    #[error("model declares {got} inputs, expected {expected}")]
    InputArity { expected: usize, got: usize },

    #[error("model window input is sized {declared}, capture window is {requested}")]
    WindowMismatch { declared: usize, requested: usize },

    #[error("inference engine unavailable (built without the onnx feature)")]
    EngineUnavailable,
}

/// Errors raised while setting up a capture session.
///
/// Only the synchronous setup phase of `record` reports these; once the
/// capture thread is running, device failures are logged and terminate the
/// loop without a channel back to the caller.
/// Crosses the dispatch boundary as `{kind: "recordError", message}`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid capture configuration: {0}")]
    InvalidConfig(String),

    #[error("no capture device available")]
    DeviceNotAvailable,

    #[error("failed to open capture device: {0}")]
    DeviceOpenFailed(String),

    #[error("capture device read failed: {0}")]
    DeviceReadFailed(String),

    #[error("failed to spawn capture thread: {0}")]
    SpawnFailed(String),
}

//! # speech-commands-core
//!
//! Platform-agnostic core for the speech-commands capture plugin.
//!
//! Provides the rolling sample window, the background capture worker, model
//! asset loading, and the method-call dispatch surface. Platform microphone
//! backends (e.g. cpal) implement the `MicSource` trait and plug into the
//! generic `CaptureWorker`.
//!
//! ## Architecture
//!
//! ```text
//! speech-commands-core (this crate)
//! ├── traits/       ← MicSource, MicStream
//! ├── models/       ← LoadError, RecordError, CaptureConfig
//! ├── processing/   ← SampleBuffer (circular window)
//! ├── capture/      ← CaptureWorker (capture thread + snapshot)
//! ├── model/        ← load_model, InferenceHandle (onnx feature)
//! └── dispatch      ← MethodCall/MethodResponse, SpeechCommandsPlugin
//! ```

pub mod capture;
pub mod dispatch;
pub mod model;
pub mod models;
pub mod processing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use capture::worker::CaptureWorker;
pub use dispatch::{MethodCall, MethodResponse, SpeechCommandsPlugin};
pub use model::{load_model, InferenceHandle};
pub use models::config::CaptureConfig;
pub use models::error::{LoadError, RecordError};
pub use processing::sample_buffer::SampleBuffer;
pub use traits::mic_source::{MicSource, MicStream};

//! Method-call dispatch surface.
//!
//! The request/response boundary between an application layer and the
//! plugin: two named operations, `load` and `record`, answered with either
//! success (no payload) or a tagged error payload. Anything else is
//! answered not-implemented. The plugin instance is constructed and owned
//! explicitly by the embedding layer; there is no ambient global.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capture::worker::CaptureWorker;
use crate::model::{self, InferenceHandle};
use crate::models::config::CaptureConfig;
use crate::models::error::{LoadError, RecordError};
use crate::traits::mic_source::MicSource;

/// A method invocation arriving from the application layer.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: HashMap<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Outcome of a method invocation, serialized for the response channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success,
    Error { kind: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    fn load_error(e: LoadError) -> Self {
        Self::Error {
            kind: "loadError".into(),
            message: e.to_string(),
        }
    }

    fn record_error(e: RecordError) -> Self {
        Self::Error {
            kind: "recordError".into(),
            message: e.to_string(),
        }
    }
}

/// The process-wide plugin instance: one capture worker, one microphone
/// source, and a slot for the loaded model.
pub struct SpeechCommandsPlugin {
    worker: CaptureWorker,
    source: Arc<dyn MicSource>,
    model: Mutex<Option<InferenceHandle>>,
}

impl SpeechCommandsPlugin {
    pub fn new(config: CaptureConfig, source: Arc<dyn MicSource>) -> Result<Self, RecordError> {
        Ok(Self {
            worker: CaptureWorker::new(config)?,
            source,
            model: Mutex::new(None),
        })
    }

    /// Dispatch one method call.
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            "load" => self.handle_load(call),
            "record" => match self.worker.start(Arc::clone(&self.source)) {
                Ok(()) => MethodResponse::Success,
                Err(e) => MethodResponse::record_error(e),
            },
            _ => MethodResponse::NotImplemented,
        }
    }

    fn handle_load(&self, call: &MethodCall) -> MethodResponse {
        let Some(path) = call.args.get("model").and_then(Value::as_str) else {
            return MethodResponse::Error {
                kind: "loadError".into(),
                message: "missing string argument: model".into(),
            };
        };

        match model::load_model(Path::new(path), self.worker.capacity()) {
            Ok(handle) => {
                // Replace any previously loaded model.
                *self.model.lock() = Some(handle);
                MethodResponse::Success
            }
            Err(e) => MethodResponse::load_error(e),
        }
    }

    /// Signal the capture loop to stop and wait for it to wind down.
    pub fn stop(&self) {
        self.worker.stop();
    }

    /// Guarded copy of the current capture window, oldest sample first.
    pub fn snapshot(&self) -> Vec<i16> {
        self.worker.snapshot()
    }

    pub fn is_recording(&self) -> bool {
        self.worker.is_running()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.lock().is_some()
    }

    pub fn worker(&self) -> &CaptureWorker {
        &self.worker
    }

    /// Run `f` against the loaded model, if any.
    pub fn with_model<R>(&self, f: impl FnOnce(&InferenceHandle) -> R) -> Option<R> {
        self.model.lock().as_ref().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::error::RecordError;
    use crate::traits::mic_source::MicStream;

    /// A source whose streams deliver silence until dropped.
    struct SilentSource;

    struct SilentStream;

    impl MicSource for SilentSource {
        fn open(&self, _config: &CaptureConfig) -> Result<Box<dyn MicStream>, RecordError> {
            Ok(Box::new(SilentStream))
        }
    }

    impl MicStream for SilentStream {
        fn read(&mut self, buf: &mut [i16]) -> Result<usize, RecordError> {
            std::thread::sleep(std::time::Duration::from_millis(1));
            buf.fill(0);
            Ok(buf.len())
        }
    }

    fn test_plugin() -> SpeechCommandsPlugin {
        let config = CaptureConfig {
            sample_rate_hz: 8,
            window_ms: 1_000,
            chunk_samples: Some(4),
        };
        SpeechCommandsPlugin::new(config, Arc::new(SilentSource)).unwrap()
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let plugin = test_plugin();
        let response = plugin.handle(&MethodCall::new("transcribe"));
        assert_eq!(response, MethodResponse::NotImplemented);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "status": "notImplemented" })
        );
    }

    #[test]
    fn record_answers_success_and_starts_capture() {
        let plugin = test_plugin();
        assert_eq!(
            plugin.handle(&MethodCall::new("record")),
            MethodResponse::Success
        );
        assert!(plugin.is_recording());

        // Second record is an idempotent success.
        assert_eq!(
            plugin.handle(&MethodCall::new("record")),
            MethodResponse::Success
        );

        plugin.stop();
        assert!(!plugin.is_recording());
    }

    #[test]
    fn load_without_model_argument_is_a_load_error() {
        let plugin = test_plugin();
        let response = plugin.handle(&MethodCall::new("load"));
        match &response {
            MethodResponse::Error { kind, .. } => assert_eq!(kind, "loadError"),
            other => panic!("expected a load error, got {:?}", other),
        }
        assert!(!plugin.is_model_loaded());
    }

    #[test]
    fn failed_load_serializes_as_tagged_error_payload() {
        let plugin = test_plugin();
        let call = MethodCall::new("load").with_arg("model", "/nonexistent/model.onnx");
        let response = plugin.handle(&call);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "loadError");
        assert!(json["message"].is_string());
        assert!(!plugin.is_model_loaded());
    }

    #[test]
    fn success_serializes_without_payload() {
        assert_eq!(
            serde_json::to_value(MethodResponse::Success).unwrap(),
            serde_json::json!({ "status": "success" })
        );
    }

    #[test]
    fn method_call_deserializes_with_and_without_args() {
        let call: MethodCall =
            serde_json::from_str(r#"{ "method": "load", "args": { "model": "m.onnx" } }"#)
                .unwrap();
        assert_eq!(call.method, "load");
        assert_eq!(call.args["model"], "m.onnx");

        let bare: MethodCall = serde_json::from_str(r#"{ "method": "record" }"#).unwrap();
        assert!(bare.args.is_empty());
    }
}

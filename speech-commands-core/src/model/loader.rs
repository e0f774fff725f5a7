//! Model asset loading.
//!
//! Maps a packaged model file into memory, commits an ONNX Runtime session
//! from the mapped bytes, and checks that the model declares the expected
//! inputs: one sample window (fed with shape `[1, capacity]`) and one
//! auxiliary sample-rate scalar. Inference itself happens elsewhere; the
//! handle only guarantees the session is sized for the capture window.
//!
//! With the `onnx` feature disabled, a stub reports the engine unavailable.

pub use inner::{load_model, InferenceHandle};

#[cfg(feature = "onnx")]
mod inner {
    use std::fs::File;
    use std::path::Path;

    use memmap2::Mmap;
    use ort::session::Session;

    use crate::models::error::LoadError;

    /// Inputs the command model declares: the sample window plus the
    /// sample-rate scalar.
    const EXPECTED_INPUTS: usize = 2;

    /// A committed inference session plus the window length its first input
    /// is fed with. Opaque to the capture side.
    pub struct InferenceHandle {
        session: Session,
        window: usize,
    }

    impl InferenceHandle {
        /// Window length in samples the session was sized for.
        pub fn window(&self) -> usize {
            self.window
        }

        pub fn session(&self) -> &Session {
            &self.session
        }
    }

    /// Load a model asset and size it for a `window`-sample input.
    ///
    /// Fails with a `LoadError` if the asset cannot be resolved, the bytes
    /// are malformed, or the declared inputs do not fit the window.
    pub fn load_model(path: &Path, window: usize) -> Result<InferenceHandle, LoadError> {
        if !path.is_file() {
            return Err(LoadError::AssetNotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| LoadError::Map(e.to_string()))?;
        // SAFETY: read-only mapping of a regular file; the session copies
        // what it needs during commit, so the map's lifetime ends here.
        let mapped = unsafe { Mmap::map(&file) }.map_err(|e| LoadError::Map(e.to_string()))?;

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_memory(&mapped))
            .map_err(|e| LoadError::Model(e.to_string()))?;

        {
            let inputs = session.inputs();
            if inputs.len() != EXPECTED_INPUTS {
                return Err(LoadError::InputArity {
                    expected: EXPECTED_INPUTS,
                    got: inputs.len(),
                });
            }

            // A statically sized window input must match the capture window;
            // dynamic dims (-1) are resolved per run.
            if let ort::value::ValueType::Tensor { ref shape, .. } = *inputs[0].dtype() {
                let dims: &[i64] = shape;
                if let Some(&declared) = dims.last() {
                    if declared > 0 && declared as usize != window {
                        return Err(LoadError::WindowMismatch {
                            declared: declared as usize,
                            requested: window,
                        });
                    }
                }
            }
        }

        log::info!(
            "Loaded command model from {} (window {} samples)",
            path.display(),
            window
        );

        Ok(InferenceHandle { session, window })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn missing_asset_is_a_load_error() {
            let path = Path::new("/nonexistent/command_model.onnx");
            match load_model(path, 16_000) {
                Err(LoadError::AssetNotFound(p)) => assert!(p.contains("command_model")),
                other => panic!("expected AssetNotFound, got {:?}", other.err()),
            }
        }
    }
}

#[cfg(not(feature = "onnx"))]
mod inner {
    use std::path::Path;

    use crate::models::error::LoadError;

    pub struct InferenceHandle {
        _private: (),
    }

    impl InferenceHandle {
        pub fn window(&self) -> usize {
            0
        }
    }

    pub fn load_model(_path: &Path, _window: usize) -> Result<InferenceHandle, LoadError> {
        Err(LoadError::EngineUnavailable)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn stub_reports_engine_unavailable() {
            assert_eq!(
                load_model(Path::new("model.onnx"), 16_000).err(),
                Some(LoadError::EngineUnavailable)
            );
        }
    }
}

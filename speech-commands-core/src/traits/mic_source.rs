use crate::models::config::CaptureConfig;
use crate::models::error::RecordError;

/// Interface for platform microphone backends.
///
/// Implemented by:
/// - `CpalMicSource` (speech-commands-cpal)
/// - scripted fakes in worker tests
pub trait MicSource: Send + Sync {
    /// Open a capture stream for the given configuration.
    ///
    /// Called from inside the capture thread, so the returned stream never
    /// crosses threads and platform handles with thread affinity are fine.
    fn open(&self, config: &CaptureConfig) -> Result<Box<dyn MicStream>, RecordError>;
}

/// One open capture stream delivering signed 16-bit mono samples at the
/// configured rate.
pub trait MicStream {
    /// Blocking read of up to `buf.len()` samples into the front of `buf`.
    ///
    /// Returns the number of samples delivered. `Ok(0)` means no samples
    /// arrived within the implementation's wait window; the capture loop
    /// treats it as a quiet cycle, not end of stream.
    fn read(&mut self, buf: &mut [i16]) -> Result<usize, RecordError>;

    /// The platform's minimum recommended chunk size in samples, if it
    /// reports one.
    fn min_chunk(&self) -> Option<usize> {
        None
    }
}

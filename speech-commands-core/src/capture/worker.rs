//! Background microphone capture into a shared circular sample buffer.
//!
//! One dedicated thread pulls fixed-size chunks from a `MicSource` stream
//! and publishes them into the rolling window; consumers take guarded
//! snapshots concurrently. Device reads happen outside the buffer lock, so
//! a snapshot only ever waits on the wrap-around memcpy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::RecordError;
use crate::processing::sample_buffer::SampleBuffer;
use crate::traits::mic_source::{MicSource, MicStream};

/// Continuous microphone capture worker.
///
/// `start` spawns the capture loop, `stop` signals it and joins, and
/// `snapshot` copies out the current window. All three are safe to call
/// from any thread.
pub struct CaptureWorker {
    config: CaptureConfig,
    buffer: Arc<Mutex<SampleBuffer>>,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CaptureWorker {
    pub fn new(config: CaptureConfig) -> Result<Self, RecordError> {
        config.validate().map_err(RecordError::InvalidConfig)?;
        let capacity = config.capacity();
        Ok(Self {
            config,
            buffer: Arc::new(Mutex::new(SampleBuffer::new(capacity))),
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        })
    }

    /// Start a capture session; a no-op when one is already live.
    ///
    /// The handle-slot lock serializes concurrent callers, so two sessions
    /// can never be spawned. A finished handle means the previous loop died
    /// (device failure); it is reaped here and a fresh session takes its
    /// place. The device itself is opened inside the spawned thread: open
    /// failures are logged and end that session rather than propagating,
    /// since the caller has already been answered by then.
    pub fn start(&self, source: Arc<dyn MicSource>) -> Result<(), RecordError> {
        let mut handle_guard = self.capture_handle.lock();

        if let Some(handle) = handle_guard.take() {
            // A cleared flag with a handle still unwinding counts as dead
            // too; the join then only waits out the loop's last few
            // instructions.
            if !handle.is_finished() && self.running.load(Ordering::SeqCst) {
                *handle_guard = Some(handle);
                return Ok(());
            }
            let _ = handle.join();
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let buffer = Arc::clone(&self.buffer);
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name("speech-commands-capture".into())
            .spawn(move || {
                match source.open(&config) {
                    Ok(stream) => capture_loop(&running, &buffer, &config, stream),
                    Err(e) => log::error!("Failed to open capture device: {}", e),
                }
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| RecordError::SpawnFailed(e.to_string()))?;

        *handle_guard = Some(handle);
        Ok(())
    }

    /// Signal the capture loop to exit and wait for it.
    ///
    /// The loop re-checks the flag after every device read, so this blocks
    /// for at most one in-flight read. Idempotent when nothing is running.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
        }
    }

    /// Guarded chronological copy of the current window, oldest sample
    /// first. Always exactly `capacity` samples; never a partial write.
    pub fn snapshot(&self) -> Vec<i16> {
        self.buffer.lock().snapshot()
    }

    /// Whether a capture thread is currently alive. The loop clears the
    /// running flag on its way out, so a dead session reads as stopped even
    /// before it is reaped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self
                .capture_handle
                .lock()
                .as_ref()
                .is_some_and(|h| !h.is_finished())
    }

    /// Window length in samples.
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }
}

/// Read chunks from the stream into the shared window until the flag clears.
fn capture_loop(
    running: &AtomicBool,
    buffer: &Mutex<SampleBuffer>,
    config: &CaptureConfig,
    mut stream: Box<dyn MicStream>,
) {
    // Chunk size: explicit override, else the device's reported minimum,
    // else one second's worth of samples.
    let chunk = config
        .chunk_samples
        .or_else(|| stream.min_chunk())
        .unwrap_or(config.sample_rate_hz as usize);
    let mut scratch = vec![0i16; chunk];

    log::info!(
        "Capture loop started: {} Hz, window {} samples, chunk {} samples",
        config.sample_rate_hz,
        config.capacity(),
        chunk
    );

    while running.load(Ordering::SeqCst) {
        // Blocking device read, outside the buffer lock.
        let n = match stream.read(&mut scratch) {
            Ok(0) => continue,
            Ok(n) => n.min(scratch.len()),
            Err(e) => {
                log::error!("Capture read failed: {}", e);
                break;
            }
        };

        buffer.lock().write(&scratch[..n]);
    }

    log::info!("Capture loop exited");
}

//! cpal microphone backend.
//!
//! Opens the default (or a named) input device at its native rate, downmixes
//! to mono, resamples to the configured capture rate, converts to i16, and
//! bridges cpal's push callbacks to the core's blocking `MicStream::read`
//! through a bounded channel.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample, StreamConfig};

use speech_commands_core::{CaptureConfig, MicSource, MicStream, RecordError};

/// Bounded depth of the callback-to-reader channel, in callback chunks.
/// When the reader falls behind, incoming chunks are dropped with a warning;
/// the rolling window only wants the freshest audio anyway.
const CHANNEL_DEPTH: usize = 32;

/// How long a blocking read waits for the next chunk before returning empty.
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// List available input device names.
pub fn list_input_devices() -> Vec<String> {
    let host = cpal::default_host();
    let mut names = Vec::new();
    if let Ok(devices) = host.input_devices() {
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
    }
    names
}

/// `MicSource` over a cpal input device.
pub struct CpalMicSource {
    device_name: Option<String>,
}

impl CpalMicSource {
    /// Capture from the system default input device.
    pub fn default_device() -> Self {
        Self { device_name: None }
    }

    /// Capture from a specific input device by name.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }
}

impl MicSource for CpalMicSource {
    fn open(&self, config: &CaptureConfig) -> Result<Box<dyn MicStream>, RecordError> {
        let host = cpal::default_host();

        let device = match &self.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| RecordError::DeviceOpenFailed(e.to_string()))?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or(RecordError::DeviceNotAvailable)?,
            None => host
                .default_input_device()
                .ok_or(RecordError::DeviceNotAvailable)?,
        };

        let default_config = device
            .default_input_config()
            .map_err(|e| RecordError::DeviceOpenFailed(e.to_string()))?;

        let native_rate = default_config.sample_rate().0;
        let channels = default_config.channels();
        let min_chunk = match default_config.buffer_size() {
            cpal::SupportedBufferSize::Range { min, .. } => Some(*min as usize),
            cpal::SupportedBufferSize::Unknown => None,
        };

        let stream_config = StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(native_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = mpsc::sync_channel::<Vec<i16>>(CHANNEL_DEPTH);
        let target_rate = config.sample_rate_hz;

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(
                &device, &stream_config, channels, native_rate, target_rate, tx,
            )?,
            cpal::SampleFormat::I16 => build_stream::<i16>(
                &device, &stream_config, channels, native_rate, target_rate, tx,
            )?,
            cpal::SampleFormat::U16 => build_stream::<u16>(
                &device, &stream_config, channels, native_rate, target_rate, tx,
            )?,
            other => {
                return Err(RecordError::DeviceOpenFailed(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        };

        stream
            .play()
            .map_err(|e| RecordError::DeviceOpenFailed(e.to_string()))?;

        log::info!(
            "Capture stream open: {} Hz native, {} channel(s), delivering {} Hz mono",
            native_rate,
            channels,
            target_rate
        );

        Ok(Box::new(CpalMicStream {
            _stream: stream,
            rx,
            pending: VecDeque::new(),
            min_chunk,
        }))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: u16,
    native_rate: u32,
    target_rate: u32,
    tx: SyncSender<Vec<i16>>,
) -> Result<cpal::Stream, RecordError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mono = to_mono_f32(data, channels);
                let resampled = resample_linear(&mono, native_rate, target_rate);
                let pcm = to_i16(&resampled);
                if let Err(TrySendError::Full(chunk)) = tx.try_send(pcm) {
                    log::warn!("Capture channel full, dropping {} samples", chunk.len());
                }
            },
            |err| log::error!("Capture stream error: {}", err),
            None,
        )
        .map_err(|e| RecordError::DeviceOpenFailed(e.to_string()))
}

/// Down-mix interleaved multi-channel audio to mono f32 by averaging frames.
fn to_mono_f32<T>(samples: &[T], channels: u16) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    if channels <= 1 {
        return samples.iter().map(|&s| f32::from_sample(s)).collect();
    }
    let ch = channels as usize;
    samples
        .chunks_exact(ch)
        .map(|frame| {
            frame.iter().map(|&s| f32::from_sample(s)).sum::<f32>() / ch as f32
        })
        .collect()
}

/// Simple linear resampler on mono f32 samples.
fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return input.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((input.len() as f64) / ratio).floor() as usize;
    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let src_idx = i as f64 * ratio;
        let idx0 = src_idx.floor() as usize;
        let frac = (src_idx - idx0 as f64) as f32;
        let s0 = input.get(idx0).copied().unwrap_or(0.0);
        let s1 = input.get(idx0 + 1).copied().unwrap_or(s0);
        output.push(s0 + frac * (s1 - s0));
    }
    output
}

fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Blocking-read adapter over the callback channel. Owns the cpal stream,
/// which stays on the capture thread for its whole life.
struct CpalMicStream {
    _stream: cpal::Stream,
    rx: Receiver<Vec<i16>>,
    pending: VecDeque<i16>,
    min_chunk: Option<usize>,
}

impl MicStream for CpalMicStream {
    fn read(&mut self, buf: &mut [i16]) -> Result<usize, RecordError> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(READ_TIMEOUT) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(RecordError::DeviceReadFailed("capture stream closed".into()))
                }
            }
        }

        // Top up from chunks already queued, without blocking again.
        while self.pending.len() < buf.len() {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(_) => break,
            }
        }

        let n = self.pending.len().min(buf.len());
        for (slot, sample) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = sample;
        }
        Ok(n)
    }

    fn min_chunk(&self) -> Option<usize> {
        self.min_chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough_keeps_samples() {
        let samples = [0.1f32, -0.2, 0.3];
        assert_eq!(to_mono_f32(&samples, 1), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn stereo_downmix_averages_frames() {
        let samples = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(to_mono_f32(&samples, 2), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let input = [0.1f32, 0.2, 0.3];
        assert_eq!(resample_linear(&input, 16_000, 16_000), input.to_vec());
    }

    #[test]
    fn downsample_halves_length() {
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let out = resample_linear(&input, 32_000, 16_000);
        assert_eq!(out.len(), 50);
        // Linear interpolation of a ramp stays on the ramp.
        assert!((out[10] - input[20]).abs() < 1e-6);
    }

    #[test]
    fn i16_conversion_clamps_and_scales() {
        let out = to_i16(&[0.0, 1.0, -1.0, 2.0, -2.0]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], i16::MAX);
        assert_eq!(out[3], i16::MAX);
        assert_eq!(out[4], -i16::MAX);
        assert!(out[2] <= -i16::MAX + 1);
    }
}

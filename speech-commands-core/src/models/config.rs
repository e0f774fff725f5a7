/// Configuration for the capture worker and model window sizing.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture sample rate in Hz (default: 16000).
    pub sample_rate_hz: u32,

    /// Length of the rolling classification window in milliseconds
    /// (default: 1000).
    pub window_ms: u32,

    /// Per-read chunk size in samples, or None to use the device's reported
    /// minimum with a fallback of one second's worth of samples.
    pub chunk_samples: Option<usize>,
}

impl CaptureConfig {
    /// Window capacity in samples: `sample_rate_hz * window_ms / 1000`.
    pub fn capacity(&self) -> usize {
        (self.sample_rate_hz as u64 * self.window_ms as u64 / 1000) as usize
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.window_ms == 0 {
            return Err("window duration must be positive".into());
        }
        if self.capacity() == 0 {
            return Err(format!(
                "window of {} ms at {} Hz holds no samples",
                self.window_ms, self.sample_rate_hz
            ));
        }
        if self.chunk_samples == Some(0) {
            return Err("chunk size must be positive".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
            window_ms: 1_000,
            chunk_samples: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_one_second() {
        let config = CaptureConfig::default();
        assert_eq!(config.capacity(), 16_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_rate_and_empty_window() {
        let mut config = CaptureConfig::default();
        config.sample_rate_hz = 0;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.window_ms = 0;
        assert!(config.validate().is_err());

        // 1 ms at 100 Hz rounds down to zero samples
        let config = CaptureConfig {
            sample_rate_hz: 100,
            window_ms: 1,
            chunk_samples: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_chunk_override() {
        let config = CaptureConfig {
            chunk_samples: Some(0),
            ..CaptureConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

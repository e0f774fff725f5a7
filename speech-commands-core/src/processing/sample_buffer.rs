/// Fixed-capacity circular buffer of signed 16-bit audio samples.
///
/// Holds the most recent `capacity` samples written, in circular order
/// starting at the write offset. Wrap in `Arc<parking_lot::Mutex<_>>` to
/// share between the capture thread and snapshot readers; the single
/// writer and all readers serialize on that one guard.
///
/// Unlike a FIFO queue, reads do not consume: `snapshot` copies out the
/// full rolling window and writes keep overwriting the oldest samples.
#[derive(Debug)]
pub struct SampleBuffer {
    buffer: Vec<i16>,
    write_offset: usize,
    capacity: usize,
}

impl SampleBuffer {
    /// Create a zero-filled buffer. Capacity must be non-zero; enforced
    /// upstream by `CaptureConfig::validate`.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            write_offset: 0,
            capacity,
        }
    }

    /// Write a chunk at the current offset, wrapping at the end.
    ///
    /// Always at most two contiguous copies: the run up to the end of the
    /// buffer, then the remainder from index 0. A chunk longer than the
    /// buffer keeps only its trailing `capacity` samples; the rest would be
    /// overwritten within this same call.
    pub fn write(&mut self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        // Only the trailing `capacity` samples of an oversized chunk survive,
        // but the skipped ones still advance the offset so the result is
        // identical to having written them one chunk at a time.
        let excess = samples.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.write_offset = (self.write_offset + excess) % self.capacity;
        }
        let samples = &samples[excess..];

        let first = samples.len().min(self.capacity - self.write_offset);
        let second = samples.len() - first;

        self.buffer[self.write_offset..self.write_offset + first]
            .copy_from_slice(&samples[..first]);
        self.buffer[..second].copy_from_slice(&samples[first..]);

        self.write_offset = (self.write_offset + samples.len()) % self.capacity;
    }

    /// Copy the full window into `out` in chronological order, oldest
    /// sample first. `out` must be exactly `capacity` long.
    pub fn snapshot_into(&self, out: &mut [i16]) {
        let tail = self.capacity - self.write_offset;
        out[..tail].copy_from_slice(&self.buffer[self.write_offset..]);
        out[tail..].copy_from_slice(&self.buffer[..self.write_offset]);
    }

    /// Chronological copy of the full window. Slots never written retain
    /// their initial zero value.
    pub fn snapshot(&self) -> Vec<i16> {
        let mut out = vec![0; self.capacity];
        self.snapshot_into(&mut out);
        out
    }

    /// Index where the next incoming sample lands.
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// The total capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

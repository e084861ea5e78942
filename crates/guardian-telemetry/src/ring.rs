//! Fixed-capacity six-channel circular sample store.
//!
//! Storage is column-major: one `f32` column per [`Channel`], all sharing a
//! single write cursor. The buffer never reallocates after construction.

use crate::error::{TelemetryError, TelemetryResult};
use crate::sample::{Channel, RawSample};

/// Circular store of the most recent `capacity` samples.
///
/// `len()` grows by one per push until it reaches `capacity()` and stays
/// there. The window of the most recent `n` samples starts `n` slots before
/// the write cursor, modulo capacity.
#[derive(Debug, Clone)]
pub struct SampleRingBuffer {
    columns: [Vec<f32>; Channel::COUNT],
    capacity: usize,
    cursor: usize,
    count: usize,
}

impl SampleRingBuffer {
    /// Create an empty buffer holding up to `capacity` samples.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfiguration`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> TelemetryResult<Self> {
        if capacity == 0 {
            return Err(TelemetryError::invalid_configuration(
                "ring buffer capacity must be at least 1",
            ));
        }
        Ok(Self {
            columns: core::array::from_fn(|_| vec![0.0; capacity]),
            capacity,
            cursor: 0,
            count: 0,
        })
    }

    /// Clear all stored samples, the cursor and the count.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.fill(0.0);
        }
        self.cursor = 0;
        self.count = 0;
    }

    /// Append a sample, overwriting the oldest one once full.
    pub fn push(&mut self, sample: RawSample) {
        let cursor = self.cursor;
        for channel in Channel::ALL {
            if let Some(slot) = self
                .columns
                .get_mut(channel.index())
                .and_then(|column| column.get_mut(cursor))
            {
                *slot = sample.get(channel);
            }
        }
        self.cursor = (cursor + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    /// Start index of the most recent `n` samples.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InsufficientData`] if fewer than `n` samples
    /// are buffered.
    pub fn window(&self, n: usize) -> TelemetryResult<usize> {
        if n > self.count {
            return Err(TelemetryError::InsufficientData {
                requested: n,
                available: self.count,
            });
        }
        Ok((self.cursor + self.capacity - n) % self.capacity)
    }

    /// Value of `channel` at `index`, wrapping past the end of storage.
    #[must_use]
    pub fn value(&self, channel: Channel, index: usize) -> f32 {
        self.column(channel)
            .get(index % self.capacity)
            .copied()
            .unwrap_or_default()
    }

    /// Full sample at `index`, wrapping past the end of storage.
    #[must_use]
    pub fn sample_at(&self, index: usize) -> RawSample {
        let mut sample = RawSample::default();
        for channel in Channel::ALL {
            sample.set(channel, self.value(channel, index));
        }
        sample
    }

    /// The `n` values of `channel` starting at `start`, oldest first.
    pub fn window_iter(
        &self,
        channel: Channel,
        start: usize,
        n: usize,
    ) -> impl Iterator<Item = f32> + '_ {
        self.column(channel)
            .iter()
            .cycle()
            .skip(start % self.capacity)
            .take(n)
            .copied()
    }

    /// The `n` samples starting at `start`, oldest first.
    pub fn samples(&self, start: usize, n: usize) -> impl Iterator<Item = RawSample> + '_ {
        (0..n).map(move |offset| self.sample_at(start + offset))
    }

    /// Arithmetic mean of `n` values of `channel` starting at `start`.
    ///
    /// Returns `0.0` for an empty range.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "window lengths are far below f32 integer precision"
    )]
    pub fn mean(&self, channel: Channel, start: usize, n: usize) -> f32 {
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.window_iter(channel, start, n).sum();
        sum / n as f32
    }

    /// Most recently pushed sample, if any.
    #[must_use]
    pub fn latest(&self) -> Option<RawSample> {
        if self.count == 0 {
            return None;
        }
        Some(self.sample_at(self.cursor + self.capacity - 1))
    }

    /// Maximum number of samples retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no sample has been pushed since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True once `capacity()` samples have been pushed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    fn column(&self, channel: Channel) -> &[f32] {
        self.columns
            .get(channel.index())
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_with_current(iin: f32) -> RawSample {
        RawSample::new(8.0, iin, 5.0, 0.5, 40.0, 0.0)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = SampleRingBuffer::with_capacity(0);
        assert!(matches!(
            result,
            Err(TelemetryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_new_buffer_is_empty() -> TelemetryResult<()> {
        let buffer = SampleRingBuffer::with_capacity(8)?;
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 8);
        assert!(buffer.latest().is_none());
        Ok(())
    }

    #[test]
    fn test_count_saturates_at_capacity() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(4)?;
        for i in 0..10 {
            buffer.push(sample_with_current(i as f32));
            assert_eq!(buffer.len(), (i + 1).min(4));
        }
        assert!(buffer.is_full());
        Ok(())
    }

    #[test]
    fn test_window_insufficient_data() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(4)?;
        buffer.push(sample_with_current(0.1));
        assert_eq!(
            buffer.window(2),
            Err(TelemetryError::InsufficientData {
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(buffer.window(1)?, 0);
        Ok(())
    }

    #[test]
    fn test_window_wraps_in_chronological_order() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(4)?;
        for i in 1..=6 {
            buffer.push(sample_with_current(i as f32));
        }
        // Storage now holds [5, 6, 3, 4] with the cursor at slot 2.
        let start = buffer.window(3)?;
        assert_eq!(start, 3);
        let values: Vec<f32> = buffer
            .window_iter(Channel::InputCurrent, start, 3)
            .collect();
        assert_eq!(values.len(), 3);
        for (got, want) in values.iter().zip([4.0_f32, 5.0, 6.0]) {
            assert_relative_eq!(*got, want);
        }
        Ok(())
    }

    #[test]
    fn test_mean_over_wrapped_window() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(3)?;
        for i in 1..=5 {
            buffer.push(sample_with_current(i as f32));
        }
        let start = buffer.window(3)?;
        assert_relative_eq!(buffer.mean(Channel::InputCurrent, start, 3), 4.0);
        assert_relative_eq!(buffer.mean(Channel::InputCurrent, start, 0), 0.0);
        Ok(())
    }

    #[test]
    fn test_latest_tracks_last_push() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(2)?;
        for i in 0..5 {
            buffer.push(sample_with_current(i as f32));
        }
        let latest = buffer.latest().ok_or(TelemetryError::InsufficientData {
            requested: 1,
            available: 0,
        })?;
        assert_relative_eq!(latest.input_current, 4.0);
        Ok(())
    }

    #[test]
    fn test_reset_clears_state() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(3)?;
        buffer.push(sample_with_current(1.0));
        buffer.push(sample_with_current(2.0));
        buffer.reset();
        assert!(buffer.is_empty());
        assert!(buffer.window(1).is_err());
        assert_relative_eq!(buffer.value(Channel::InputCurrent, 0), 0.0);
        Ok(())
    }

    #[test]
    fn test_sample_at_reassembles_all_channels() -> TelemetryResult<()> {
        let mut buffer = SampleRingBuffer::with_capacity(2)?;
        let original = RawSample::new(8.1, 0.41, 4.99, 0.52, 41.5, 0.012);
        buffer.push(original);
        assert_eq!(buffer.sample_at(0), original);
        assert_eq!(buffer.sample_at(2), original);
        Ok(())
    }
}

//! Raw sample sources.

use guardian_telemetry::RawSample;

use crate::error::{ServiceError, ServiceResult};

/// Bench ripple reading used when ripple sensing is enabled (V).
pub const NOMINAL_RIPPLE_V: f32 = 0.010;

/// Supplies one synchronized six-channel reading per call.
pub trait SampleSource {
    /// Next reading.
    fn read(&mut self) -> RawSample;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self) -> RawSample {
        (**self).read()
    }
}

/// Fixed bench reading: 8.0 V / 0.40 A in, 5.00 V / 0.50 A out, 40 °C.
#[derive(Debug, Clone, Copy)]
pub struct NominalSource {
    sample: RawSample,
}

impl NominalSource {
    /// Bench source; ripple reads [`NOMINAL_RIPPLE_V`] only when sensed.
    pub fn new(use_ripple: bool) -> Self {
        let ripple = if use_ripple { NOMINAL_RIPPLE_V } else { 0.0 };
        Self {
            sample: RawSample::new(8.0, 0.40, 5.0, 0.50, 40.0, ripple),
        }
    }
}

impl SampleSource for NominalSource {
    fn read(&mut self) -> RawSample {
        self.sample
    }
}

/// Replays a recorded sequence, then repeats its last reading.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<RawSample>,
    cursor: usize,
}

impl ReplaySource {
    /// Source over `samples`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for an empty sequence.
    pub fn new(samples: Vec<RawSample>) -> ServiceResult<Self> {
        if samples.is_empty() {
            return Err(ServiceError::invalid_input("replay sequence is empty"));
        }
        Ok(Self { samples, cursor: 0 })
    }

    /// Readings not yet replayed.
    pub fn remaining(&self) -> usize {
        self.samples.len().saturating_sub(self.cursor)
    }

    /// True once every recorded reading has been returned.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl SampleSource for ReplaySource {
    fn read(&mut self) -> RawSample {
        let index = self.cursor.min(self.samples.len().saturating_sub(1));
        self.cursor = self.cursor.saturating_add(1).min(self.samples.len());
        self.samples.get(index).copied().unwrap_or_default()
    }
}

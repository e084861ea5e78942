//! Scripted raw sample sequences.

use guardian_telemetry::RawSample;

/// The bench nominal reading: 8.0 V / 0.40 A in, 5.00 V / 0.50 A out, 40 °C.
pub const NOMINAL_SAMPLE: RawSample = RawSample::new(8.0, 0.40, 5.0, 0.50, 40.0, 0.0);

/// Builder for sample sequences.
///
/// ```rust
/// use guardian_test_helpers::samples::SampleScript;
///
/// let samples = SampleScript::new().hold(40).surge(20).hold(10).build();
/// assert_eq!(samples.len(), 70);
/// ```
#[derive(Debug, Clone)]
pub struct SampleScript {
    base: RawSample,
    samples: Vec<RawSample>,
}

impl Default for SampleScript {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleScript {
    /// Empty script around [`NOMINAL_SAMPLE`].
    pub fn new() -> Self {
        Self::around(NOMINAL_SAMPLE)
    }

    /// Empty script around a custom base sample.
    pub fn around(base: RawSample) -> Self {
        Self {
            base,
            samples: Vec::new(),
        }
    }

    /// Append `n` copies of the base sample.
    pub fn hold(mut self, n: usize) -> Self {
        self.samples.extend(std::iter::repeat_n(self.base, n));
        self
    }

    /// Append `n` samples produced by `f` from the base and the step index.
    pub fn with(mut self, n: usize, f: impl Fn(RawSample, usize) -> RawSample) -> Self {
        for k in 0..n {
            self.samples.push(f(self.base, k));
        }
        self
    }

    /// Append `n` samples with input current ramping linearly `from → to`.
    pub fn current_ramp(self, from: f32, to: f32, n: usize) -> Self {
        let span = n.saturating_sub(1).max(1) as f32;
        self.with(n, move |mut s, k| {
            s.input_current = from + (to - from) * k as f32 / span;
            s
        })
    }

    /// Append `n` samples of a latch-up signature: input current climbing
    /// 0.1 A per sample with the output sagging to 4.90 V.
    ///
    /// Twenty such samples at 10 kHz give `di_dt` ≈ 0.95 A/ms.
    pub fn surge(self, n: usize) -> Self {
        self.with(n, |mut s, k| {
            s.input_current += 0.1 * k as f32;
            s.output_voltage = 4.90;
            s
        })
    }

    /// Number of samples scripted so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing has been scripted.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Finish the script.
    pub fn build(self) -> Vec<RawSample> {
        self.samples
    }
}

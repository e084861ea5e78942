//! Raw telemetry samples and channel identifiers.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Floor applied to input power before computing the conversion ratio (watts).
pub const POWER_EPSILON_W: f32 = 1e-6;

/// Upper clamp for the per-sample conversion efficiency.
///
/// Tolerates sensor noise without letting spurious super-unity readings
/// dominate the efficiency feature.
pub const EFFICIENCY_CEILING: f32 = 1.2;

/// One of the six synchronized telemetry channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    /// Converter input voltage (V).
    InputVoltage,
    /// Converter input current (A).
    InputCurrent,
    /// Converter output voltage (V).
    OutputVoltage,
    /// Converter output current (A).
    OutputCurrent,
    /// Board temperature (°C).
    Temperature,
    /// Output ripple voltage (V).
    Ripple,
}

impl Channel {
    /// Number of channels in a sample.
    pub const COUNT: usize = 6;

    /// All channels in storage order.
    pub const ALL: [Channel; Self::COUNT] = [
        Channel::InputVoltage,
        Channel::InputCurrent,
        Channel::OutputVoltage,
        Channel::OutputCurrent,
        Channel::Temperature,
        Channel::Ripple,
    ];

    /// Storage index of this channel.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Channel::InputVoltage => 0,
            Channel::InputCurrent => 1,
            Channel::OutputVoltage => 2,
            Channel::OutputCurrent => 3,
            Channel::Temperature => 4,
            Channel::Ripple => 5,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::InputVoltage => "vin",
            Channel::InputCurrent => "iin",
            Channel::OutputVoltage => "vout",
            Channel::OutputCurrent => "iout",
            Channel::Temperature => "temp",
            Channel::Ripple => "ripple",
        };
        f.write_str(name)
    }
}

/// One synchronized reading of all six channels, in physical units.
///
/// Produced by the acquisition side at the nominal sampling rate and never
/// modified after it is pushed into the ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawSample {
    /// Input voltage (V).
    pub input_voltage: f32,
    /// Input current (A).
    pub input_current: f32,
    /// Output voltage (V).
    pub output_voltage: f32,
    /// Output current (A).
    pub output_current: f32,
    /// Temperature (°C).
    pub temperature: f32,
    /// Ripple voltage (V).
    pub ripple: f32,
}

impl RawSample {
    /// Create a sample from the six channel readings.
    #[must_use]
    pub const fn new(
        input_voltage: f32,
        input_current: f32,
        output_voltage: f32,
        output_current: f32,
        temperature: f32,
        ripple: f32,
    ) -> Self {
        Self {
            input_voltage,
            input_current,
            output_voltage,
            output_current,
            temperature,
            ripple,
        }
    }

    /// Read a single channel.
    #[must_use]
    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::InputVoltage => self.input_voltage,
            Channel::InputCurrent => self.input_current,
            Channel::OutputVoltage => self.output_voltage,
            Channel::OutputCurrent => self.output_current,
            Channel::Temperature => self.temperature,
            Channel::Ripple => self.ripple,
        }
    }

    /// Write a single channel.
    pub fn set(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::InputVoltage => self.input_voltage = value,
            Channel::InputCurrent => self.input_current = value,
            Channel::OutputVoltage => self.output_voltage = value,
            Channel::OutputCurrent => self.output_current = value,
            Channel::Temperature => self.temperature = value,
            Channel::Ripple => self.ripple = value,
        }
    }

    /// Input power in watts.
    #[must_use]
    pub fn input_power(&self) -> f32 {
        self.input_voltage * self.input_current
    }

    /// Output power in watts.
    #[must_use]
    pub fn output_power(&self) -> f32 {
        self.output_voltage * self.output_current
    }

    /// Conversion efficiency `P_out / max(P_in, ε)` clamped to `[0, 1.2]`.
    #[must_use]
    pub fn efficiency(&self) -> f32 {
        let pin = self.input_power().max(POWER_EPSILON_W);
        (self.output_power() / pin).clamp(0.0, EFFICIENCY_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_channel_indices_are_dense() {
        for (expected, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), expected);
        }
    }

    #[test]
    fn test_get_set_roundtrip_per_channel() {
        let mut sample = RawSample::default();
        for (i, channel) in Channel::ALL.iter().enumerate() {
            sample.set(*channel, i as f32 + 0.5);
        }
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_relative_eq!(sample.get(*channel), i as f32 + 0.5);
        }
    }

    #[test]
    fn test_efficiency_within_range_is_unclamped() {
        // Pin = 8.0 V * 0.4 A = 3.2 W, Pout = 5.0 V * 0.58 A = 2.9 W
        let sample = RawSample::new(8.0, 0.4, 5.0, 0.58, 40.0, 0.0);
        assert_relative_eq!(sample.input_power(), 3.2, epsilon = 1e-5);
        assert_relative_eq!(sample.output_power(), 2.9, epsilon = 1e-5);
        assert_relative_eq!(sample.efficiency(), 0.906_25, epsilon = 1e-4);
    }

    #[test]
    fn test_efficiency_clamps_super_unity() {
        let sample = RawSample::new(1.0, 1.0, 5.0, 1.0, 25.0, 0.0);
        assert_relative_eq!(sample.efficiency(), EFFICIENCY_CEILING);
    }

    #[test]
    fn test_efficiency_guards_zero_input_power() {
        let sample = RawSample::new(0.0, 0.0, 0.0, 0.0, 25.0, 0.0);
        assert_relative_eq!(sample.efficiency(), 0.0);

        let sample = RawSample::new(0.0, 0.0, 5.0, 0.5, 25.0, 0.0);
        assert!(sample.efficiency().is_finite());
        assert_relative_eq!(sample.efficiency(), EFFICIENCY_CEILING);
    }

    #[test]
    fn test_efficiency_clamps_negative_ratio() {
        let sample = RawSample::new(8.0, 0.4, 5.0, -0.5, 25.0, 0.0);
        assert_relative_eq!(sample.efficiency(), 0.0);
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::InputCurrent.to_string(), "iin");
        assert_eq!(Channel::Temperature.to_string(), "temp");
    }
}

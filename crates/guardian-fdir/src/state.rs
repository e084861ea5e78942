//! FDIR states.

use serde::{Deserialize, Serialize};

/// State of the power-path FDIR automaton.
///
/// ```text
/// Normal ──dwell reached / cut──► Hold ──hold elapsed / restart──► Verify
///   ▲                                                               │
///   └──────────────── verify elapsed, no relatch ───────────────────┤
///                                                                   │
///                                              relatch / cut        ▼
///                                                                  Safe
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FdirState {
    /// Powered and monitoring.
    #[default]
    Normal,
    /// Power cut, waiting out the hold-off period.
    Hold,
    /// Power restored, watching for the fault to reappear.
    Verify,
    /// Power cut permanently (absorbing).
    Safe,
}

impl FdirState {
    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Hold => "Hold",
            Self::Verify => "Verify",
            Self::Safe => "Safe",
        }
    }

    /// True for the absorbing state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Safe)
    }

    /// True when the state expects the power path to be enabled.
    #[must_use]
    pub fn expects_power(self) -> bool {
        matches!(self, Self::Normal | Self::Verify)
    }
}

impl core::fmt::Display for FdirState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_normal() {
        assert_eq!(FdirState::default(), FdirState::Normal);
    }

    #[test]
    fn test_only_safe_is_terminal() {
        assert!(FdirState::Safe.is_terminal());
        assert!(!FdirState::Normal.is_terminal());
        assert!(!FdirState::Hold.is_terminal());
        assert!(!FdirState::Verify.is_terminal());
    }

    #[test]
    fn test_power_expectation() {
        assert!(FdirState::Normal.expects_power());
        assert!(FdirState::Verify.expects_power());
        assert!(!FdirState::Hold.expects_power());
        assert!(!FdirState::Safe.expects_power());
        assert_eq!(FdirState::Hold.to_string(), "Hold");
    }
}

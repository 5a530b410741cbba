//! Exposure time handling
//!
//! The dev-kit firmware measures exposure time in *cycles*. One cycle is
//! 0.02 ms and the firmware stores cycles as an unsigned 16-bit integer, so the
//! raw range is 1 cycle (0.02 ms) to 65535 cycles (1310.7 ms).
//!
//! Converting from milliseconds clamps to 0.02 ms..=1310 ms before rounding, so
//! every converted value lies in `1..=65500` cycles.
//!
//! # Example
//!
//! ```
//! use microspec_gui::exposure::Exposure;
//!
//! let exposure = Exposure::from_ms(1.0);
//! assert_eq!(exposure.cycles(), 50);
//! assert_eq!(exposure.step_up().cycles(), 100);
//! ```

pub mod stepper;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration of one firmware cycle in milliseconds
pub const MS_PER_CYCLE: f64 = 0.02;

/// Shortest exposure accepted when converting from milliseconds
pub const MIN_EXPOSURE_MS: f64 = 0.02;

/// Longest exposure accepted when converting from milliseconds
pub const MAX_EXPOSURE_MS: f64 = 1310.0;

/// Exposure time as a firmware cycle count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exposure(u16);

impl Exposure {
    /// Shortest exposure the firmware accepts (1 cycle)
    pub const MIN: Self = Self(1);

    /// Longest exposure reachable from a millisecond value (1310 ms)
    pub const MAX_FROM_MS: Self = Self(65_500);

    /// Exposure from a raw cycle count. Zero is raised to one cycle.
    pub fn from_cycles(cycles: u16) -> Self {
        Self(cycles.max(1))
    }

    /// Exposure from milliseconds, clamped to 0.02 ms..=1310 ms
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to 1.0..=65500.0 before the cast"
    )]
    pub fn from_ms(ms: f64) -> Self {
        let ms = if ms.is_nan() {
            MIN_EXPOSURE_MS
        } else {
            ms.clamp(MIN_EXPOSURE_MS, MAX_EXPOSURE_MS)
        };
        Self((ms / MS_PER_CYCLE).round() as u16)
    }

    /// Raw cycle count
    pub fn cycles(self) -> u16 {
        self.0
    }

    /// Exposure time in milliseconds
    pub fn as_ms(self) -> f64 {
        f64::from(self.0) * MS_PER_CYCLE
    }

    /// Next longer exposure on the one-significant-digit ladder
    pub fn step_up(self) -> Self {
        stepper::step_up(self)
    }

    /// Next shorter exposure on the one-significant-digit ladder
    pub fn step_down(self) -> Self {
        stepper::step_down(self)
    }
}

impl Default for Exposure {
    /// Firmware power-on default: 1 ms
    fn default() -> Self {
        Self(50)
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}ms", self.as_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_millisecond_is_fifty_cycles() {
        assert_eq!(Exposure::from_ms(1.0).cycles(), 50);
        assert!((Exposure::from_cycles(50).as_ms() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_ms_clamps_low() {
        assert_eq!(Exposure::from_ms(0.0), Exposure::MIN);
        assert_eq!(Exposure::from_ms(-3.0), Exposure::MIN);
        assert_eq!(Exposure::from_ms(f64::NAN), Exposure::MIN);
    }

    #[test]
    fn test_from_ms_clamps_high() {
        assert_eq!(Exposure::from_ms(2000.0), Exposure::MAX_FROM_MS);
        assert_eq!(Exposure::from_ms(f64::INFINITY).cycles(), 65_500);
    }

    #[test]
    fn test_from_ms_rounds_to_nearest_cycle() {
        // 0.3 / 0.02 is 14.999... in floating point
        assert_eq!(Exposure::from_ms(0.3).cycles(), 15);
        assert_eq!(Exposure::from_ms(0.19999999999999998).cycles(), 10);
    }

    #[test]
    fn test_zero_cycles_raised_to_minimum() {
        assert_eq!(Exposure::from_cycles(0), Exposure::MIN);
    }

    #[test]
    fn test_display_uses_two_decimals() {
        assert_eq!(Exposure::from_cycles(65_535).to_string(), "1310.70ms");
        assert_eq!(Exposure::from_cycles(1).to_string(), "0.02ms");
    }

    #[test]
    fn test_serde_is_plain_cycle_count() {
        let json = serde_json::to_string(&Exposure::from_cycles(50)).unwrap();
        assert_eq!(json, "50");
        let parsed: Exposure = serde_json::from_str("1234").unwrap();
        assert_eq!(parsed.cycles(), 1234);
    }
}

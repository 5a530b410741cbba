//! Significant-digit exposure stepper
//!
//! Pressing "increase" or "decrease" moves the exposure along a ladder of
//! one-significant-digit millisecond values:
//!
//! ```text
//! 0.1 0.2 ... 0.9  1  2 ... 9  10  20 ... 90  100  200 ... 900  1000  (1310)
//! ```
//!
//! The current exposure is first snapped onto the ladder:
//!
//! - below 1 ms it is truncated to tenths (`0.98 ms` snaps to `0.9 ms`)
//! - from 1 ms up it is rounded to one significant digit, ties to even
//!   (`123.45 ms` snaps to `100 ms`, `9.6 ms` to `10 ms`, `250 ms` to `200 ms`)
//!
//! and then moved one rung. Decrementing a leading `1` consumes the next digit
//! (`100 ms` goes to `90 ms`, `1 ms` goes to `0.9 ms`). Results are clamped to
//! `1..=65500` cycles.
//!
//! All arithmetic is done on cycle counts (1 ms = 50 cycles) so no floating
//! point error creeps into the rounding.

use super::Exposure;

const CYCLES_PER_MS: u64 = 50;
const CYCLES_PER_TENTH_MS: u64 = 5;
const MAX_CYCLES: u64 = 65_500;

/// An exposure snapped onto the one-significant-digit ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rung {
    /// Below 1 ms, in tenths of a millisecond (`0..=9`)
    Tenths(u64),
    /// `digit * 10^exponent` milliseconds with `digit` in `1..=9`
    Digit { digit: u64, exponent: u32 },
}

impl Rung {
    fn snap(exposure: Exposure) -> Self {
        let cycles = u64::from(exposure.cycles());
        if cycles < CYCLES_PER_MS {
            return Self::Tenths(cycles / CYCLES_PER_TENTH_MS);
        }

        let exponent = (cycles / CYCLES_PER_MS).ilog10();
        let unit = CYCLES_PER_MS * 10u64.pow(exponent);
        let mut digit = cycles / unit;
        let remainder = cycles % unit;
        if 2 * remainder > unit || (2 * remainder == unit && digit % 2 == 1) {
            digit += 1;
        }

        if digit == 10 {
            Self::Digit {
                digit: 1,
                exponent: exponent + 1,
            }
        } else {
            Self::Digit { digit, exponent }
        }
    }

    fn up(self) -> Self {
        match self {
            Self::Tenths(9) => Self::Digit {
                digit: 1,
                exponent: 0,
            },
            Self::Tenths(tenths) => Self::Tenths(tenths + 1),
            Self::Digit { digit: 9, exponent } => Self::Digit {
                digit: 1,
                exponent: exponent + 1,
            },
            Self::Digit { digit, exponent } => Self::Digit {
                digit: digit + 1,
                exponent,
            },
        }
    }

    fn down(self) -> Self {
        match self {
            Self::Tenths(tenths) => Self::Tenths(tenths.saturating_sub(1)),
            Self::Digit {
                digit: 1,
                exponent: 0,
            } => Self::Tenths(9),
            Self::Digit { digit: 1, exponent } => Self::Digit {
                digit: 9,
                exponent: exponent - 1,
            },
            Self::Digit { digit, exponent } => Self::Digit {
                digit: digit - 1,
                exponent,
            },
        }
    }

    fn to_exposure(self) -> Exposure {
        let cycles = match self {
            Self::Tenths(tenths) => tenths * CYCLES_PER_TENTH_MS,
            Self::Digit { digit, exponent } => digit * 10u64.pow(exponent) * CYCLES_PER_MS,
        };
        let cycles = u16::try_from(cycles.clamp(1, MAX_CYCLES)).unwrap_or(u16::MAX);
        Exposure::from_cycles(cycles)
    }
}

/// Increment the most significant digit of the exposure in milliseconds
pub fn step_up(exposure: Exposure) -> Exposure {
    Rung::snap(exposure).up().to_exposure()
}

/// Decrement the most significant digit of the exposure in milliseconds
pub fn step_down(exposure: Exposure) -> Exposure {
    Rung::snap(exposure).down().to_exposure()
}

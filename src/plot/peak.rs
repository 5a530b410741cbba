//! Peak detection over the meaningful pixel range

use crate::device::PixelRange;

/// Highest reading in a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    /// 1-based pixel number
    pub pixel: usize,
    /// Counts at that pixel
    pub counts: u16,
}

/// Find the highest reading of `counts` within `range`
///
/// Ties resolve to the lowest pixel number. Returns `None` when the range does
/// not overlap the frame.
pub fn find_peak(counts: &[u16], range: PixelRange) -> Option<Peak> {
    let start = usize::from(range.start).max(1);
    let stop = usize::from(range.stop).min(counts.len());
    if start > stop {
        return None;
    }

    let mut peak = Peak {
        pixel: start,
        counts: counts[start - 1],
    };
    for (offset, &value) in counts[start..stop].iter().enumerate() {
        if value > peak.counts {
            peak = Peak {
                pixel: start + 1 + offset,
                counts: value,
            };
        }
    }
    Some(peak)
}

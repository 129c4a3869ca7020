//! Frame timing profiles and output-target selection.

/// Frame clock geometry, in CPU ticks.
///
/// A frame is `v_total` ticks long. VBLANK covers
/// `[vblank_start, vblank_len)`; rendering for the next frame is kicked off
/// when the clock leaves VBLANK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub vblank_start: u32,
    pub vblank_len: u32,
    pub v_total: u32,
}

impl Timing {
    /// PAL timing, the chip's default configuration.
    pub const PAL: Timing = Timing {
        vblank_start: 0,
        vblank_len: 22_036,
        v_total: 106_392,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::PAL
    }
}

/// Which output path the compositor drives.
///
/// The hardware can feed a TV encoder and an LCD controller; the two read
/// different bits of the output-select register. Only the bit mapping
/// differs, the merge itself is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Tv,
    Lcd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pal_profile_is_the_default() {
        let timing = Timing::default();
        assert_eq!(timing.vblank_start, 0);
        assert_eq!(timing.vblank_len, 22_036);
        assert_eq!(timing.v_total, 106_392);
    }
}

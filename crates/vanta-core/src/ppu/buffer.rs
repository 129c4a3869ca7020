//! Double-buffered output framebuffer.
//!
//! The render worker fills the back plane and presents it by flipping an
//! atomic front index; readers take the front plane. This is the simple
//! model with no acknowledgement: a presenter that wants tear-free frames
//! checks `Ppu::is_render_done` (or watches `frame_seq`) before copying the
//! front plane out.

use core::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::mem_block::OutputPlane;

pub(crate) struct FrameBuffer {
    planes: [UnsafeCell<OutputPlane>; 2],
    /// Index of the published **front** plane.
    front_index: AtomicUsize,
    /// Monotonic counter, incremented on every present.
    frame_seq: AtomicUsize,
}

// SAFETY: the planes are only ever written through `render_into`, which is
// called from the single render worker and touches only the non-front plane;
// readers only touch the front plane. The atomic flip is the hand-over.
unsafe impl Send for FrameBuffer {}
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    pub(crate) fn new() -> Self {
        Self {
            planes: [
                UnsafeCell::new(OutputPlane::new()),
                UnsafeCell::new(OutputPlane::new()),
            ],
            front_index: AtomicUsize::new(0),
            frame_seq: AtomicUsize::new(0),
        }
    }

    /// The published front plane.
    pub(crate) fn front_slice(&self) -> &[u32] {
        let idx = self.front_index.load(Ordering::Acquire);
        // SAFETY: the front plane is never the worker's write target.
        unsafe { (*self.planes[idx].get()).as_slice() }
    }

    /// Number of frames presented so far.
    pub(crate) fn frame_seq(&self) -> usize {
        self.frame_seq.load(Ordering::Acquire)
    }

    /// Fills the back plane via `fill` and presents it.
    ///
    /// Only the render worker may call this; that single-writer rule is what
    /// the `Sync` impl relies on.
    pub(crate) fn render_into(&self, fill: impl FnOnce(&mut [u32])) {
        let back = self.front_index.load(Ordering::Acquire) ^ 1;
        // SAFETY: `back` is not the front plane, and there is one writer.
        let plane = unsafe { &mut *self.planes[back].get() };
        fill(plane.as_mut_slice());
        self.front_index.store(back, Ordering::Release);
        self.frame_seq.fetch_add(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presenting_flips_planes_and_bumps_the_sequence() {
        let buffer = FrameBuffer::new();
        assert_eq!(buffer.frame_seq(), 0);
        assert!(buffer.front_slice().iter().all(|&p| p == 0));

        buffer.render_into(|out| out.fill(0xFF00_0000));
        assert_eq!(buffer.frame_seq(), 1);
        assert!(buffer.front_slice().iter().all(|&p| p == 0xFF00_0000));

        buffer.render_into(|out| out.fill(0xFFFF_FFFF));
        assert_eq!(buffer.frame_seq(), 2);
        assert!(buffer.front_slice().iter().all(|&p| p == 0xFFFF_FFFF));
    }

    #[test]
    fn the_front_plane_survives_a_back_plane_fill_in_progress() {
        let buffer = FrameBuffer::new();
        buffer.render_into(|out| out.fill(0x1111_1111));
        buffer.render_into(|out| {
            // Mid-render the previously presented frame is still readable.
            assert!(buffer.front_slice().iter().all(|&p| p == 0x1111_1111));
            out.fill(0x2222_2222);
        });
        assert!(buffer.front_slice().iter().all(|&p| p == 0x2222_2222));
    }
}

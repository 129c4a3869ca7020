//! Shared helpers for the end-to-end rendering tests.

use std::{
    thread,
    time::{Duration, Instant},
};

use vanta_core::{PhysicalMemory, Ppu, Timing, memory::regs};

/// A flat test ROM serving the whole 24-bit physical space; unmapped
/// addresses read as zero.
pub struct TestRom {
    bytes: Vec<u8>,
}

impl TestRom {
    pub fn new(size: usize) -> Self {
        Self { bytes: vec![0; size] }
    }

    /// Copies `data` into the ROM at `addr`.
    pub fn load(&mut self, addr: usize, data: &[u8]) {
        self.bytes[addr..addr + data.len()].copy_from_slice(data);
    }

    /// Fills `len` bytes at `addr` with one value.
    pub fn fill(&mut self, addr: usize, len: usize, value: u8) {
        self.bytes[addr..addr + len].fill(value);
    }
}

impl PhysicalMemory for TestRom {
    fn read_physical(&self, addr: u32) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }
}

/// Writes a run of bytes through the VRAM window port.
pub fn write_vram(ppu: &mut Ppu, addr: u16, bytes: &[u8]) {
    ppu.write(regs::VRAM_ADDR_HI, (addr >> 8) as u8);
    ppu.write(regs::VRAM_ADDR_LO, (addr & 0xFF) as u8);
    for &b in bytes {
        ppu.write(regs::VRAM_DATA, b);
    }
}

/// Writes a run of bytes through the SPRAM window port.
///
/// The port skips the two reserved bytes of each entry by itself, so writing
/// six bytes per sprite lands consecutive sprites correctly.
pub fn write_spram(ppu: &mut Ppu, addr: u16, bytes: &[u8]) {
    ppu.write(regs::SPRAM_ADDR_HI, (addr >> 8) as u8);
    ppu.write(regs::SPRAM_ADDR_LO, (addr & 0xFF) as u8);
    for &b in bytes {
        ppu.write(regs::SPRAM_DATA, b);
    }
}

/// Ticks through one whole frame and blocks until the render worker has
/// presented it.
pub fn render_one_frame(ppu: &mut Ppu) {
    let before = ppu.frame_seq();
    for _ in 0..Timing::PAL.v_total {
        ppu.tick();
    }
    let deadline = Instant::now() + Duration::from_secs(10);
    while ppu.frame_seq() == before {
        assert!(Instant::now() < deadline, "render worker never presented a frame");
        thread::sleep(Duration::from_millis(1));
    }
    assert!(ppu.is_render_done());
}

/// The presented pixel at (x, y).
pub fn pixel(ppu: &Ppu, x: usize, y: usize) -> u32 {
    ppu.render_buffer()[y * vanta_core::SCREEN_WIDTH + x]
}

/// Asserts that every pixel inside `rect` (x, y, w, h) equals `expected`.
pub fn assert_rect(ppu: &Ppu, rect: (usize, usize, usize, usize), expected: u32) {
    let (rx, ry, rw, rh) = rect;
    for y in ry..ry + rh {
        for x in rx..rx + rw {
            assert_eq!(
                pixel(ppu, x, y),
                expected,
                "pixel ({x}, {y}) inside rect {rect:?}"
            );
        }
    }
}

pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

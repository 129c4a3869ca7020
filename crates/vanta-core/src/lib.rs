//! Emulation core for the picture processing unit (PPU) of a VT168-class
//! console-on-chip.
//!
//! The VT168 family is an NES-derived SoC with a substantially extended
//! graphics unit: four intermediate layers instead of one, two parallel
//! palette banks carried side by side through the whole pipeline, packed
//! 2/4/6/8/16 bpp character data fetched from physical ROM, and a
//! frame-at-a-time renderer that runs on its own thread while the CPU keeps
//! ticking.
//!
//! The crate exposes a single device type, [`Ppu`], which owns the render
//! worker and presents the CPU-visible side of the chip: the 256-entry
//! register file with its windowed VRAM/SPRAM data ports, the frame clock,
//! and the presented ARGB8888 output buffer. Physical ROM access is consumed
//! through the [`PhysicalMemory`] capability so the core never depends on a
//! concrete bus implementation.

pub mod config;
pub mod mem_block;
pub mod memory;
pub mod ppu;

pub use config::{OutputTarget, Timing};
pub use memory::PhysicalMemory;
pub use ppu::{Ppu, PpuBuilder, SCREEN_HEIGHT, SCREEN_WIDTH};

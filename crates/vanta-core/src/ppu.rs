//! The CPU-visible PPU device.
//!
//! **Execution model.** The PPU is frame-oriented: a tick counter driven by
//! the CPU clock walks through VBLANK and the active picture, and when the
//! clock leaves VBLANK the device signals its render worker to produce one
//! complete 256x240 frame from the state the CPU has set up. The worker
//! shadows the register file, VRAM and SPRAM under a mutex at the start of
//! each pass, so the CPU can keep writing while a frame is in flight; such
//! writes take effect on the next frame at the earliest. VBLANK is the
//! intended window for mutating video memory.
//!
//! **Memory ports.** The CPU reaches VRAM and SPRAM through windowed data
//! ports: an address register pair plus a data register that auto-increments
//! on writes. Reads return the byte under the window without moving it.

pub(crate) mod background;
mod buffer;
pub mod chars;
pub(crate) mod color;
pub(crate) mod compositor;
pub(crate) mod layer;
pub mod registers;
pub(crate) mod sprite;
mod worker;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Sender, unbounded};
use parking_lot::Mutex;

use crate::{
    config::{OutputTarget, Timing},
    mem_block::{RegisterFile, Spram, Vram},
    memory::{PhysicalMemory, Port, regs, vram},
};

use self::{
    buffer::FrameBuffer,
    registers::Control,
    worker::{ControlMessage, RenderWorker},
};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub(crate) const LAYER_WIDTH: usize = 256;
pub(crate) const LAYER_HEIGHT: usize = 256;

/// The CPU-visible memories: register file, VRAM and SPRAM.
///
/// This is both the live state the CPU mutates and, via a per-frame copy,
/// the shadow the render worker reads.
#[derive(Debug, Clone, Default)]
pub(crate) struct PortState {
    pub(crate) regs: RegisterFile,
    pub(crate) vram: Vram,
    pub(crate) spram: Spram,
}

impl PortState {
    fn spram_addr(&self) -> u16 {
        ((self.regs[regs::SPRAM_ADDR_HI as usize] as u16 & 0x07) << 8)
            | self.regs[regs::SPRAM_ADDR_LO as usize] as u16
    }

    fn vram_addr(&self) -> u16 {
        ((self.regs[regs::VRAM_ADDR_HI as usize] as u16 & 0x1F) << 8)
            | self.regs[regs::VRAM_ADDR_LO as usize] as u16
    }

    fn read_spram_port(&self) -> u8 {
        self.spram[self.spram_addr() as usize]
    }

    fn read_vram_port(&self) -> u8 {
        self.vram[self.vram_addr() as usize]
    }

    fn write_spram_port(&mut self, data: u8) {
        let mut addr = self.spram_addr();
        self.spram[addr as usize] = data;
        addr += 1;
        // Only six of the eight bytes per sprite entry exist; the window
        // steps over the reserved pair on every data write. The datasheet
        // leaves open whether real silicon does this outside DMA.
        if addr & 0x07 >= 6 {
            addr = (addr & !0x07) + 8;
        }
        self.regs[regs::SPRAM_ADDR_HI as usize] = ((addr >> 8) & 0x07) as u8;
        self.regs[regs::SPRAM_ADDR_LO as usize] = (addr & 0xFF) as u8;
    }

    fn write_vram_port(&mut self, data: u8) {
        let mut addr = self.vram_addr();
        self.vram[addr as usize] = data;
        addr = (addr + 1) & vram::ADDR_MASK;
        self.regs[regs::VRAM_ADDR_HI as usize] = (addr >> 8) as u8;
        self.regs[regs::VRAM_ADDR_LO as usize] = (addr & 0xFF) as u8;
    }
}

/// State shared between the CPU side and the render worker.
pub(crate) struct Shared {
    pub(crate) state: Mutex<PortState>,
    pub(crate) render_done: AtomicBool,
}

/// Builder for a [`Ppu`]; `build()` spawns the render worker.
pub struct PpuBuilder {
    memory: Arc<dyn PhysicalMemory>,
    timing: Timing,
    target: OutputTarget,
}

impl PpuBuilder {
    /// Selects a frame timing profile (PAL by default).
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Selects which output path the compositor drives (TV by default).
    pub fn output_target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    pub fn build(self) -> Ppu {
        let shared = Arc::new(Shared {
            state: Mutex::new(PortState::default()),
            render_done: AtomicBool::new(false),
        });
        let framebuffer = Arc::new(FrameBuffer::new());
        let (ctrl_tx, ctrl_rx) = unbounded::<ControlMessage>();

        let worker_shared = Arc::clone(&shared);
        let worker_framebuffer = Arc::clone(&framebuffer);
        let memory = Arc::clone(&self.memory);
        let target = self.target;
        let join = thread::spawn(move || {
            let mut worker =
                RenderWorker::new(ctrl_rx, worker_shared, memory, worker_framebuffer, target);
            worker.run();
        });

        Ppu {
            shared,
            framebuffer,
            ctrl_tx,
            join: Some(join),
            timing: self.timing,
            ticks: 0,
            nmi_pending: false,
        }
    }
}

/// The picture processing unit.
///
/// All methods are meant to be called from the single CPU-emulation thread;
/// the rendering happens on the worker this device owns.
pub struct Ppu {
    shared: Arc<Shared>,
    framebuffer: Arc<FrameBuffer>,
    ctrl_tx: Sender<ControlMessage>,
    join: Option<JoinHandle<()>>,
    timing: Timing,
    /// Frame clock, in CPU ticks since the last wrap.
    ticks: u32,
    /// VBLANK NMI latch, raised at wrap, cleared by a status read.
    nmi_pending: bool,
}

impl Ppu {
    pub fn builder(memory: Arc<dyn PhysicalMemory>) -> PpuBuilder {
        PpuBuilder {
            memory,
            timing: Timing::default(),
            target: OutputTarget::default(),
        }
    }

    /// Constructs a PPU with default (PAL, TV) configuration.
    pub fn new(memory: Arc<dyn PhysicalMemory>) -> Self {
        Self::builder(memory).build()
    }

    /// CPU read of one of the 256 registers.
    pub fn read(&mut self, addr: u8) -> u8 {
        match Port::decode(addr) {
            Port::Status => {
                // Reading status acknowledges a pending VBLANK NMI.
                self.nmi_pending = false;
                (self.is_vblank() as u8) << 7
            }
            Port::SpramData => self.shared.state.lock().read_spram_port(),
            Port::VramData => self.shared.state.lock().read_vram_port(),
            Port::Plain(a) => self.shared.state.lock().regs[a as usize],
        }
    }

    /// CPU write to one of the 256 registers.
    pub fn write(&mut self, addr: u8, data: u8) {
        let mut state = self.shared.state.lock();
        match Port::decode(addr) {
            Port::SpramData => state.write_spram_port(data),
            Port::VramData => state.write_vram_port(data),
            Port::Status | Port::Plain(_) => state.regs[addr as usize] = data,
        }
    }

    /// Advances the frame clock by one CPU tick.
    ///
    /// Wrapping the clock raises the VBLANK NMI latch; leaving VBLANK kicks
    /// off one render pass.
    pub fn tick(&mut self) {
        self.ticks += 1;
        if self.ticks >= self.timing.v_total {
            self.ticks = 0;
            self.nmi_pending = true;
        } else if self.ticks == self.timing.vblank_len {
            let _ = self.ctrl_tx.send(ControlMessage::RenderFrame);
        }
    }

    /// True while the frame clock is inside the vertical blanking interval.
    pub fn is_vblank(&self) -> bool {
        self.ticks >= self.timing.vblank_start && self.ticks < self.timing.vblank_len
    }

    /// True when the most recently signalled render pass has finished.
    pub fn is_render_done(&self) -> bool {
        self.shared.render_done.load(Ordering::Acquire)
    }

    /// Whether software has enabled the VBLANK NMI (control register bit 0).
    pub fn nmi_enabled(&self) -> bool {
        let state = self.shared.state.lock();
        Control::from_bits_retain(state.regs[regs::CONTROL as usize]).nmi_enabled()
    }

    /// Level of the VBLANK NMI latch; cleared by a status read.
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// The most recently presented 256x240 ARGB8888 frame, row-major.
    ///
    /// Check [`Ppu::is_render_done`] (or watch [`Ppu::frame_seq`]) before
    /// copying the frame out if tearing matters.
    pub fn render_buffer(&self) -> &[u32] {
        self.framebuffer.front_slice()
    }

    /// Number of frames presented so far.
    pub fn frame_seq(&self) -> usize {
        self.framebuffer.frame_seq()
    }

    /// Shuts the render worker down and joins it. Idempotent; also runs on
    /// drop.
    pub fn stop(&mut self) {
        let _ = self.ctrl_tx.send(ControlMessage::Stop);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for Ppu {
    fn drop(&mut self) {
        self.stop();
    }
}

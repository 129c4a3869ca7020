//! The render worker.
//!
//! One pass per frame-start signal: shadow the CPU-visible state under the
//! mutex, clear the layer planes, run both background passes and the sprite
//! pass, merge, present. The worker owns the layer planes and the decode
//! scratch buffer outright; nothing else ever touches them.

use std::sync::{Arc, atomic::Ordering};

use crossbeam_channel::Receiver;
use tracing::{info, trace};

use crate::{
    config::OutputTarget,
    mem_block::LayerPlane,
    memory::PhysicalMemory,
    ppu::{
        PortState, Shared, background, buffer::FrameBuffer, compositor, layer::TRANSPARENT_CELL,
        sprite,
    },
};

/// Messages from the CPU side to the render worker.
pub(crate) enum ControlMessage {
    /// Start exactly one render pass.
    RenderFrame,
    /// Exit without rendering.
    Stop,
}

pub(crate) struct RenderWorker {
    ctrl_rx: Receiver<ControlMessage>,
    shared: Arc<Shared>,
    memory: Arc<dyn PhysicalMemory>,
    framebuffer: Arc<FrameBuffer>,
    target: OutputTarget,
    layers: [LayerPlane; 4],
    /// Private shadow of registers, VRAM and SPRAM for the current pass.
    snapshot: PortState,
    scratch: Vec<u8>,
}

impl RenderWorker {
    pub(crate) fn new(
        ctrl_rx: Receiver<ControlMessage>,
        shared: Arc<Shared>,
        memory: Arc<dyn PhysicalMemory>,
        framebuffer: Arc<FrameBuffer>,
        target: OutputTarget,
    ) -> Self {
        Self {
            ctrl_rx,
            shared,
            memory,
            framebuffer,
            target,
            layers: Default::default(),
            snapshot: PortState::default(),
            scratch: Vec::with_capacity(512),
        }
    }

    pub(crate) fn run(&mut self) {
        info!("render worker started");
        loop {
            match self.ctrl_rx.recv() {
                Ok(ControlMessage::RenderFrame) => self.render_pass(),
                Ok(ControlMessage::Stop) | Err(_) => break,
            }
        }
        info!("render worker stopped");
    }

    fn render_pass(&mut self) {
        self.shared.render_done.store(false, Ordering::Release);

        // Shadow everything the pass reads in one mutex acquisition; CPU
        // writes landing after this point belong to the next frame.
        {
            let state = self.shared.state.lock();
            self.snapshot.regs.copy_from_slice(&state.regs);
            self.snapshot.vram.copy_from_slice(&state.vram);
            self.snapshot.spram.copy_from_slice(&state.spram);
        }

        for plane in &mut self.layers {
            plane.fill(TRANSPARENT_CELL);
        }

        // Layer 0 passes last so its blits win within a shared plane.
        for idx in (0..2).rev() {
            background::render_background(
                &self.snapshot,
                self.memory.as_ref(),
                &mut self.layers,
                idx,
                &mut self.scratch,
            );
        }
        sprite::render_sprites(
            &self.snapshot,
            self.memory.as_ref(),
            &mut self.layers,
            &mut self.scratch,
        );

        self.framebuffer.render_into(|out| {
            compositor::merge_layers(&self.layers, &self.snapshot.regs, self.target, out)
        });

        self.shared.render_done.store(true, Ordering::Release);
        trace!(frame = self.framebuffer.frame_seq(), "frame rendered");
    }
}

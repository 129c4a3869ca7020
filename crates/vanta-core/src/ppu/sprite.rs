//! Sprite rendering.
//!
//! SPRAM holds 240 eight-byte entries (six bytes defined, two reserved).
//! Entries are drawn from the last index down so that lower-numbered sprites
//! composite on top, and each entry chooses its own destination layer.

use crate::{
    mem_block::LayerPlane,
    memory::{PhysicalMemory, regs, spram, vram},
    ppu::{
        PortState,
        chars::{self, PixelFormat},
        layer,
        registers::SpriteCtrl,
    },
};

/// One decoded SPRAM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpriteEntry {
    /// Character vector; 0 marks an unused entry.
    pub(crate) vector: u16,
    /// Palette index within the 16-entry sprite palettes.
    pub(crate) palette: u8,
    /// Signed screen position.
    pub(crate) x: i32,
    pub(crate) y: i32,
    /// Destination layer plane (0..=3).
    pub(crate) layer: usize,
    /// Per-sprite palette-bank select (bank 1 when set).
    pub(crate) bank1: bool,
}

impl SpriteEntry {
    pub(crate) fn parse(raw: &[u8]) -> Self {
        let vector = ((raw[1] as u16 & 0x0F) << 8) | raw[0] as u16;
        let palette = raw[1] >> 4;
        let mut x = raw[2] as i32;
        if raw[3] & 0x01 != 0 {
            x -= 256;
        }
        let layer = ((raw[3] >> 3) & 0x03) as usize;
        let mut y = raw[4] as i32;
        if raw[5] & 0x01 != 0 {
            y -= 256;
        }
        let bank1 = raw[5] & 0x02 != 0;
        Self { vector, palette, x, y, layer, bank1 }
    }
}

/// Renders all sprite entries into the layer planes. Sprites always decode
/// as 4 bpp indexed data.
pub(crate) fn render_sprites(
    snapshot: &PortState,
    mem: &dyn PhysicalMemory,
    layers: &mut [LayerPlane; 4],
    scratch: &mut Vec<u8>,
) {
    let r = &snapshot.regs;
    let ctrl = SpriteCtrl::from_bits_retain(r[regs::SPRITE_CTRL as usize]);
    if !ctrl.enabled() {
        return;
    }
    let shared_banks = ctrl.shared_banks();
    let (width, height) = ctrl.dimensions();
    let segment =
        ((r[regs::SPRITE_SEG_HI as usize] & 0x0F) as u16) << 8 | r[regs::SPRITE_SEG_LO as usize] as u16;

    for idx in (0..spram::ENTRY_COUNT).rev() {
        let base = idx * spram::ENTRY_SIZE;
        let entry = SpriteEntry::parse(&snapshot.spram[base..base + spram::ENTRY_SIZE]);
        if entry.vector == 0 {
            continue;
        }

        chars::fetch_char_data(
            mem,
            segment,
            entry.vector,
            width,
            height,
            PixelFormat::Idx16,
            false,
            scratch,
        );

        let base0 = vram::PALETTE_BANK0_BASE + 32 * entry.palette as usize;
        let base1 = vram::PALETTE_BANK1_BASE + 32 * entry.palette as usize;
        let pal0 = (shared_banks || !entry.bank1).then(|| &snapshot.vram[base0..base0 + 32]);
        let pal1 = (shared_banks || entry.bank1).then(|| &snapshot.vram[base1..base1 + 32]);

        layer::blit(
            scratch,
            width,
            height,
            PixelFormat::Idx16,
            &mut layers[entry.layer],
            entry.x,
            entry.y,
            pal0,
            pal1,
        );
    }
}

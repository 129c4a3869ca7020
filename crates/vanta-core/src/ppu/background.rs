//! Background layer rendering.
//!
//! Each of the two background layers walks its visible tile grid, resolves
//! every grid position to a tile-map cell (or to nothing, for positions that
//! fall off the configured page arrangement), fetches the referenced
//! character and blits it into the layer plane selected by the cell's depth.

use crate::{
    mem_block::LayerPlane,
    memory::{PhysicalMemory, regs, vram},
    ppu::{
        PortState,
        chars::{self, PixelFormat},
        layer,
        registers::{BgCtrl1, BgCtrl2, LayerPaletteSelect, ScrollMode},
    },
};

/// A resolved tile-map position: the VRAM address of the 2-byte cell, and
/// whether the position is mapped at all in the current page arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileSlot {
    pub(crate) addr: u16,
    pub(crate) mapped: bool,
}

/// Computes the tile-map cell address for tile (`tx`, `ty`).
///
/// The map layout branches on tile shape: 8x8 maps use 32x32-cell pages at
/// `0x000`/`0x800`, 16x16 maps use 16x16-cell pages at `0x200` steps with
/// the layer folded into bit 11, and bitmap rows use one cell per scanline.
/// `x8`/`y8` swap which page is "home" for the scrolling arrangements.
pub(crate) fn tile_map_slot(
    tx: i32,
    ty: i32,
    x8: bool,
    y8: bool,
    tile_width: usize,
    bitmap: bool,
    layer: usize,
    mode: ScrollMode,
) -> TileSlot {
    if bitmap {
        debug_assert_eq!(layer, 0, "bitmap mode is a layer-0 feature");
        let offset = (ty % 256) as u16 * 2;
        let (base, mapped) = match mode {
            ScrollMode::Fixed => (
                ((layer as u16) << 11) | ((y8 as u16) << 10) | ((x8 as u16) << 9),
                tx < 1 && ty < 256,
            ),
            ScrollMode::Horizontal => {
                (if (tx > 1) != x8 { 0x200 } else { 0x000 }, ty < 256)
            }
            ScrollMode::Vertical => {
                (if (ty > 256) != y8 { 0x200 } else { 0x000 }, tx < 1)
            }
            ScrollMode::FourPane => (
                (if (tx > 1) != x8 { 0x200 } else { 0x000 })
                    | (if (ty > 256) != y8 { 0x400 } else { 0x000 }),
                true,
            ),
        };
        TileSlot { addr: base + offset, mapped }
    } else if tile_width == 8 {
        let offset = ((tx % 32) + 32 * (ty % 32)) as u16 * 2;
        let (base, mapped) = match mode {
            ScrollMode::Fixed => (
                if !y8 && !x8 { 0x000 } else { 0x800 },
                tx < 32 && ty < 32,
            ),
            ScrollMode::Horizontal => {
                (if (tx > 32) != x8 { 0x800 } else { 0x000 }, ty < 32)
            }
            ScrollMode::Vertical => {
                (if (ty > 32) != y8 { 0x800 } else { 0x000 }, tx < 32)
            }
            // The datasheet defines no 2x2 page arrangement for 8x8 maps.
            ScrollMode::FourPane => {
                panic!("4-pane scroll is not defined for 8x8 tile maps")
            }
        };
        TileSlot { addr: base + offset, mapped }
    } else {
        let offset = ((tx % 16) + 16 * (ty % 16)) as u16 * 2;
        let layer_bits = (layer as u16) << 11;
        let x_page = if (tx > 16) != x8 { 0x200 } else { 0x000 };
        let y_page = |bit: u16| if (ty > 16) != y8 { bit } else { 0x000 };
        let (base, mapped) = match mode {
            ScrollMode::Fixed => (
                layer_bits | ((y8 as u16) << 10) | ((x8 as u16) << 9),
                tx < 16 && ty < 16,
            ),
            ScrollMode::Horizontal => (layer_bits | x_page, ty < 16),
            ScrollMode::Vertical => (layer_bits | y_page(0x200), tx < 16),
            ScrollMode::FourPane => (layer_bits | x_page | y_page(0x400), true),
        };
        TileSlot { addr: base + offset, mapped }
    }
}

/// Depth (destination plane) and palette-bank derivation for one tile cell.
///
/// Two register bits and the cell's high nibble are multiplexed depending on
/// the layer's palette-source mode and pixel format.
fn derive_depth_and_bank(ctrl2: BgCtrl2, fmt: PixelFormat, cell_pal: u8) -> (u8, u8) {
    let field = ctrl2.bank_field();
    if ctrl2.cell_palette() {
        let bank = match fmt {
            PixelFormat::Idx16 => cell_pal,
            PixelFormat::Idx64 => cell_pal >> 2,
            _ => 0,
        };
        (field, bank)
    } else {
        let bank = match fmt {
            PixelFormat::Idx16 => field | (cell_pal >> 2),
            PixelFormat::Idx64 => cell_pal >> 2,
            _ => 0,
        };
        (cell_pal & 0x03, bank)
    }
}

/// Renders background layer `layer_idx` (0 or 1) into the layer planes.
pub(crate) fn render_background(
    snapshot: &PortState,
    mem: &dyn PhysicalMemory,
    layers: &mut [LayerPlane; 4],
    layer_idx: usize,
    scratch: &mut Vec<u8>,
) {
    let r = &snapshot.regs;
    let ctrl1 = BgCtrl1::from_bits_retain(r[regs::BG_CTRL1[layer_idx] as usize]);
    let ctrl2 = BgCtrl2::from_bits_retain(r[regs::BG_CTRL2[layer_idx] as usize]);
    if !ctrl2.enabled() {
        return;
    }

    // High color and bitmap mode exist only on layer 0; layer 1 silently
    // ignores the bits.
    let fmt = if layer_idx == 0 && ctrl1.high_color() {
        PixelFormat::Argb1555
    } else {
        ctrl2.pixel_format()
    };
    let bitmap = layer_idx == 0 && ctrl2.bitmap();

    let pal_sel = LayerPaletteSelect::from_bits_retain(r[regs::LAYER_PAL_SELECT as usize]);
    let bank0_out = pal_sel.bank0_enabled(layer_idx);
    let bank1_out = pal_sel.bank1_enabled(layer_idx);

    let x8 = ctrl1.x8();
    let y8 = ctrl1.y8();
    let x_offset = r[regs::BG_X[layer_idx] as usize] as i32 - if x8 { 256 } else { 0 };
    let y_offset = r[regs::BG_Y[layer_idx] as usize] as i32 - if y8 { 256 } else { 0 };
    let mode = ctrl1.scroll_mode();

    let (tile_w, tile_h): (i32, i32) = if bitmap {
        (256, 1)
    } else if ctrl2.tile_16() {
        (16, 16)
    } else {
        (8, 8)
    };

    // Scrolling arrangements extend the tile grid a full page into the
    // negative axis so the wrapped page is drawn too.
    let y0 = if !bitmap && matches!(mode, ScrollMode::Vertical | ScrollMode::FourPane) {
        -256
    } else {
        0
    };
    let x0 = if !bitmap && matches!(mode, ScrollMode::Horizontal | ScrollMode::FourPane) {
        -256
    } else {
        0
    };

    let segment = ((r[regs::BG_SEG_HI[layer_idx] as usize] & 0x0F) as u16) << 8
        | r[regs::BG_SEG_LO[layer_idx] as usize] as u16;

    let mut y = y0;
    while y < 256 {
        let mut x = x0;
        while x < 256 {
            let tx = (x - x0) / tile_w;
            let ty = (y - y0) / tile_h;
            let slot = tile_map_slot(tx, ty, x8, y8, tile_w as usize, bitmap, layer_idx, mode);
            if !slot.mapped {
                x += tile_w;
                continue;
            }

            let addr = slot.addr as usize;
            let cell = u16::from_le_bytes([snapshot.vram[addr], snapshot.vram[addr + 1]]);
            let vector = cell & 0x0FFF;
            let cell_pal = (cell >> 12) as u8;
            if vector == 0 {
                // Vector 0 marks an empty cell.
                x += tile_w;
                continue;
            }

            let (depth, pal_bank) = derive_depth_and_bank(ctrl2, fmt, cell_pal);
            chars::fetch_char_data(
                mem,
                segment,
                vector,
                tile_w as usize,
                tile_h as usize,
                fmt,
                bitmap,
                scratch,
            );

            let pal_offset = match fmt {
                PixelFormat::Idx16 => pal_bank as usize * 32,
                PixelFormat::Idx64 => pal_bank as usize * 128,
                _ => 0,
            };
            let pal0 = bank0_out
                .then(|| &snapshot.vram[vram::PALETTE_BANK0_BASE + pal_offset..vram::SIZE]);
            let pal1 = bank1_out.then(|| {
                &snapshot.vram[vram::PALETTE_BANK1_BASE + pal_offset..vram::PALETTE_BANK0_BASE]
            });

            layer::blit(
                scratch,
                tile_w as usize,
                tile_h as usize,
                fmt,
                &mut layers[(depth & 0x03) as usize],
                x + x_offset,
                y + y_offset,
                pal0,
                pal1,
            );
            x += tile_w;
        }
        y += tile_h;
    }
}

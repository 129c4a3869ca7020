//! The blitter: decoded characters into dual-bank layer planes.
//!
//! A layer cell packs two TRGB1555 samples, one per palette bank: bits 15..0
//! hold the bank-0 sample and bits 31..16 the bank-1 sample. A blit only
//! overwrites the half whose source sample is solid, so transparency is a
//! per-bank property of the source and the two banks move through the
//! pipeline independently.

use crate::ppu::{
    LAYER_HEIGHT, LAYER_WIDTH,
    chars::{PackedCursor, PixelFormat},
    color,
};

use crate::mem_block::LayerPlane;

/// A cleared cell: transparent in both banks.
pub(crate) const TRANSPARENT_CELL: u32 = 0x8000_8000;

/// Draws a packed source raster at (`dst_x`, `dst_y`) of a layer plane.
///
/// Indexed formats resolve each texel through the provided palettes; a bank
/// whose palette is absent is left untouched. Index 0 is transparent in
/// both banks regardless of palette contents. Direct-color sources feed the
/// same word to both banks. Texels landing outside the plane are dropped
/// individually; the source cursor still advances across them.
pub(crate) fn blit(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    fmt: PixelFormat,
    dst: &mut LayerPlane,
    dst_x: i32,
    dst_y: i32,
    pal0: Option<&[u8]>,
    pal1: Option<&[u8]>,
) {
    let mut cursor = PackedCursor::new(src);
    for sy in 0..src_height {
        let dy = dst_y + sy as i32;
        for sx in 0..src_width {
            let dx = dst_x + sx as i32;

            let (bank0, bank1) = if fmt == PixelFormat::Argb1555 {
                let word = cursor.next_word();
                (word, word)
            } else {
                let index = cursor.next_index(fmt) as usize;
                if index == 0 {
                    (color::TRANSPARENT, color::TRANSPARENT)
                } else {
                    let lookup = |pal: Option<&[u8]>| {
                        pal.map_or(color::TRANSPARENT, |p| {
                            u16::from_le_bytes([p[2 * index], p[2 * index + 1]])
                        })
                    };
                    (lookup(pal0), lookup(pal1))
                }
            };

            if dx < 0 || dx >= LAYER_WIDTH as i32 || dy < 0 || dy >= LAYER_HEIGHT as i32 {
                continue;
            }
            let cell = &mut dst[dy as usize * LAYER_WIDTH + dx as usize];
            if color::is_solid(bank0) {
                *cell = (*cell & 0xFFFF_0000) | bank0 as u32;
            }
            if color::is_solid(bank1) {
                *cell = (*cell & 0x0000_FFFF) | ((bank1 as u32) << 16);
            }
        }
    }
}

//! Layer merge and ARGB8888 conversion.

use crate::{
    config::OutputTarget,
    mem_block::{LayerPlane, RegisterFile},
    memory::regs,
    ppu::{LAYER_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH, color, registers::OutputSelect},
};

/// Flattens the four layer planes into the 256x240 ARGB8888 output.
///
/// For each pixel the planes are folded from layer 3 down to layer 0,
/// keeping the last solid sample per palette bank, so lower-numbered layers
/// have priority. The output-select register then picks the final sample:
/// the blended pair when blending is enabled, with solid bank-0 and then
/// solid bank-1 samples overriding in that order.
pub(crate) fn merge_layers(
    layers: &[LayerPlane; 4],
    r: &RegisterFile,
    target: OutputTarget,
    out: &mut [u32],
) {
    let select = OutputSelect::from_bits_retain(r[regs::OUTPUT_SELECT as usize]);
    let bank0_out = select.bank0_enabled(target);
    let bank1_out = select.bank1_enabled(target);
    let blend_banks = select.blend_enabled(target);

    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let mut bank0 = color::TRANSPARENT;
            let mut bank1 = color::TRANSPARENT;
            for plane in layers.iter().rev() {
                let cell = plane[y * LAYER_WIDTH + x];
                let lo = cell as u16;
                let hi = (cell >> 16) as u16;
                if color::is_solid(lo) {
                    bank0 = lo;
                }
                if color::is_solid(hi) {
                    bank1 = hi;
                }
            }

            let mut res = color::TRANSPARENT;
            if blend_banks && bank0_out && bank1_out {
                res = color::blend(bank0, bank1);
            }
            if bank0_out && color::is_solid(bank0) {
                res = bank0;
            }
            if bank1_out && color::is_solid(bank1) {
                res = bank1;
            }
            out[y * SCREEN_WIDTH + x] = color::to_argb8888(res);
        }
    }
}

//! Bit layouts of the CPU-visible control registers.
//!
//! The register file itself is a flat byte array (any address can be written
//! and read back); these types give the renderer a typed view of the bytes
//! it cares about. All of them are built with `from_bits_retain` so stray
//! bits survive a read-back.

use bitflags::bitflags;

use crate::{config::OutputTarget, ppu::chars::PixelFormat};

bitflags! {
    /// Control register (`0x00`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u8 {
        /// Enables the VBLANK NMI (bit 0).
        const NMI_ENABLE = 0b0000_0001;
    }
}

impl Control {
    pub fn nmi_enabled(self) -> bool {
        self.contains(Control::NMI_ENABLE)
    }
}

/// Geometric arrangement of the tile map pages for a background layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// One page, no wrapping.
    Fixed,
    /// Two pages side by side.
    Horizontal,
    /// Two pages stacked.
    Vertical,
    /// Four pages in a 2x2 arrangement.
    FourPane,
}

bitflags! {
    /// Background control 1 (`0x12` / `0x16`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// . . . H s s Y X
    /// ```
    /// - `X` / `Y`: scroll offset sign bits (offset - 256 when set)
    /// - `s s`: scroll mode
    /// - `H`: high color (ARGB1555 background, layer 0 only)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BgCtrl1: u8 {
        const X8 = 0b0000_0001;
        const Y8 = 0b0000_0010;
        const SCROLL_MODE = 0b0000_1100;
        const HIGH_COLOR = 0b0001_0000;
    }
}

impl BgCtrl1 {
    pub fn x8(self) -> bool {
        self.contains(BgCtrl1::X8)
    }

    pub fn y8(self) -> bool {
        self.contains(BgCtrl1::Y8)
    }

    pub fn high_color(self) -> bool {
        self.contains(BgCtrl1::HIGH_COLOR)
    }

    pub fn scroll_mode(self) -> ScrollMode {
        match (self.bits() >> 2) & 0x03 {
            0 => ScrollMode::Fixed,
            1 => ScrollMode::Horizontal,
            2 => ScrollMode::Vertical,
            3 => ScrollMode::FourPane,
            _ => unreachable!("two-bit field"),
        }
    }
}

bitflags! {
    /// Background control 2 (`0x13` / `0x17`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// E P b b d d B S
    /// ```
    /// - `S`: tile size (0 = 8x8, 1 = 16x16)
    /// - `B`: bitmap mode (256x1 rows, layer 0 only)
    /// - `d d`: color depth select
    /// - `b b`: depth or palette-bank field, meaning depends on `P`
    /// - `P`: palette/depth source select (cell nibble vs this register)
    /// - `E`: layer enable
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BgCtrl2: u8 {
        const TILE_16 = 0b0000_0001;
        const BITMAP = 0b0000_0010;
        const COLOR_DEPTH = 0b0000_1100;
        const BANK_FIELD = 0b0011_0000;
        const CELL_PALETTE = 0b0100_0000;
        const ENABLE = 0b1000_0000;
    }
}

impl BgCtrl2 {
    pub fn enabled(self) -> bool {
        self.contains(BgCtrl2::ENABLE)
    }

    pub fn tile_16(self) -> bool {
        self.contains(BgCtrl2::TILE_16)
    }

    pub fn bitmap(self) -> bool {
        self.contains(BgCtrl2::BITMAP)
    }

    /// When set, the tile cell's palette nibble selects the palette bank and
    /// this register's bank field selects the depth; when clear the roles
    /// are (mostly) swapped.
    pub fn cell_palette(self) -> bool {
        self.contains(BgCtrl2::CELL_PALETTE)
    }

    /// Indexed pixel format from the color-depth field.
    pub fn pixel_format(self) -> PixelFormat {
        PixelFormat::from_depth_bits((self.bits() >> 2) & 0x03)
    }

    /// The two-bit depth/palette-bank field (bits 5..4).
    pub fn bank_field(self) -> u8 {
        (self.bits() >> 4) & 0x03
    }
}

bitflags! {
    /// Sprite control register (`0x18`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// . . . . P E s s
    /// ```
    /// - `s s`: sprite size
    /// - `E`: sprite rendering enable
    /// - `P`: drive both palette banks regardless of the per-sprite select
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpriteCtrl: u8 {
        const SIZE = 0b0000_0011;
        const ENABLE = 0b0000_0100;
        const SHARED_BANKS = 0b0000_1000;
    }
}

impl SpriteCtrl {
    pub fn enabled(self) -> bool {
        self.contains(SpriteCtrl::ENABLE)
    }

    pub fn shared_banks(self) -> bool {
        self.contains(SpriteCtrl::SHARED_BANKS)
    }

    /// Sprite width and height in texels: 8x8, 8x16, 16x8 or 16x16.
    pub fn dimensions(self) -> (usize, usize) {
        let size = self.bits() & 0x03;
        let width = if size == 2 || size == 3 { 16 } else { 8 };
        let height = if size == 1 || size == 3 { 16 } else { 8 };
        (width, height)
    }
}

bitflags! {
    /// Output palette select (`0x0E`).
    ///
    /// The TV encoder and the LCD controller read disjoint bits; both get
    /// a bank-0 enable, a bank-1 enable, and a blend enable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputSelect: u8 {
        const LCD_BANK0 = 0b0000_0001;
        const TV_BANK0 = 0b0000_0010;
        const LCD_BANK1 = 0b0000_0100;
        const TV_BANK1 = 0b0000_1000;
        const TV_BLEND = 0b0001_0000;
        const LCD_BLEND = 0b0010_0000;
    }
}

impl OutputSelect {
    pub fn bank0_enabled(self, target: OutputTarget) -> bool {
        match target {
            OutputTarget::Tv => self.contains(OutputSelect::TV_BANK0),
            OutputTarget::Lcd => self.contains(OutputSelect::LCD_BANK0),
        }
    }

    pub fn bank1_enabled(self, target: OutputTarget) -> bool {
        match target {
            OutputTarget::Tv => self.contains(OutputSelect::TV_BANK1),
            OutputTarget::Lcd => self.contains(OutputSelect::LCD_BANK1),
        }
    }

    pub fn blend_enabled(self, target: OutputTarget) -> bool {
        match target {
            OutputTarget::Tv => self.contains(OutputSelect::TV_BLEND),
            OutputTarget::Lcd => self.contains(OutputSelect::LCD_BLEND),
        }
    }
}

bitflags! {
    /// Per-background-layer palette output enables (`0x0F`).
    ///
    /// Bits `2*layer` and `2*layer + 1` enable the bank-0 and bank-1 output
    /// of that background layer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerPaletteSelect: u8 {
        const BG0_BANK0 = 0b0000_0001;
        const BG0_BANK1 = 0b0000_0010;
        const BG1_BANK0 = 0b0000_0100;
        const BG1_BANK1 = 0b0000_1000;
    }
}

impl LayerPaletteSelect {
    pub fn bank0_enabled(self, layer: usize) -> bool {
        self.bits() & (1 << (2 * layer)) != 0
    }

    pub fn bank1_enabled(self, layer: usize) -> bool {
        self.bits() & (1 << (2 * layer + 1)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_mode_decodes_bits_3_2() {
        assert_eq!(BgCtrl1::from_bits_retain(0x00).scroll_mode(), ScrollMode::Fixed);
        assert_eq!(
            BgCtrl1::from_bits_retain(0x04).scroll_mode(),
            ScrollMode::Horizontal
        );
        assert_eq!(
            BgCtrl1::from_bits_retain(0x08).scroll_mode(),
            ScrollMode::Vertical
        );
        assert_eq!(
            BgCtrl1::from_bits_retain(0x0C).scroll_mode(),
            ScrollMode::FourPane
        );
    }

    #[test]
    fn color_depth_maps_to_indexed_formats() {
        assert_eq!(BgCtrl2::from_bits_retain(0x00).pixel_format(), PixelFormat::Idx4);
        assert_eq!(BgCtrl2::from_bits_retain(0x04).pixel_format(), PixelFormat::Idx16);
        assert_eq!(BgCtrl2::from_bits_retain(0x08).pixel_format(), PixelFormat::Idx64);
        assert_eq!(BgCtrl2::from_bits_retain(0x0C).pixel_format(), PixelFormat::Idx256);
    }

    #[test]
    fn sprite_sizes_cover_all_four_shapes() {
        assert_eq!(SpriteCtrl::from_bits_retain(0).dimensions(), (8, 8));
        assert_eq!(SpriteCtrl::from_bits_retain(1).dimensions(), (8, 16));
        assert_eq!(SpriteCtrl::from_bits_retain(2).dimensions(), (16, 8));
        assert_eq!(SpriteCtrl::from_bits_retain(3).dimensions(), (16, 16));
    }

    #[test]
    fn tv_and_lcd_read_disjoint_output_bits() {
        let select = OutputSelect::from_bits_retain(0b0001_1010);
        assert!(select.bank0_enabled(OutputTarget::Tv));
        assert!(select.bank1_enabled(OutputTarget::Tv));
        assert!(select.blend_enabled(OutputTarget::Tv));
        assert!(!select.bank0_enabled(OutputTarget::Lcd));
        assert!(!select.bank1_enabled(OutputTarget::Lcd));
        assert!(!select.blend_enabled(OutputTarget::Lcd));

        let select = OutputSelect::from_bits_retain(0b0010_0101);
        assert!(select.bank0_enabled(OutputTarget::Lcd));
        assert!(select.bank1_enabled(OutputTarget::Lcd));
        assert!(select.blend_enabled(OutputTarget::Lcd));
        assert!(!select.bank0_enabled(OutputTarget::Tv));
    }

    #[test]
    fn layer_palette_bits_are_two_per_layer() {
        let select = LayerPaletteSelect::from_bits_retain(0b0110);
        assert!(!select.bank0_enabled(0));
        assert!(select.bank1_enabled(0));
        assert!(select.bank0_enabled(1));
        assert!(!select.bank1_enabled(1));
    }
}

use crate::hardware::ppu::Mode;

use bitflags::*;

bitflags! {
    /// FF40 - LCDC. Unlike VRAM, the PPU never locks this register, so it can be
    /// changed mid-scanline.
    #[derive(Default)]
    pub struct LcdControl: u8 {
        /// When cleared, background and window are blank and sprites draw on top
        /// of nothing; only sprites (if enabled) remain visible.
        const BG_WINDOW_PRIORITY = 0b0000_0001;
        const SPRITE_DISPLAY_ENABLE = 0b0000_0010;
        /// 0 = 8x8 sprites, 1 = 8x16.
        const SPRITE_SIZE = 0b0000_0100;
        /// 0 = background uses tile map $9800, 1 = $9C00.
        const BG_TILE_MAP_SELECT = 0b0000_1000;
        /// 0 = BG/window tile data at $8800-$97FF (signed index), 1 = $8000-$8FFF (unsigned).
        const BG_WINDOW_TILE_SELECT = 0b0001_0000;
        const WINDOW_DISPLAY = 0b0010_0000;
        /// 0 = window uses tile map $9800, 1 = $9C00.
        const WINDOW_MAP_SELECT = 0b0100_0000;
        const LCD_DISPLAY = 0b1000_0000;
    }
}

bitflags! {
    /// FF41 - STAT. Bits 0-2 are owned by the PPU; bit 7 always reads 1.
    #[derive(Default)]
    pub struct LcdStatus: u8 {
        const MODE_FLAG_0 = 0b0000_0001;
        const MODE_FLAG_1 = 0b0000_0010;
        /// (0: LYC<>LY, 1: LYC=LY), read-only.
        const COINCIDENCE_FLAG = 0b0000_0100;
        const MODE_0_H_INTERRUPT = 0b0000_1000;
        const MODE_1_V_INTERRUPT = 0b0001_0000;
        const MODE_2_OAM_INTERRUPT = 0b0010_0000;
        const COINCIDENCE_INTERRUPT = 0b0100_0000;
        const UNUSED = 0b1000_0000;
    }
}

bitflags! {
    /// OAM sprite attribute byte.
    #[derive(Default)]
    pub struct AttributeFlags: u8 {
        /// 0 = OBP0, 1 = OBP1.
        const PALETTE_NUMBER = 0b0001_0000;
        const X_FLIP = 0b0010_0000;
        const Y_FLIP = 0b0100_0000;
        /// 0 = sprite above BG, 1 = sprite behind BG colors 1-3.
        const OBJ_TO_BG_PRIORITY = 0b1000_0000;
    }
}

impl LcdControl {
    pub fn bg_window_tile_base(&self) -> u16 {
        if self.contains(LcdControl::BG_WINDOW_TILE_SELECT) {
            0x8000
        } else {
            0x9000
        }
    }

    pub fn bg_tile_map_base(&self) -> u16 {
        if self.contains(LcdControl::BG_TILE_MAP_SELECT) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn window_tile_map_base(&self) -> u16 {
        if self.contains(LcdControl::WINDOW_MAP_SELECT) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn sprite_height(&self) -> u8 {
        if self.contains(LcdControl::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }
}

impl LcdStatus {
    pub fn mode_flag(&self) -> Mode {
        match self.bits & 0x3 {
            0 => Mode::HBlank,
            1 => Mode::VBlank,
            2 => Mode::OamSearch,
            3 => Mode::LcdTransfer,
            _ => unreachable!("masked to 2 bits"),
        }
    }

    pub fn set_mode_flag(&mut self, value: Mode) {
        self.bits = (self.bits & 0xFC)
            | match value {
                Mode::HBlank => 0,
                Mode::VBlank => 1,
                Mode::OamSearch => 2,
                Mode::LcdTransfer => 3,
            }
    }
}

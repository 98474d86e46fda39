use bitflags::bitflags;

use crate::cartridge::{Mirroring, CHR_BANK_SIZE};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub const DOTS_PER_SCANLINE: u32 = 341;

const PPU_MEMORY_SIZE: usize = 0x8000;
const OAM_SIZE: usize = 256;

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_ADDR = 0b00000011;
        const VRAM_INCREMENT = 0b00000100;
        const SPRITE_PATTERN = 0b00001000;
        const BG_PATTERN = 0b00010000;
        const SPRITE_SIZE = 0b00100000;
        const MASTER_SLAVE = 0b01000000;
        const NMI_ENABLE = 0b10000000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub struct PpuMask: u8 {
        const GRAYSCALE = 0b00000001;
        const SHOW_BG_LEFT = 0b00000010;
        const SHOW_SPRITES_LEFT = 0b00000100;
        const SHOW_BG = 0b00001000;
        const SHOW_SPRITES = 0b00010000;
        const EMPHASIZE_RED = 0b00100000;
        const EMPHASIZE_GREEN = 0b01000000;
        const EMPHASIZE_BLUE = 0b10000000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0b00100000;
        const SPRITE_ZERO_HIT = 0b01000000;
        const VBLANK_STARTED = 0b10000000;
    }
}

/// Scanline-granular picture unit. Video memory is a flat 32 KiB space with
/// a precomputed alias table, so every mirrored address resolves with one
/// lookup; the renderer draws whole scanlines at a time into a 256x240
/// RGB raster.
pub struct Ppu {
    pub ctrl: PpuCtrl,
    pub mask: PpuMask,
    pub status: PpuStatus,
    pub mem: Box<[u8; PPU_MEMORY_SIZE]>,
    pub oam: [u8; OAM_SIZE],
    pub oam_addr: u8,

    // Loopy scroll state shared by the data port and the renderer.
    v: u16,
    t: u16,
    fine_x: u8,
    first_write: bool,
    data_latch: u8,

    mirror: Box<[u16; PPU_MEMORY_SIZE]>,
    mirroring: Option<Mirroring>,

    dot: u32,
    scanline: i32,
    vblank_wait: u8,
    pub frame: u64,

    solid_bg: [bool; SCREEN_WIDTH],
    solid_sp: [bool; SCREEN_WIDTH],
    pub raster: Box<[u32; SCREEN_WIDTH * SCREEN_HEIGHT]>,

    /// Latched when the frame completes; the console drains these.
    pub frame_ready: bool,
    pub pending_nmi: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        let mut ppu = Ppu {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            mem: Box::new([0; PPU_MEMORY_SIZE]),
            oam: [0; OAM_SIZE],
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            first_write: true,
            data_latch: 0,
            mirror: Box::new([0; PPU_MEMORY_SIZE]),
            mirroring: None,
            dot: 0,
            scanline: 0,
            vblank_wait: 0,
            frame: 0,
            solid_bg: [false; SCREEN_WIDTH],
            solid_sp: [false; SCREEN_WIDTH],
            raster: Box::new([0; SCREEN_WIDTH * SCREEN_HEIGHT]),
            frame_ready: false,
            pending_nmi: false,
        };
        ppu.set_mirroring(Mirroring::Horizontal);
        ppu
    }

    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.oam_addr = 0;
        self.v = 0;
        self.t = 0;
        self.fine_x = 0;
        self.first_write = true;
        self.data_latch = 0;
        self.dot = 0;
        self.scanline = 0;
        self.vblank_wait = 0;
        self.solid_bg = [false; SCREEN_WIDTH];
        self.solid_sp = [false; SCREEN_WIDTH];
        self.frame_ready = false;
        self.pending_nmi = false;
    }

    /// Rebuild the address alias table for a mirroring arrangement.
    /// Mapper writes can retarget nametables mid-frame, so this is cheap to
    /// call repeatedly; setting the current mode again is a no-op.
    pub fn set_mirroring(&mut self, mode: Mirroring) {
        if self.mirroring == Some(mode) {
            return;
        }
        log::debug!("nametable mirroring -> {}", mode.describe());
        self.mirroring = Some(mode);

        for (i, slot) in self.mirror.iter_mut().enumerate() {
            *slot = i as u16;
        }

        // Palette mirrors, nametable shadow, and upper-half fold.
        self.alias(0x3F20, 0x3F00, 0x20);
        self.alias(0x3F40, 0x3F00, 0x20);
        self.alias(0x3F80, 0x3F00, 0x20);
        self.alias(0x3FC0, 0x3F00, 0x20);
        self.alias(0x3000, 0x2000, 0x0F00);
        self.alias(0x4000, 0x0000, 0x4000);

        match mode {
            Mirroring::Vertical => {
                self.alias(0x2800, 0x2000, 0x400);
                self.alias(0x2C00, 0x2400, 0x400);
            }
            Mirroring::Horizontal => {
                self.alias(0x2400, 0x2000, 0x400);
                self.alias(0x2C00, 0x2800, 0x400);
            }
            Mirroring::SingleScreenA => {
                self.alias(0x2400, 0x2000, 0x400);
                self.alias(0x2800, 0x2000, 0x400);
                self.alias(0x2C00, 0x2000, 0x400);
            }
            Mirroring::SingleScreenB => {
                self.alias(0x2400, 0x2400, 0x400);
                self.alias(0x2800, 0x2400, 0x400);
                self.alias(0x2C00, 0x2400, 0x400);
            }
            Mirroring::FourScreen => {}
        }
    }

    fn alias(&mut self, src: usize, dest: usize, len: usize) {
        for i in 0..len {
            self.mirror[src + i] = (dest + i) as u16;
        }
    }

    fn resolve(&self, addr: usize) -> usize {
        self.mirror[addr & (PPU_MEMORY_SIZE - 1)] as usize
    }

    pub fn peek_vram(&self, addr: u16) -> u8 {
        self.mem[self.resolve(addr as usize)]
    }

    pub fn poke_vram(&mut self, addr: u16, value: u8) {
        let resolved = self.resolve(addr as usize);
        self.mem[resolved] = value;
    }

    /// Copy a 4 KiB pattern bank into one of the two pattern windows.
    pub fn load_pattern(&mut self, window: usize, data: &[u8; CHR_BANK_SIZE]) {
        let base = (window & 1) * CHR_BANK_SIZE;
        self.mem[base..base + CHR_BANK_SIZE].copy_from_slice(data);
    }

    pub fn read_register(&mut self, addr: u16) -> u8 {
        match addr {
            0x2000 => self.ctrl.bits(),
            0x2001 => self.mask.bits(),
            0x2002 => {
                self.first_write = true;
                let value = self.status.bits();
                self.status.remove(PpuStatus::VBLANK_STARTED);
                value
            }
            0x2004 => {
                let value = self.oam[self.oam_addr as usize];
                self.oam_addr = self.oam_addr.wrapping_add(1);
                value
            }
            0x2007 => {
                // Buffered read: return the previous fetch, then refill.
                let value = self.data_latch;
                self.data_latch = self.read_vram();
                value
            }
            _ => 0,
        }
    }

    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x2000 => {
                self.ctrl = PpuCtrl::from_bits_retain(value);
                self.t = (self.t & 0xF3FF) | (((value & 3) as u16) << 10);
            }
            0x2001 => {
                self.mask = PpuMask::from_bits_retain(value);
            }
            0x2003 => {
                self.oam_addr = value;
            }
            0x2004 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            0x2005 => {
                if self.first_write {
                    self.t = (self.t & 0xFFE0) | ((value as u16 & 0xF8) >> 3);
                    self.fine_x = value & 7;
                } else {
                    self.t = (self.t & 0xFC1F) | ((value as u16 & 0xF8) << 2);
                    self.t = (self.t & 0x8FFF) | ((value as u16 & 7) << 12);
                }
                self.first_write = !self.first_write;
            }
            0x2006 => {
                if self.first_write {
                    self.t = (self.t & 0x00FF) | ((value as u16 & 0x3F) << 8);
                } else {
                    self.t = (self.t & 0xFF00) | value as u16;
                    self.v = self.t;
                }
                self.first_write = !self.first_write;
            }
            0x2007 => {
                self.write_vram(value);
            }
            _ => {}
        }
    }

    fn read_vram(&mut self) -> u8 {
        let value = self.mem[self.resolve(self.v as usize)];
        self.v = self.v.wrapping_add(self.vram_increment());
        value
    }

    fn write_vram(&mut self, value: u8) {
        let resolved = self.resolve(self.v as usize);
        self.mem[resolved] = value;
        self.v = self.v.wrapping_add(self.vram_increment());
    }

    fn vram_increment(&self) -> u16 {
        if self.ctrl.contains(PpuCtrl::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    fn rendering_enabled(&self) -> bool {
        self.mask.intersects(PpuMask::SHOW_BG | PpuMask::SHOW_SPRITES)
    }

    /// Advance by a number of dots (341 per scanline). Rendering happens at
    /// scanline granularity when the dot counter wraps; vertical blank spans
    /// twenty dummy scanline periods before the next frame starts.
    pub fn run_dots(&mut self, dots: u32) -> u32 {
        for _ in 0..dots {
            self.dot += 1;
            if self.dot != DOTS_PER_SCANLINE {
                continue;
            }
            self.dot = 0;

            if self.vblank_wait < 19 {
                self.vblank_wait += 1;
                continue;
            }

            if self.scanline == 0 {
                if self.rendering_enabled() {
                    self.v = self.t;
                }
                self.status
                    .remove(PpuStatus::VBLANK_STARTED | PpuStatus::SPRITE_ZERO_HIT);
            }

            if self.scanline < 240 && self.rendering_enabled() {
                self.render_scanline();
            }

            if self.scanline == 243 {
                self.status.insert(PpuStatus::VBLANK_STARTED);
                self.vblank_wait = 0;
                self.scanline = -1;
                self.frame += 1;
                self.frame_ready = true;
                if self.ctrl.contains(PpuCtrl::NMI_ENABLE) {
                    self.pending_nmi = true;
                }
            }

            self.scanline += 1;
        }
        dots
    }

    fn render_scanline(&mut self) {
        // Refresh the horizontal scroll bits from t.
        self.v = (self.v & 0xFBE0) | (self.t & 0x041F);

        if self.mask.contains(PpuMask::SHOW_BG) {
            self.render_background();
        }
        if self.mask.contains(PpuMask::SHOW_SPRITES) {
            self.render_sprites();
        }

        // Vertical increment with the row-29 nametable toggle. Row 31 is
        // only reachable when software points v at the attribute area, in
        // which case the wrap skips the toggle.
        if (self.v & 0x7000) == 0x7000 {
            self.v &= 0x8FFF;
            if (self.v & 0x03E0) == 0x03A0 {
                self.v ^= 0x0800;
                self.v &= 0xFC1F;
            } else if (self.v & 0x03E0) == 0x03E0 {
                self.v &= 0xFC1F;
            } else {
                self.v += 0x20;
            }
        } else {
            self.v += 0x1000;
        }
    }

    fn render_background(&mut self) {
        let mut index_x = (self.v & 0x1F) as i32;
        let index_y = ((self.v & 0x3E0) >> 5) as i32;

        let mut nt_addr = 0x2000 + (self.v & 0x0FFF) as i32;
        let mut at_addr = 0x2000
            + (self.v & 0x0C00) as i32
            + 0x3C0
            + ((index_y & 0xFFC) << 1)
            + (index_x >> 2);

        let bg_table = if self.ctrl.contains(PpuCtrl::BG_PATTERN) {
            0x1000
        } else {
            0
        };
        let fine_y = ((self.v & 0x7000) >> 12) as i32;
        let mut attribute = self.attribute_bits(at_addr, index_x, index_y);
        let mut col = -(self.fine_x as i32);

        self.solid_bg = [false; SCREEN_WIDTH];

        // 33 tile fetches cover a 256-pixel line at any fine-x offset.
        for _ in 0..33 {
            let tile = self.mem[self.resolve(nt_addr as usize)] as i32;
            let pattern_addr = (bg_table + (tile << 4) + fine_y) as usize;
            let lsb = self.mem[self.resolve(pattern_addr)];
            let msb = self.mem[self.resolve(pattern_addr + 8)];

            for bit in (0..8).rev() {
                let pattern = (((msb >> bit) << 1) & 2) | ((lsb >> bit) & 1);
                let color_addr = if pattern == 0 {
                    0x3F10
                } else {
                    0x3F00 + (attribute | pattern) as usize
                };
                let color = NES_PALETTE[self.mem[self.resolve(color_addr)] as usize & 0x3F];

                if (0..SCREEN_WIDTH as i32).contains(&col) {
                    self.solid_bg[col as usize] = pattern != 0;
                    let point = self.scanline as usize * SCREEN_WIDTH + col as usize;
                    if point < self.raster.len() {
                        self.raster[point] = color;
                    }
                }
                col += 1;
            }

            index_x += 1;
            nt_addr += 1;

            if (index_x & 1) == 0 {
                if (index_x & 3) == 0 {
                    if (index_x & 0x1F) == 0 {
                        // Crossed into the adjacent nametable.
                        nt_addr ^= 0x0400;
                        at_addr ^= 0x0400;
                        nt_addr -= 0x20;
                        at_addr -= 8;
                        index_x -= 0x20;
                    }
                    at_addr += 1;
                }
                attribute = self.attribute_bits(at_addr, index_x, index_y);
            }
        }
    }

    fn attribute_bits(&self, at_addr: i32, index_x: i32, index_y: i32) -> u8 {
        let byte = self.mem[self.resolve(at_addr as usize)];
        if (index_y & 2) == 0 {
            if (index_x & 2) == 0 {
                (byte & 0x03) << 2
            } else {
                byte & 0x0C
            }
        } else if (index_x & 2) == 0 {
            (byte & 0x30) >> 2
        } else {
            (byte & 0xC0) >> 4
        }
    }

    fn render_sprites(&mut self) {
        let height: i32 = if self.ctrl.contains(PpuCtrl::SPRITE_SIZE) {
            16
        } else {
            8
        };

        self.status.remove(PpuStatus::SPRITE_OVERFLOW);
        self.solid_sp = [false; SCREEN_WIDTH];

        let mut detected = 0u32;

        for i in 0..64 {
            let y = self.oam[i * 4] as i32 + 1;
            let pattern_index = self.oam[i * 4 + 1] as i32;
            let attributes = self.oam[i * 4 + 2];
            let x = self.oam[i * 4 + 3] as i32;

            let vflip = (attributes & 0x80) != 0;
            let hflip = (attributes & 0x40) != 0;
            let bg_priority = (attributes & 0x20) != 0;
            let color_high = (attributes << 2) & 0x0C;

            let mut line = self.scanline - y;
            if line < 0 || line >= height {
                continue;
            }
            if vflip {
                line = (height - 1) - line;
            }

            // The flag is set for the ninth sprite found, but every sprite
            // on the line still draws.
            detected += 1;
            if detected > 8 {
                self.status.insert(PpuStatus::SPRITE_OVERFLOW);
            }

            let pattern_addr = if height == 8 {
                let table = if self.ctrl.contains(PpuCtrl::SPRITE_PATTERN) {
                    0x1000
                } else {
                    0
                };
                table + pattern_index * 0x10 + line
            } else {
                // 8x16: the index selects the table, halves pair up.
                let mut addr = pattern_index << 4;
                if (pattern_index & 1) == 1 {
                    addr += 0x1000;
                    if line <= 7 {
                        addr -= 16;
                    }
                } else if line > 7 {
                    addr += 16;
                }
                addr + (line & 7)
            } as usize;

            let lsb = self.mem[self.resolve(pattern_addr)];
            let msb = self.mem[self.resolve(pattern_addr + 8)];

            for bit in (0..8).rev() {
                let point_x = x + 7 - bit;
                if point_x >= SCREEN_WIDTH as i32 {
                    continue;
                }
                let point_x = point_x as usize;
                if self.solid_sp[point_x] {
                    continue;
                }

                let col = if hflip { 7 - bit } else { bit };
                let pattern = (((msb >> col) & 1) << 1) | ((lsb >> col) & 1);
                let color_addr = 0x3F10 + (color_high | pattern) as usize;
                let color = NES_PALETTE[self.mem[self.resolve(color_addr)] as usize & 0x3F];

                // Hit detection happens even when the sprite pixel ends up
                // hidden behind the background.
                if i == 0
                    && self.solid_bg[point_x]
                    && pattern != 0
                    && self.mask.contains(PpuMask::SHOW_BG)
                {
                    self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
                }

                if !self.mask.contains(PpuMask::SHOW_SPRITES) {
                    continue;
                }
                if bg_priority && self.solid_bg[point_x] {
                    continue;
                }
                if pattern == 0 {
                    continue;
                }

                self.solid_sp[point_x] = true;
                let point = self.scanline as usize * SCREEN_WIDTH + point_x;
                self.raster[point] = color;
            }
        }
    }
}

/// Master palette as packed 0x00RRGGBB.
pub const NES_PALETTE: [u32; 64] = [
    0x808080, 0x003DA6, 0x0012B0, 0x440096, 0xA1005E, 0xC70028, 0xBA0600, 0x8C1700,
    0x5C2F00, 0x104500, 0x054A00, 0x00472E, 0x004166, 0x000000, 0x050505, 0x050505,
    0xC7C7C7, 0x0077FF, 0x2155FF, 0x8237FA, 0xEB2FB5, 0xFF2950, 0xFF2000, 0xD63200,
    0xC46200, 0x358000, 0x058F00, 0x008A55, 0x0099CC, 0x212121, 0x090909, 0x090909,
    0xFFFFFF, 0x0FD7FF, 0x69A2FF, 0xD480FF, 0xFF45F3, 0xFF618B, 0xFF8833, 0xFF9C12,
    0xFABC20, 0x9FE30E, 0x2BF035, 0x0CF0A4, 0x05FBFF, 0x5E5E5E, 0x0D0D0D, 0x0D0D0D,
    0xFFFFFF, 0xA6FCFF, 0xB3ECFF, 0xDAABEB, 0xFFA8F9, 0xFFABB3, 0xFFD2B0, 0xFFEFA6,
    0xFFF79C, 0xD7E895, 0xA6EDAF, 0xA2F2DA, 0x99FFFC, 0xDDDDDD, 0x111111, 0x111111,
];

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

pub const PRG_BANK_SIZE: usize = 0x4000;
pub const CHR_BANK_SIZE: usize = 0x1000;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("image too small for an iNES header ({0} bytes)")]
    TooSmall(usize),
    #[error("missing NES magic bytes, not an iNES image")]
    BadMagic,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
    SingleScreenA,
    SingleScreenB,
}

impl Mirroring {
    pub fn describe(self) -> &'static str {
        match self {
            Mirroring::Horizontal => "horizontal",
            Mirroring::Vertical => "vertical",
            Mirroring::FourScreen => "four-screen",
            Mirroring::SingleScreenA => "single-screen A",
            Mirroring::SingleScreenB => "single-screen B",
        }
    }
}

/// A parsed cartridge image: fixed-size program and pattern banks plus the
/// header fields the mapper and PPU need. Banks are immutable once loaded;
/// bank-switch state lives in the active mapper, not here.
pub struct Rom {
    prg_banks: Vec<[u8; PRG_BANK_SIZE]>,
    chr_banks: Vec<[u8; CHR_BANK_SIZE]>,
    pub mapper_id: u8,
    pub mirroring: Mirroring,
    pub battery_backed: bool,
}

impl Rom {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < 16 {
            return Err(RomError::TooSmall(data.len()));
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(RomError::BadMagic);
        }

        let prg_count = data[4] as usize;
        // Header byte 5 counts 8 KiB pattern pairs; banks here are 4 KiB.
        let chr_count = data[5] as usize * 2;

        let flags_6 = data[6];
        let flags_7 = data[7];

        let mirroring = if (flags_6 & 0x08) != 0 {
            Mirroring::FourScreen
        } else if (flags_6 & 0x01) != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let battery_backed = (flags_6 & 0x02) != 0;
        let trainer_present = (flags_6 & 0x04) != 0;
        let mapper_id = (flags_7 & 0xF0) | ((flags_6 & 0xF0) >> 4);

        let mut offset = 16 + if trainer_present { 512 } else { 0 };

        // Truncated images get zero-filled tail banks rather than a hard error.
        let mut prg_banks = Vec::with_capacity(prg_count);
        for _ in 0..prg_count {
            let mut bank = [0u8; PRG_BANK_SIZE];
            copy_available(&mut bank, data, offset);
            prg_banks.push(bank);
            offset += PRG_BANK_SIZE;
        }

        let mut chr_banks = Vec::with_capacity(chr_count);
        for _ in 0..chr_count {
            let mut bank = [0u8; CHR_BANK_SIZE];
            copy_available(&mut bank, data, offset);
            chr_banks.push(bank);
            offset += CHR_BANK_SIZE;
        }

        let rom = Rom {
            prg_banks,
            chr_banks,
            mapper_id,
            mirroring,
            battery_backed,
        };

        log::info!(
            "loaded cartridge: {} PRG banks, {} CHR banks, mapper {} ({}), {} mirroring",
            rom.prg_count(),
            rom.chr_count(),
            rom.mapper_id,
            rom.mapper_name(),
            rom.mirroring.describe()
        );

        Ok(rom)
    }

    pub fn prg_count(&self) -> usize {
        self.prg_banks.len()
    }

    pub fn chr_count(&self) -> usize {
        self.chr_banks.len()
    }

    pub fn prg_bank(&self, bank: usize) -> Option<&[u8; PRG_BANK_SIZE]> {
        self.prg_banks.get(bank)
    }

    pub fn chr_bank(&self, bank: usize) -> Option<&[u8; CHR_BANK_SIZE]> {
        self.chr_banks.get(bank)
    }

    /// Byte read with an out-of-range sentinel; a bad bank index is a
    /// cartridge bug worth logging, not a reason to halt emulation.
    pub fn read_prg(&self, bank: usize, offset: usize) -> u8 {
        match self.prg_banks.get(bank).and_then(|b| b.get(offset)) {
            Some(&v) => v,
            None => {
                log::warn!("out-of-range PRG read: bank {bank} offset {offset:#06X}");
                0xFF
            }
        }
    }

    pub fn mapper_name(&self) -> &'static str {
        mapper_name(self.mapper_id)
    }
}

fn copy_available(bank: &mut [u8], data: &[u8], offset: usize) {
    if offset >= data.len() {
        return;
    }
    let avail = (data.len() - offset).min(bank.len());
    bank[..avail].copy_from_slice(&data[offset..offset + avail]);
}

/// Informational names for the common mapper ids, used in load diagnostics.
pub fn mapper_name(id: u8) -> &'static str {
    match id {
        0 => "NROM",
        1 => "Nintendo MMC1",
        2 => "UNROM",
        3 => "CNROM",
        4 => "Nintendo MMC3",
        5 => "Nintendo MMC5",
        7 => "AOROM",
        9 => "Nintendo MMC2",
        10 => "Nintendo MMC4",
        11 => "ColorDreams",
        15 => "100-in-1 switch",
        16 => "Bandai",
        18 => "Jaleco SS8806",
        19 => "Namcot 106",
        21 => "Konami VRC4a",
        22 => "Konami VRC2a",
        24 => "Konami VRC6",
        25 => "Konami VRC4b",
        32 => "Irem G-101",
        33 => "Taito TC0190",
        34 => "32kB ROM switch",
        64 => "Tengen RAMBO-1",
        65 => "Irem H-3001",
        66 => "GNROM switch",
        67 => "SunSoft3",
        68 => "SunSoft4",
        69 => "SunSoft5 FME-7",
        71 => "Camerica",
        78 => "Irem 74HC161/32",
        91 => "Pirate HK-SF3",
        _ => "unknown mapper",
    }
}

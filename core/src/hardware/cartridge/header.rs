use std::str::from_utf8;

pub const HEADER_START: u16 = 0x0100;
pub const HEADER_END: u16 = 0x014F;

/// Which family of bank-switching hardware a cartridge type byte maps to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MbcFamily {
    None,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

#[derive(Debug, Default, Clone)]
pub struct CartridgeHeader {
    /// Upper-case ASCII, 16 bytes, zero-padded.
    pub title: String,
    pub new_licensee_code: u16,
    pub sgb_flag: bool,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
    pub is_japanese: bool,
    pub old_licensee_code: u8,
    pub mask_rom_version_number: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl CartridgeHeader {
    pub fn new(rom: &[u8]) -> Self {
        CartridgeHeader {
            title: read_title(rom),
            new_licensee_code: read_new_licensee(rom),
            sgb_flag: read_sgb_flag(rom),
            cartridge_type: read_cartridge_type(rom),
            rom_size_code: read_rom_size(rom),
            ram_size_code: read_ram_size(rom),
            is_japanese: read_dest_code(rom),
            old_licensee_code: read_old_licensee(rom),
            mask_rom_version_number: read_mask_rom_version(rom),
            header_checksum: read_header_checksum(rom),
            global_checksum: read_global_checksum(rom),
        }
    }

    /// Number of 16 KiB ROM banks, derived as `2 << code`.
    pub fn rom_bank_count(&self) -> usize {
        2usize << self.rom_size_code
    }

    /// Number of 8 KiB external RAM banks.
    pub fn ram_bank_count(&self) -> usize {
        match self.ram_size_code {
            0 | 1 => 0,
            2 => 1,
            3 => 4,
            4 => 16,
            5 => 8,
            _ => 0,
        }
    }

    pub fn mbc_family(&self) -> MbcFamily {
        match self.cartridge_type {
            0x00 | 0x08 | 0x09 => MbcFamily::None,
            0x01..=0x03 => MbcFamily::Mbc1,
            0x05 | 0x06 => MbcFamily::Mbc2,
            0x0F..=0x13 => MbcFamily::Mbc3,
            0x19..=0x1E => MbcFamily::Mbc5,
            _ => {
                log::warn!(
                    "Unrecognised cartridge type byte {:#04x}, falling back to MBC1",
                    self.cartridge_type
                );
                MbcFamily::Mbc1
            }
        }
    }

    pub fn has_battery(&self) -> bool {
        matches!(
            self.cartridge_type,
            0x03 | 0x06 | 0x09 | 0x0D | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E
        )
    }
}

fn read_title(rom: &[u8]) -> String {
    let end = 0x144.min(rom.len());
    let slice = &rom[0x134.min(rom.len())..end];

    from_utf8(slice)
        .unwrap_or("")
        .trim_matches(char::from(0))
        .to_owned()
}

fn read_new_licensee(rom: &[u8]) -> u16 {
    ((rom[0x144] as u16) << 8) | rom[0x145] as u16
}

fn read_sgb_flag(rom: &[u8]) -> bool {
    rom[0x146] == 0x03
}

fn read_cartridge_type(rom: &[u8]) -> u8 {
    rom[0x147]
}

fn read_rom_size(rom: &[u8]) -> u8 {
    rom[0x148]
}

fn read_ram_size(rom: &[u8]) -> u8 {
    rom[0x149]
}

fn read_dest_code(rom: &[u8]) -> bool {
    rom[0x14A] == 0x00
}

fn read_old_licensee(rom: &[u8]) -> u8 {
    rom[0x14B]
}

fn read_mask_rom_version(rom: &[u8]) -> u8 {
    rom[0x14C]
}

fn read_header_checksum(rom: &[u8]) -> u8 {
    rom[0x14D]
}

fn read_global_checksum(rom: &[u8]) -> u16 {
    ((rom[0x14E] as u16) << 8) | rom[0x14F] as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_title() {
        let mut test = vec![0u8; 0x8000];
        for (loc, i) in [0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x57, 0x6f, 0x72, 0x00, 0x00]
            .iter()
            .enumerate()
        {
            test[0x134 + loc] = *i;
        }
        assert_eq!("Hello Wor", read_title(&test));
    }

    #[test]
    fn test_mbc_family_mapping() {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x13;
        assert_eq!(CartridgeHeader::new(&rom).mbc_family(), MbcFamily::Mbc3);
        rom[0x147] = 0x00;
        assert_eq!(CartridgeHeader::new(&rom).mbc_family(), MbcFamily::None);
    }

    #[test]
    fn test_rom_bank_count() {
        let mut rom = vec![0u8; 0x8000];
        rom[0x148] = 2;
        assert_eq!(CartridgeHeader::new(&rom).rom_bank_count(), 8);
    }
}

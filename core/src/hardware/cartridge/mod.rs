pub mod header;
pub mod mbc0;
pub mod mbc1;
pub mod mbc2;
pub mod mbc3;
pub mod mbc5;

use crate::hardware::cartridge::header::{CartridgeHeader, MbcFamily};
use crate::hardware::cartridge::mbc0::Mbc0;
use crate::hardware::cartridge::mbc1::Mbc1;
use crate::hardware::cartridge::mbc2::Mbc2;
use crate::hardware::cartridge::mbc3::Mbc3;
use crate::hardware::cartridge::mbc5::Mbc5;
use std::fmt;

/// Bank-switching behaviour shared by every supported cartridge family.
/// `read_rom_low` serves 0x0000-0x3FFF, `read_rom_high` serves 0x4000-0x7FFF.
pub trait Mbc {
    fn read_rom_low(&self, address: u16) -> u8;
    fn read_rom_high(&self, address: u16) -> u8;
    fn read_ram(&self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);
    /// Battery-backed external RAM contents, for persistence. `None` if the
    /// cartridge has no battery.
    fn battery_ram(&self) -> Option<&[u8]>;
    /// Seed external RAM from a previously saved battery image. No-op on carts
    /// without battery-backed RAM.
    fn load_battery_ram(&mut self, _data: &[u8]) {}
}

#[derive(Debug)]
pub enum CartridgeError {
    TooLarge(usize),
    TooSmall(usize),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::TooLarge(n) => write!(f, "cartridge image is {} bytes, exceeds 1 MiB limit", n),
            CartridgeError::TooSmall(n) => write!(f, "cartridge image is {} bytes, smaller than the 32 KiB minimum", n),
        }
    }
}

impl std::error::Error for CartridgeError {}

const MAX_ROM_SIZE: usize = 1024 * 1024;
const MIN_ROM_SIZE: usize = 0x8000;

pub struct Cartridge {
    pub header: CartridgeHeader,
    mbc: Box<dyn Mbc>,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>, saved_ram: Option<Vec<u8>>) -> Result<Self, CartridgeError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(CartridgeError::TooLarge(rom.len()));
        }
        if rom.len() < MIN_ROM_SIZE {
            return Err(CartridgeError::TooSmall(rom.len()));
        }

        let header = CartridgeHeader::new(&rom);
        let rom_banks = header.rom_bank_count();
        let ram_banks = header.ram_bank_count();
        let has_battery = header.has_battery();

        log::info!(
            "Loaded cartridge \"{}\" ({:?}, {} ROM banks, {} RAM banks, battery={})",
            header.title,
            header.mbc_family(),
            rom_banks,
            ram_banks,
            has_battery
        );

        let mut mbc: Box<dyn Mbc> = match header.mbc_family() {
            MbcFamily::None => Box::new(Mbc0::new(rom, has_battery)),
            MbcFamily::Mbc1 => Box::new(Mbc1::new(rom, rom_banks, ram_banks, has_battery)),
            MbcFamily::Mbc2 => Box::new(Mbc2::new(rom, rom_banks, has_battery)),
            MbcFamily::Mbc3 => Box::new(Mbc3::new(rom, rom_banks, ram_banks, has_battery)),
            MbcFamily::Mbc5 => Box::new(Mbc5::new(rom, rom_banks, ram_banks, has_battery)),
        };

        if let Some(ram) = saved_ram {
            mbc.load_battery_ram(&ram);
        }

        Ok(Cartridge { header, mbc })
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x3FFF => self.mbc.read_rom_low(address),
            0x4000..=0x7FFF => self.mbc.read_rom_high(address),
            0xA000..=0xBFFF => self.mbc.read_ram(address),
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        self.mbc.write(address, value);
    }

    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.mbc.battery_ram()
    }
}

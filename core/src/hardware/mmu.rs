use crate::hardware::apu::Apu;
use crate::hardware::cartridge::Cartridge;
use crate::hardware::ppu::Ppu;
use crate::io::bootrom::BootRom;
use crate::io::interrupts::{InterruptFlags, Interrupts};
use crate::io::joypad::{InputKey, JoyPad, JOYPAD_REGISTER};
use crate::io::timer::{TimerRegisters, DIVIDER_REGISTER, TIMER_COUNTER, TIMER_CONTROL, TIMER_MODULO};

/// Implemented by anything the CPU can fetch instructions from and read/write
/// data through. Production code implements this over the full console memory
/// map (§ address decode table); tests implement it over a bare byte array.
pub trait MemoryMapper {
    fn read(&mut self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);

    fn read_u16(&mut self, address: u16) -> u16 {
        let lo = self.read(address) as u16;
        let hi = self.read(address.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn write_u16(&mut self, address: u16, value: u16) {
        self.write(address, value as u8);
        self.write(address.wrapping_add(1), (value >> 8) as u8);
    }
}

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

/// The full console bus: decodes the 16-bit address space across the
/// cartridge, PPU/APU/timer/joypad register windows, WRAM, HRAM, and the two
/// interrupt registers, and drives the PPU/APU/timer forward in lockstep with
/// the CPU via `step`.
pub struct Memory {
    pub cartridge: Cartridge,
    pub ppu: Ppu,
    pub apu: Apu,
    pub timer: TimerRegisters,
    pub joypad: JoyPad,
    pub bootrom: BootRom,
    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],
    pub interrupt_enable: InterruptFlags,
    pub interrupt_flags: InterruptFlags,
    serial_data: u8,
    serial_control: u8,
}

impl Memory {
    pub fn new(cartridge: Cartridge, bootrom: Option<[u8; crate::io::bootrom::BOOTROM_SIZE]>) -> Self {
        Memory {
            cartridge,
            ppu: Ppu::new(),
            apu: Apu::new(),
            timer: TimerRegisters::default(),
            joypad: JoyPad::new(),
            bootrom: BootRom::new(bootrom),
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
            interrupt_enable: InterruptFlags::empty(),
            interrupt_flags: InterruptFlags::empty(),
            serial_data: 0,
            serial_control: 0,
        }
    }

    pub fn press_key(&mut self, key: InputKey) {
        self.joypad.press_key(key);
        self.interrupt_flags.request(Interrupts::Joypad);
    }

    pub fn release_key(&mut self, key: InputKey) {
        self.joypad.release_key(key);
    }

    /// Advance the timer, APU, and PPU by `cycles` T-states in that fixed
    /// order, folding any interrupts they request into IF.
    pub fn step(&mut self, cycles: u8) {
        let timer_tick = self.timer.step(cycles);
        if let Some(interrupt) = timer_tick.interrupt {
            self.interrupt_flags.insert(interrupt);
        }
        self.apu.step(cycles, timer_tick.apu_edges);
        let ppu_interrupts = self.ppu.step(cycles);
        self.interrupt_flags.insert(ppu_interrupts);
    }

    fn oam_dma_transfer(&mut self, source_high_byte: u8) {
        let base = (source_high_byte as u16) << 8;
        for i in 0..0xA0u16 {
            let value = self.read(base + i);
            self.ppu.dma_write_oam(i as usize, value);
        }
    }

    fn read_io(&mut self, address: u16) -> u8 {
        match address {
            JOYPAD_REGISTER => self.joypad.get_register(),
            0xFF01 => self.serial_data,
            0xFF02 => self.serial_control,
            DIVIDER_REGISTER => self.timer.divider_register(),
            TIMER_COUNTER => self.timer.timer_counter,
            TIMER_MODULO => self.timer.timer_modulo,
            TIMER_CONTROL => self.timer.timer_control.to_bits() | 0xF8,
            0xFF0F => self.interrupt_flags.bits() | 0xE0,
            0xFF10..=0xFF3F => self.apu.read_register(address),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.read_register(address),
            0xFF46 => 0xFF, // DMA register is write-only
            0xFF50 => 0xFF,
            _ => 0xFF,
        }
    }

    fn write_io(&mut self, address: u16, value: u8) {
        match address {
            JOYPAD_REGISTER => self.joypad.set_register(value),
            0xFF01 => self.serial_data = value,
            0xFF02 => self.serial_control = value,
            DIVIDER_REGISTER => self.timer.set_divider(),
            TIMER_COUNTER => self.timer.set_timer_counter(value),
            TIMER_MODULO => self.timer.set_tma(value),
            TIMER_CONTROL => self.timer.set_timer_control(value),
            0xFF0F => self.interrupt_flags = InterruptFlags::from_bits_truncate(value),
            0xFF10..=0xFF3F => self.apu.write_register(address, value),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.write_register(address, value),
            0xFF46 => self.oam_dma_transfer(value),
            0xFF50 => {
                if value != 0 {
                    self.bootrom.is_finished = true;
                }
            }
            _ => {}
        }
    }
}

impl MemoryMapper for Memory {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x00FF if !self.bootrom.is_finished => self.bootrom.read_byte(address),
            0x0000..=0x7FFF => self.cartridge.read(address),
            0x8000..=0x9FFF => self.ppu.read_vram(address),
            0xA000..=0xBFFF => self.cartridge.read(address),
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize],
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize],
            0xFE00..=0xFE9F => self.ppu.read_oam(address),
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFF7F => self.read_io(address),
            0xFF80..=0xFFFE => self.hram[(address - 0xFF80) as usize],
            0xFFFF => self.interrupt_enable.bits() | 0xE0,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x7FFF => self.cartridge.write(address, value),
            0x8000..=0x9FFF => self.ppu.write_vram(address, value),
            0xA000..=0xBFFF => self.cartridge.write(address, value),
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize] = value,
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize] = value,
            0xFE00..=0xFE9F => self.ppu.write_oam(address, value),
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.write_io(address, value),
            0xFF80..=0xFFFE => self.hram[(address - 0xFF80) as usize] = value,
            0xFFFF => self.interrupt_enable = InterruptFlags::from_bits_truncate(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::cartridge::Cartridge;

    fn test_memory() -> Memory {
        let rom = vec![0u8; 0x8000];
        let cartridge = Cartridge::new(rom, None).unwrap();
        Memory::new(cartridge, None)
    }

    #[test]
    fn test_wram_echo_mirrors_main_wram() {
        let mut memory = test_memory();
        memory.write(0xC010, 0x42);
        assert_eq!(memory.read(0xE010), 0x42);
    }

    #[test]
    fn test_hram_round_trip() {
        let mut memory = test_memory();
        memory.write(0xFF90, 0x7);
        assert_eq!(memory.read(0xFF90), 0x7);
    }

    #[test]
    fn test_oam_dma_copies_160_bytes_from_source() {
        let mut memory = test_memory();
        for i in 0..0xA0u16 {
            memory.write(0xC000 + i, i as u8);
        }
        memory.write(0xFF46, 0xC0);
        assert_eq!(memory.ppu.read_oam(0xFE00), 0);
        assert_eq!(memory.ppu.read_oam(0xFE9F), 0x9F);
    }

    #[test]
    fn test_bootrom_disable_register_unmaps_bootrom() {
        let rom = vec![0xAAu8; 0x8000];
        let cartridge = Cartridge::new(rom, None).unwrap();
        let mut memory = Memory::new(cartridge, Some([0xFF; crate::io::bootrom::BOOTROM_SIZE]));
        assert_eq!(memory.read(0x0000), 0xFF);
        memory.write(0xFF50, 0x01);
        assert_eq!(memory.read(0x0000), 0xAA);
    }

    #[test]
    fn test_joypad_interrupt_requested_on_key_press() {
        let mut memory = test_memory();
        memory.press_key(InputKey::A);
        assert!(memory.interrupt_flags.contains(InterruptFlags::JOYPAD));
    }
}

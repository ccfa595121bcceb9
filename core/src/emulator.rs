use crate::hardware::cartridge::{Cartridge, CartridgeError};
use crate::hardware::cpu::Cpu;
use crate::hardware::mmu::Memory;
use crate::io::bootrom::BOOTROM_SIZE;
use crate::io::joypad::InputKey;
use crate::scheduler::Scheduler;

/// Construction options for `Emulator::new`.
#[derive(Default)]
pub struct EmulatorOptions {
    pub boot_rom: Option<[u8; BOOTROM_SIZE]>,
    pub saved_ram: Option<Vec<u8>>,
    /// Overrides the scheduler's default 69905-cycles-per-frame budget.
    pub cycles_per_frame: Option<u32>,
}

impl EmulatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boot_rom(mut self, boot_rom: [u8; BOOTROM_SIZE]) -> Self {
        self.boot_rom = Some(boot_rom);
        self
    }

    pub fn with_saved_ram(mut self, ram: Vec<u8>) -> Self {
        self.saved_ram = Some(ram);
        self
    }

    pub fn with_cycles_per_frame(mut self, cycles: u32) -> Self {
        self.cycles_per_frame = Some(cycles);
        self
    }
}

/// Top-level handle: owns the CPU (and through it, the full memory bus) plus
/// the scheduler that drives them. This is the type a frontend embeds.
pub struct Emulator {
    pub cpu: Cpu<Memory>,
    scheduler: Scheduler,
}

impl Emulator {
    pub fn new(rom: Vec<u8>, options: EmulatorOptions) -> Result<Self, CartridgeError> {
        let cartridge = Cartridge::new(rom, options.saved_ram)?;
        let memory = Memory::new(cartridge, options.boot_rom);
        let cpu = if options.boot_rom.is_some() {
            Cpu::new(memory)
        } else {
            Cpu::new_post_boot(memory)
        };
        let scheduler = match options.cycles_per_frame {
            Some(cycles) => Scheduler::with_cycles_per_frame(cycles),
            None => Scheduler::new(),
        };

        Ok(Emulator { cpu, scheduler })
    }

    /// Run one frame's worth of instructions, leaving a fresh frame in
    /// `frame_buffer` and samples in `sample_buffer`.
    pub fn run_frame(&mut self) {
        self.cpu.memory.ppu.frame_complete = false;
        self.scheduler.run_frame(&mut self.cpu);
    }

    pub fn frame_buffer(&self) -> &[u32] {
        &self.cpu.memory.ppu.frame_buffer
    }

    pub fn drain_audio_samples(&mut self) -> Vec<f32> {
        self.cpu.memory.apu.sample_buffer.drain(..).collect()
    }

    pub fn press_key(&mut self, key: InputKey) {
        self.cpu.memory.press_key(key);
    }

    pub fn release_key(&mut self, key: InputKey) {
        self.cpu.memory.release_key(key);
    }

    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.cpu.memory.cartridge.battery_ram()
    }

    pub fn cartridge_title(&self) -> &str {
        &self.cpu.memory.cartridge.header.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_rom() -> Vec<u8> {
        vec![0u8; 0x8000]
    }

    #[test]
    fn test_new_without_boot_rom_starts_post_boot() {
        let emulator = Emulator::new(blank_rom(), EmulatorOptions::new()).unwrap();
        assert_eq!(emulator.cpu.registers.pc, 0x0100);
    }

    #[test]
    fn test_new_with_boot_rom_starts_at_zero() {
        let options = EmulatorOptions::new().with_boot_rom([0; BOOTROM_SIZE]);
        let emulator = Emulator::new(blank_rom(), options).unwrap();
        assert_eq!(emulator.cpu.registers.pc, 0x0000);
    }

    #[test]
    fn test_run_frame_produces_a_full_frame_buffer() {
        let mut emulator = Emulator::new(blank_rom(), EmulatorOptions::new()).unwrap();
        emulator.run_frame();
        assert_eq!(emulator.frame_buffer().len(), 160 * 144);
    }

    #[test]
    fn test_rejects_undersized_rom() {
        let result = Emulator::new(vec![0u8; 0x10], EmulatorOptions::new());
        assert!(result.is_err());
    }
}

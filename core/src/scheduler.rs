use crate::hardware::cpu::Cpu;
use crate::hardware::mmu::Memory;
use std::thread;
use std::time::{Duration, Instant};

/// T-states in one 59.7Hz frame: 154 scanlines * 456 cycles/line.
pub const CYCLES_PER_FRAME: u32 = 69_905;

const TARGET_FPS: f64 = 59.7275;
/// Never sleep longer than this in one frame, even if we're far behind
/// schedule (e.g. the process was suspended).
const MAX_SLEEP: Duration = Duration::from_millis(20);
/// If wall-clock has drifted more than this many frames behind the emulated
/// cadence, give up trying to catch up and resynchronise to "now" instead.
const MAX_FRAMES_BEHIND: u32 = 5;

/// Drives the CPU and the rest of the bus forward in lockstep, one frame's
/// worth of cycles at a time. Each CPU instruction's cycle count is fed
/// straight to the timer/APU/PPU before the next instruction is fetched, so
/// there's no event queue to keep synchronised - just a running total against
/// the frame budget, with any overshoot carried into the next frame so the
/// average cadence doesn't drift. After the cycle budget is spent, `run_frame`
/// sleeps toward the next 59.7275Hz deadline, tracking cumulative drift
/// between the wall clock and the emulated cadence rather than resetting on
/// every frame.
pub struct Scheduler {
    cycles_per_frame: u32,
    carry: u32,
    next_frame_at: Option<Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            cycles_per_frame: CYCLES_PER_FRAME,
            carry: 0,
            next_frame_at: None,
        }
    }

    pub fn with_cycles_per_frame(cycles_per_frame: u32) -> Self {
        Scheduler {
            cycles_per_frame,
            carry: 0,
            next_frame_at: None,
        }
    }

    /// Execute instructions until a full frame's worth of cycles has elapsed,
    /// then pace wall-clock toward the next frame's deadline.
    pub fn run_frame(&mut self, cpu: &mut Cpu<Memory>) {
        let mut elapsed = self.carry;
        while elapsed < self.cycles_per_frame {
            let cycles = cpu.step();
            cpu.memory.step(cycles);
            elapsed += cycles as u32;
        }
        self.carry = elapsed - self.cycles_per_frame;
        self.pace();
    }

    fn pace(&mut self) {
        let frame_duration = Duration::from_secs_f64(1.0 / TARGET_FPS);
        let now = Instant::now();
        let target = self.next_frame_at.unwrap_or(now);

        if target > now {
            thread::sleep((target - now).min(MAX_SLEEP));
        }

        let after_sleep = Instant::now();
        let next = target + frame_duration;

        self.next_frame_at = if after_sleep.saturating_duration_since(next) > frame_duration * MAX_FRAMES_BEHIND {
            Some(after_sleep + frame_duration)
        } else {
            Some(next)
        };
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::cartridge::Cartridge;

    fn cpu_with_nops() -> Cpu<Memory> {
        let mut rom = vec![0u8; 0x8000]; // all zero bytes decode as NOP (0x00)
        rom[0x0104..0x0104 + 0x30].copy_from_slice(&[0u8; 0x30]);
        let cartridge = Cartridge::new(rom, None).unwrap();
        let memory = Memory::new(cartridge, None);
        Cpu::new_post_boot(memory)
    }

    #[test]
    fn test_run_frame_advances_roughly_one_frame_of_cycles() {
        let mut cpu = cpu_with_nops();
        let mut scheduler = Scheduler::new();
        scheduler.run_frame(&mut cpu);
        assert!(scheduler.carry < 24); // largest single instruction is 24 cycles
    }

    #[test]
    fn test_overshoot_carries_into_next_frame() {
        let mut cpu = cpu_with_nops();
        let mut scheduler = Scheduler::with_cycles_per_frame(10);
        scheduler.run_frame(&mut cpu);
        assert!(scheduler.carry > 0); // a single NOP (4 cycles) overshoots a 10-cycle budget
    }

    #[test]
    fn test_run_frame_schedules_a_future_deadline() {
        let mut cpu = cpu_with_nops();
        let mut scheduler = Scheduler::new();
        let before = Instant::now();
        scheduler.run_frame(&mut cpu);
        assert!(scheduler.next_frame_at.unwrap() > before);
    }
}

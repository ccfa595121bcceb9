use gumdrop::Options;
use log::LevelFilter;
use pocketboy_core::emulator::{Emulator, EmulatorOptions};
use simplelog::{Config, TermLogger, TerminalMode};
use std::fs;

#[derive(Options, Debug, Default)]
struct CliOptions {
    /// Print this help message
    #[options()]
    help: bool,
    /// Path to the cartridge ROM image
    #[options(free)]
    cartridge: Option<String>,
    /// Path to a boot ROM image to run before the cartridge
    #[options(short = "b")]
    boot_rom: Option<String>,
    /// Override the scheduler's cycles-per-frame budget
    #[options(short = "c")]
    cycles_per_frame: Option<u32>,
    /// Stop and dump registers once PC reaches this address (hex, e.g. 0150)
    #[options(short = "r", long = "break-at")]
    break_at: Option<String>,
    /// Enable verbose (debug-level) logging
    #[options(short = "v")]
    verbose: bool,
    /// Number of frames to run before exiting (default: run until -br is hit)
    #[options()]
    frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let options = CliOptions::parse_args_default_or_exit();

    if options.help {
        println!("{}", CliOptions::usage());
        return Ok(());
    }

    let level = if options.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed)?;

    let cartridge_path = options
        .cartridge
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("a cartridge ROM path is required"))?;
    let rom = fs::read(cartridge_path)?;

    let mut emulator_options = EmulatorOptions::new();
    if let Some(path) = &options.boot_rom {
        let data = fs::read(path)?;
        let mut boot_rom = [0u8; pocketboy_core::io::bootrom::BOOTROM_SIZE];
        let n = data.len().min(boot_rom.len());
        boot_rom[..n].copy_from_slice(&data[..n]);
        emulator_options = emulator_options.with_boot_rom(boot_rom);
    }
    if let Some(path) = save_path(cartridge_path) {
        if let Ok(saved) = fs::read(&path) {
            emulator_options = emulator_options.with_saved_ram(saved);
        }
    }
    if let Some(cycles) = options.cycles_per_frame {
        emulator_options = emulator_options.with_cycles_per_frame(cycles);
    }

    let break_at = options
        .break_at
        .as_ref()
        .map(|s| u16::from_str_radix(s.trim_start_matches("0x"), 16))
        .transpose()?;

    let mut emulator = Emulator::new(rom, emulator_options)?;
    log::info!("Loaded \"{}\"", emulator.cartridge_title());

    // Runs for as long as the process is alive, paced to real time by the
    // scheduler, unless a breakpoint or a frame limit cuts it short.
    let mut frames_run: u64 = 0;
    loop {
        emulator.run_frame();
        frames_run += 1;

        if let Some(address) = break_at {
            if emulator.cpu.registers.pc == address {
                println!("Breakpoint hit at frame {}: {}", frames_run, emulator.cpu.registers);
                break;
            }
        }

        if let Some(limit) = options.frames {
            if frames_run >= limit {
                break;
            }
        }
    }

    if let Some(ram) = emulator.battery_ram() {
        if let Some(path) = save_path(cartridge_path) {
            fs::write(path, ram)?;
        }
    }

    Ok(())
}

fn save_path(cartridge_path: &str) -> Option<String> {
    let path = std::path::Path::new(cartridge_path);
    path.with_extension("sav").to_str().map(|s| s.to_owned())
}

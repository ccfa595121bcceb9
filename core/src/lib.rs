pub mod emulator;
pub mod hardware;
pub mod io;
pub mod scheduler;

pub use crate::emulator::{Emulator, EmulatorOptions};
pub use crate::hardware::cartridge::{Cartridge, CartridgeError};
pub use crate::hardware::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
pub use crate::io::joypad::InputKey;

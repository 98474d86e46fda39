pub mod apu;
pub mod board;
pub mod cartridge;
pub mod clock;
pub mod config;
pub mod cpu;
pub mod joypad;
pub mod mapper;
pub mod nes;
pub mod ppu;

pub use cartridge::{Rom, RomError};
pub use clock::Clock;
pub use config::Config;
pub use joypad::{Button, JoypadHandle};
pub use nes::{FrameSink, Nes};
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

//! Eightbeat — a terminal beep-music notation interpreter.

pub mod audio;
pub mod interrupt;
pub mod notation;
pub mod player;
pub mod theory;

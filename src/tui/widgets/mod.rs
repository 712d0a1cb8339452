//! TUI widgets for sqlpeek.

pub mod confirm;
pub mod grid;
pub mod header;
pub mod input;
pub mod mode_bar;
pub mod spinner;
pub mod toast;

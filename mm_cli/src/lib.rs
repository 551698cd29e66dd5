//! Internal modules for the memory match terminal driver.
//!
//! This library provides command parsing and text rendering used by the
//! mm_cli binary.

pub mod commands;
pub mod display;

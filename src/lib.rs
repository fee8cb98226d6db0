pub mod billing;
pub mod cli;
pub mod config;
pub mod core;

#[cfg(feature = "tui")]
pub mod ui;
pub mod utils;

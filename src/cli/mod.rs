pub mod commands;
pub mod plugins;

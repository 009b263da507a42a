pub mod backend;
pub mod clipboard;
pub mod config_io;
pub mod discovery;
pub mod editor;
pub mod logging;
pub mod mux;
pub mod process;
pub mod watcher;

pub mod app;
pub mod cmd;
pub mod form;
pub mod input;
pub mod layout;
pub mod mouse;
pub mod refresh;
pub mod render;
pub mod selection;
pub mod state;
pub mod text_input;
pub mod theme;
pub mod update;

#[cfg(test)]
mod test_helpers;

pub use app::run;

pub mod config;
pub mod draft;
pub mod filter;
pub mod issue;

pub use config::*;
pub use draft::*;
pub use filter::*;
pub use issue::*;

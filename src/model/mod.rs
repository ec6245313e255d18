pub mod config;
pub mod filter;
pub mod note;

pub use config::*;
pub use filter::*;
pub use note::*;

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use config::*;
pub use error::*;
pub use utils::*;

pub mod date;
pub mod logger;
pub mod stats;

pub use date::*;
pub use logger::*;

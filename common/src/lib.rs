pub mod config;
pub mod env;
pub mod fs;
pub mod softmax;

pub use config::*;
pub use env::*;
pub use fs::*;
pub use softmax::*;

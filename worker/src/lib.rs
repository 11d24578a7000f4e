pub mod client;
pub mod options;
pub mod worker;

pub use client::*;
pub use options::*;
pub use worker::*;

pub mod options;
pub mod self_learn;
pub mod trainer;
pub mod weight_sink;

pub use options::*;
pub use self_learn::*;
pub use trainer::*;
pub use weight_sink::*;

pub mod ack;
pub mod layers;
pub mod network;
pub mod node_metrics;
pub mod parameters;
pub mod predictor;
pub mod training_triplet;
pub mod weight_bundle;

pub use ack::*;
pub use network::*;
pub use node_metrics::*;
pub use parameters::*;
pub use predictor::*;
pub use training_triplet::*;
pub use weight_bundle::*;

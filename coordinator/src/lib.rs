pub mod coordinator;
pub mod error;
pub mod options;
pub mod routes;
pub mod triplet_store;
pub mod weight_store;

pub use coordinator::*;
pub use error::*;
pub use options::*;
pub use routes::*;
pub use triplet_store::*;
pub use weight_store::*;

use serde::{Deserialize, Serialize};

/// The coordinator's answer to a triplet report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub status: String,
    pub received: usize,
}

impl Ack {
    pub fn ok(received: usize) -> Self {
        Self {
            status: "ok".to_string(),
            received,
        }
    }
}

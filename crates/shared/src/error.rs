use serde::{Deserialize, Serialize};

/// Error payload some directory deployments attach to non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}

impl ServiceErrorBody {
    /// Best-effort decode; bodies that are not the expected JSON shape yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

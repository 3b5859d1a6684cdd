use serde::{Deserialize, Serialize};

/// The API generation a request targets or a record came from.
///
/// - `V0`: token-authenticated, returns plans as a list of objects
/// - `V1`: bearer-authenticated, returns plans wrapped in `{items: [{dmp: ...}]}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApiGeneration {
    V0,
    V1,
}

impl ApiGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0 => "v0",
            Self::V1 => "v1",
        }
    }

    /// Generation addressed by a request path relative to the API base.
    pub fn of_path(path: &str) -> Self {
        if path.trim_start_matches('/').starts_with("v1/") {
            Self::V1
        } else {
            Self::V0
        }
    }
}

use serde::{Deserialize, Serialize};

/// Response for listing current artifacts
#[derive(Debug, Serialize, Deserialize)]
pub struct ListArtifactsResponse {
    pub artifacts: Vec<String>,
}

/// Response for listing archived versions of one artifact
#[derive(Debug, Serialize, Deserialize)]
pub struct ListVersionsResponse {
    pub versions: Vec<String>,
}

/// Response for successful operations that don't return content
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

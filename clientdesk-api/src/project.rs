use serde::{Serialize, Deserialize};

/// public description of the backend project the service talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_id: String,
    pub mode: String,
    pub database: String,
    pub analytics: Option<String>,
    pub storage: StorageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageInfo {
    pub backend: String,
    pub origin: String,
    pub bucket: String,
    pub emulated: bool,
}

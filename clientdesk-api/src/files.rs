use serde::{Serialize, Deserialize};

/// prefix of request headers carried into an upload's custom metadata
pub const META_HEADER_PREFIX: &str = "x-meta-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadQuery {
    /// logical location the unique key is derived from
    #[serde(default)]
    pub path: String,
    /// original file name, only its extension is kept
    #[serde(default)]
    pub name: String,
}

/// a stored object and the url it can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

use std::path::PathBuf;
use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

#[derive(Debug, Deserialize)]
pub struct Listener {
    pub addr: String,
}

#[derive(Debug, Deserialize)]
pub struct Templates {
    pub dev_mode: Option<bool>,
    pub directory: Option<PathBuf>
}

#[derive(Debug, Deserialize)]
pub struct Assets {
    pub directories: Option<HashMap<String, PathBuf>>,
}

/// same field names the web console hands out
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Firebase,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct Emulator {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: Option<Backend>,
    pub emulator: Option<Emulator>,
    pub public_origin: Option<String>,
    pub cache_control: Option<String>,
    pub max_upload: Option<usize>,
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Theme {
    pub colors: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct Shell {
    pub default_theme: Option<String>,
    pub themes: Option<HashMap<String, Theme>>,
    pub icons: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub secure: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub mode: Option<Mode>,

    pub listeners: Option<HashMap<String, Listener>>,

    pub templates: Option<Templates>,
    pub assets: Option<Assets>,

    pub project: Option<Project>,
    pub storage: Option<Storage>,
    pub shell: Option<Shell>,
    pub session: Option<Session>,
}

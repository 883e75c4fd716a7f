use std::sync::Arc;

use clientdesk_api::project::{ProjectInfo, StorageInfo};
use url::Url;

use crate::config::{self, Mode, StorageBackend};
use crate::error::{self, Context};
use crate::storage::{Backend, StorageClient};
use crate::storage::firebase::{self, FirebaseBackend};
use crate::storage::memory::MemoryBackend;

/// document root of the project's default Firestore database
#[derive(Debug, Clone)]
pub struct Database {
    root: String,
}

impl Database {
    pub fn new(project_id: &str) -> Self {
        Database {
            root: format!(
                "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents"
            ),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

#[derive(Debug, Clone)]
pub struct Analytics {
    measurement_id: String,
}

impl Analytics {
    pub fn measurement_id(&self) -> &str {
        &self.measurement_id
    }
}

/// Handle to the hosted project.
///
/// Built once at startup, the storage origin is fixed by the launch mode
/// before any store operation can run.
#[derive(Debug)]
pub struct Project {
    config: config::Project,
    mode: Mode,
    database: Database,
    analytics: Option<Analytics>,
    storage: StorageClient,
    bucket: String,
    emulated: bool,
    memory: Option<Arc<MemoryBackend>>,
}

/// origin the storage backend talks to for the given mode
pub fn storage_origin(mode: Mode, emulator: &config::Emulator) -> error::Result<Url> {
    let given = if mode.is_development() {
        format!("http://{}:{}", emulator.host, emulator.port)
    } else {
        firebase::PRODUCTION_ORIGIN.to_owned()
    };

    Url::parse(&given).context(format!("invalid storage origin: \"{given}\""))
}

impl Project {
    pub fn from_config(config: &config::Config) -> error::Result<Self> {
        let settings = &config.settings;
        let mode = settings.mode;

        let (backend, memory): (Arc<dyn Backend>, Option<Arc<MemoryBackend>>) = match settings.storage.backend {
            StorageBackend::Firebase => {
                let origin = storage_origin(mode, &settings.storage.emulator)?;

                if mode.is_development() {
                    tracing::info!("development mode, storage emulator at {origin}");
                }

                let backend = FirebaseBackend::new(
                    origin,
                    settings.project.storage_bucket.clone(),
                    settings.project.app_id.clone(),
                    mode.is_development(),
                    settings.storage.timeout,
                )?;

                let backend: Arc<dyn Backend> = Arc::new(backend);

                (backend, None)
            },
            StorageBackend::Memory => {
                let backend = Arc::new(MemoryBackend::new(
                    settings.storage.public_origin.clone()
                ));

                let shared: Arc<dyn Backend> = backend.clone();

                (shared, Some(backend))
            }
        };

        let emulated = memory.is_none() && mode.is_development();

        Ok(Self::build(
            settings.project.clone(),
            mode,
            StorageClient::new(backend, settings.storage.cache_control.clone()),
            emulated,
            memory,
        ))
    }

    fn build(
        config: config::Project,
        mode: Mode,
        storage: StorageClient,
        emulated: bool,
        memory: Option<Arc<MemoryBackend>>,
    ) -> Self {
        let database = Database::new(&config.project_id);
        let analytics = config.measurement_id.clone()
            .map(|measurement_id| Analytics { measurement_id });
        let bucket = config.storage_bucket.clone();

        Project {
            config,
            mode,
            database,
            analytics,
            storage,
            bucket,
            emulated,
            memory,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn analytics(&self) -> Option<&Analytics> {
        self.analytics.as_ref()
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// present only when objects are held in process
    pub fn memory(&self) -> Option<&MemoryBackend> {
        self.memory.as_deref()
    }

    pub fn info(&self) -> ProjectInfo {
        let backend = self.storage.backend();

        ProjectInfo {
            project_id: self.config.project_id.clone(),
            mode: self.mode.as_str().to_owned(),
            database: self.database.root().to_owned(),
            analytics: self.analytics.as_ref()
                .map(|a| a.measurement_id().to_owned()),
            storage: StorageInfo {
                backend: backend.name().to_owned(),
                origin: backend.origin().to_owned(),
                bucket: self.bucket.clone(),
                emulated: self.emulated,
            },
        }
    }
}

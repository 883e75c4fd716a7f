use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clientdesk_lib::routes::{self, RouteTable};
use serde::Serialize;

use crate::config;
use crate::error;
use crate::project::Project;
use crate::template::Templates;

/// theme and icon set handed to the shell template
#[derive(Debug, Clone, Serialize)]
pub struct Shell {
    pub theme: Theme,
    pub themes: BTreeMap<String, BTreeMap<String, String>>,
    pub icons: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub name: String,
    pub colors: BTreeMap<String, String>,
}

impl Shell {
    pub fn from_config(shell: &config::Shell) -> error::Result<Self> {
        let themes: BTreeMap<String, BTreeMap<String, String>> = shell.themes.iter()
            .map(|(name, colors)| (
                name.clone(),
                colors.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            ))
            .collect();

        let Some(colors) = themes.get(&shell.default_theme) else {
            return Err(error::Error::new(error::Kind::Shell)
                .message(format!("default theme \"{}\" is not defined", shell.default_theme)));
        };

        Ok(Shell {
            theme: Theme {
                name: shell.default_theme.clone(),
                colors: colors.clone(),
            },
            themes,
            icons: shell.icons.clone(),
        })
    }
}

#[derive(Debug)]
pub struct Shared {
    project: Project,
    routes: RouteTable,
    templates: Templates,
    shell: Shell,
    assets: HashMap<String, PathBuf>,
    secure_cookies: bool,
    max_upload: usize,
    request_timeout: Duration,
}

pub type ArcShared = Arc<Shared>;

impl Shared {
    pub fn from_config(config: &config::Config) -> error::Result<Shared> {
        tracing::debug!("creating Shared state");

        let settings = &config.settings;
        let routes = routes::app_routes();

        for record in routes.records() {
            tracing::debug!(
                pattern = record.pattern(),
                requires_auth = record.requires_auth(),
                "view {}", record.name()
            );
        }

        // an upload is two backend calls, each bounded by the storage timeout
        let request_timeout = settings.storage.timeout * 2 + Duration::from_secs(5);

        Ok(Shared {
            project: Project::from_config(config)?,
            routes,
            templates: Templates::from_config(&settings.templates)?,
            shell: Shell::from_config(&settings.shell)?,
            assets: settings.assets.directories.clone(),
            secure_cookies: settings.session.secure,
            max_upload: settings.storage.max_upload,
            request_timeout,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn assets(&self) -> &HashMap<String, PathBuf> {
        &self.assets
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn max_upload(&self) -> usize {
        self.max_upload
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_shell() {
        let shell = Shell::from_config(&config::Shell::default()).expect("failed to create shell");

        assert_eq!(shell.theme.name, "light");
        assert_eq!(shell.theme.colors.get("primary").map(String::as_str), Some("#091545"));
        assert_eq!(shell.icons, "mdi");
    }

    #[test]
    fn request_timeout_covers_storage_calls() {
        use crate::config::TryDefault;

        let mut settings = config::Settings::try_default()
            .expect("failed to create default settings");
        settings.storage.backend = config::StorageBackend::Memory;
        settings.storage.timeout = Duration::from_secs(10);

        let shared = Shared::from_config(&config::Config { settings })
            .expect("failed to create state");

        assert_eq!(shared.request_timeout(), Duration::from_secs(25));
    }

    #[test]
    fn unknown_default_theme() {
        let mut given = config::Shell::default();
        given.default_theme = "dark".into();

        assert!(Shell::from_config(&given).is_err());
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::net::{SocketAddr, IpAddr};
use std::default::Default;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{self, Context};
use crate::path::{metadata, normalize};

mod shape;

pub trait TryDefault: Sized {
    type Error;

    fn try_default() -> Result<Self, Self::Error>;
}

#[derive(Debug, Parser)]
#[command(author, version ,about, long_about = None)]
pub struct CliArgs {
    /// a config path or directory to load file from
    #[arg(long)]
    config: Vec<PathBuf>,

    /// overrides the execution mode from the config files
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

/// Launch mode of the process.
///
/// Decided once before anything is built. Development points the object
/// store at the local emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }
}

impl Default for Mode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        }
    }
}

impl From<shape::Mode> for Mode {
    fn from(mode: shape::Mode) -> Self {
        match mode {
            shape::Mode::Development => Mode::Development,
            shape::Mode::Production => Mode::Production,
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
}

impl Config {
    pub fn from_args(args: CliArgs) -> error::Result<Self> {
        let cwd = std::env::current_dir()
            .context("failed to retrieve cwd for Settings")?;
        let mut settings = Settings::try_default()?;

        for config_path in args.config {
            let full = if config_path.is_absolute() {
                config_path
            } else {
                normalize(cwd.join(config_path))
            };

            tracing::debug!("loading config file \"{}\"", full.display());

            let loaded = Self::load_file(&full)?;
            let src = SrcFile::new(&full)?;
            let dot = DotPath::new(&"settings");

            settings.merge(&src, dot, loaded)?;
        }

        if let Some(mode) = args.mode {
            settings.mode = mode;
        }

        if settings.listeners.is_empty() {
            settings.listeners.insert("default".into(), Listener::default());
        }

        if matches!(settings.storage.backend, StorageBackend::Firebase) {
            if settings.project.storage_bucket.is_empty() {
                return Err(error::Error::config(
                    "settings.project.storageBucket is required for the firebase storage backend"
                ));
            }
        }

        tracing::debug!("{settings:#?}");

        Ok(Config {
            settings,
        })
    }

    fn load_file(path: &PathBuf) -> error::Result<shape::Settings> {
        let ext = path.extension().context(format!(
            "failed to retrieve the file extension for config file: \"{}\"", path.display()
        ))?;

        let ext = ext.to_ascii_lowercase();
        let file = std::fs::OpenOptions::new()
            .read(true)
            .open(path)
            .context(format!("failed to open config file: \"{}\"", path.display()))?;
        let reader = std::io::BufReader::new(file);

        if ext.eq("yaml") || ext.eq("yml") {
            serde_yaml::from_reader(reader).context(format!(
                "failed to parse yaml config file: \"{}\"", path.display()
            ))
        } else if ext.eq("json") {
            serde_json::from_reader(reader).context(format!(
                "failed to parse json config file: \"{}\"", path.display()
            ))
        } else {
            Err(error::Error::config(format!(
                "unknown type of config file: \"{}\"", path.display()
            )))
        }
    }
}

struct SrcFile<'a> {
    parent: &'a Path,
    src: &'a Path,
}

impl<'a> SrcFile<'a> {
    fn new(src: &'a Path) -> error::Result<Self> {
        let parent = src.parent().context(format!(
            "failed to retrieve parent path from source file \"{}\"", src.display()
        ))?;

        Ok(SrcFile {
            parent,
            src
        })
    }
}

impl<'a> Display for SrcFile<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.src.display())
    }
}

struct Quote<'a>(&'a dyn Display);

impl<'a> Display for Quote<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

struct DotPath<'a>(Vec<&'a dyn Display>);

impl<'a> DotPath<'a> {
    fn new(name: &'a (dyn Display)) -> Self {
        DotPath(vec![name])
    }

    fn push(&self, name: &'a (dyn Display)) -> Self {
        let mut path = self.0.clone();
        path.push(name);

        DotPath(path)
    }
}

impl<'a> Display for DotPath<'a> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;

        for name in &self.0 {
            if first {
                write!(fmt, "{name}")?;
                first = false;
            } else {
                write!(fmt, ".{name}")?;
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Settings {
    pub mode: Mode,
    pub listeners: HashMap<String, Listener>,
    pub templates: Templates,
    pub assets: Assets,
    pub project: Project,
    pub storage: Storage,
    pub shell: Shell,
    pub session: Session,
}

impl Settings {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, settings: shape::Settings) -> error::Result<()> {
        if let Some(mode) = settings.mode {
            self.mode = mode.into();
        }

        if let Some(listeners) = settings.listeners {
            for (key, listener) in listeners {
                if let Some(found) = self.listeners.get_mut(&key) {
                    found.merge(src, dot.push(&Quote(&key)), listener)?;
                } else {
                    let mut default = Listener::default();
                    default.merge(src, dot.push(&Quote(&key)), listener)?;

                    self.listeners.insert(key, default);
                }
            }
        }

        if let Some(templates) = settings.templates {
            self.templates.merge(src, dot.push(&"templates"), templates)?;
        }

        if let Some(assets) = settings.assets {
            self.assets.merge(src, dot.push(&"assets"), assets)?;
        }

        if let Some(project) = settings.project {
            self.project.merge(project);
        }

        if let Some(storage) = settings.storage {
            self.storage.merge(src, dot.push(&"storage"), storage)?;
        }

        if let Some(shell) = settings.shell {
            self.shell.merge(shell);
        }

        if let Some(session) = settings.session {
            if let Some(secure) = session.secure {
                self.session.secure = secure;
            }
        }

        Ok(())
    }
}

impl TryDefault for Settings {
    type Error = error::Error;

    fn try_default() -> Result<Self, Self::Error> {
        Ok(Settings {
            mode: Mode::default(),
            listeners: HashMap::new(),
            templates: Templates::default(),
            assets: Assets::default(),
            project: Project::default(),
            storage: Storage::try_default()?,
            shell: Shell::default(),
            session: Session::default(),
        })
    }
}

#[derive(Debug)]
pub struct Listener {
    pub addr: SocketAddr,
}

impl Listener {
    fn merge(&mut self, src: &SrcFile<'_>, dot_path: DotPath<'_>, listener: shape::Listener) -> error::Result<()> {
        self.addr = match SocketAddr::from_str(&listener.addr) {
            Ok(valid) => valid,
            Err(_) => match IpAddr::from_str(&listener.addr) {
                Ok(valid) => SocketAddr::from((valid, 8080)),
                Err(_) => {
                    return Err(error::Error::config(format!(
                        "{dot_path}.addr invalid: \"{}\" file: {src}", listener.addr
                    )));
                }
            }
        };

        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            addr: SocketAddr::from((
                IpAddr::from([0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]),
                8080
            )),
        }
    }
}

#[derive(Debug, Default)]
pub struct Templates {
    pub dev_mode: bool,
    /// extra templates, the built in shell is used when this is not set
    pub directory: Option<PathBuf>,
}

impl Templates {
    fn merge(&mut self, src: &SrcFile<'_>, dot_path: DotPath<'_>, templates: shape::Templates) -> error::Result<()> {
        if let Some(dev_mode) = templates.dev_mode {
            self.dev_mode = dev_mode;
        }

        if let Some(directory) = templates.directory {
            self.directory = Some(check_path(directory, src, dot_path.push(&"directory"), false)?);
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Assets {
    pub directories: HashMap<String, PathBuf>,
}

impl Assets {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, assets: shape::Assets) -> error::Result<()> {
        if let Some(directories) = assets.directories {
            let dirs_dot = dot.push(&"directories");

            for (url_key, path) in directories {
                let key = check_url(url_key.clone(), src, dirs_dot.push(&Quote(&url_key)))?;
                let path = check_path(path, src, dirs_dot.push(&Quote(&url_key)), false)?;

                self.directories.insert(key, path);
            }
        }

        Ok(())
    }
}

/// identifies the hosted project the client talks to
#[derive(Debug, Clone)]
pub struct Project {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: Option<String>,
}

impl Project {
    fn merge(&mut self, project: shape::Project) {
        if let Some(api_key) = project.api_key {
            self.api_key = api_key;
        }

        if let Some(auth_domain) = project.auth_domain {
            self.auth_domain = auth_domain;
        }

        if let Some(project_id) = project.project_id {
            self.project_id = project_id;
        }

        if let Some(storage_bucket) = project.storage_bucket {
            self.storage_bucket = storage_bucket;
        }

        if let Some(messaging_sender_id) = project.messaging_sender_id {
            self.messaging_sender_id = messaging_sender_id;
        }

        if let Some(app_id) = project.app_id {
            self.app_id = app_id;
        }

        if let Some(measurement_id) = project.measurement_id {
            self.measurement_id = Some(measurement_id);
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        // "demo-" projects are accepted by the emulators without credentials
        Project {
            api_key: String::new(),
            auth_domain: "demo-clientdesk.firebaseapp.com".into(),
            project_id: "demo-clientdesk".into(),
            storage_bucket: "demo-clientdesk.appspot.com".into(),
            messaging_sender_id: String::new(),
            app_id: String::new(),
            measurement_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firebase,
    Memory,
}

#[derive(Debug)]
pub struct Emulator {
    pub host: String,
    pub port: u16,
}

impl Default for Emulator {
    fn default() -> Self {
        Emulator {
            host: "localhost".into(),
            port: 9199,
        }
    }
}

#[derive(Debug)]
pub struct Storage {
    pub backend: StorageBackend,
    pub emulator: Emulator,
    /// origin used when building urls for objects held in memory
    pub public_origin: url::Url,
    pub cache_control: String,
    pub max_upload: usize,
    pub timeout: Duration,
}

impl Storage {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, storage: shape::Storage) -> error::Result<()> {
        if let Some(backend) = storage.backend {
            self.backend = match backend {
                shape::Backend::Firebase => StorageBackend::Firebase,
                shape::Backend::Memory => StorageBackend::Memory,
            };
        }

        if let Some(emulator) = storage.emulator {
            if let Some(host) = emulator.host {
                if host.trim().is_empty() {
                    return Err(error::Error::config(format!(
                        "{} cannot be empty. file: {src}", dot.push(&"emulator").push(&"host")
                    )));
                }

                self.emulator.host = host;
            }

            if let Some(port) = emulator.port {
                self.emulator.port = port;
            }
        }

        if let Some(public_origin) = storage.public_origin {
            self.public_origin = url::Url::parse(&public_origin).context(format!(
                "{} \"{public_origin}\" is not a valid url. file: {src}", dot.push(&"public_origin")
            ))?;
        }

        if let Some(cache_control) = storage.cache_control {
            self.cache_control = cache_control;
        }

        if let Some(max_upload) = storage.max_upload {
            self.max_upload = max_upload;
        }

        if let Some(timeout) = storage.timeout {
            if timeout == 0 {
                return Err(error::Error::config(format!(
                    "{} must be greater than 0. file: {src}", dot.push(&"timeout")
                )));
            }

            self.timeout = Duration::from_secs(timeout);
        }

        Ok(())
    }
}

impl TryDefault for Storage {
    type Error = error::Error;

    fn try_default() -> Result<Self, Self::Error> {
        Ok(Storage {
            backend: StorageBackend::Firebase,
            emulator: Emulator::default(),
            public_origin: url::Url::parse("http://localhost:8080")?,
            cache_control: clientdesk_lib::storage::CACHE_CONTROL.into(),
            max_upload: 50 * 1024 * 1024,
            timeout: Duration::from_secs(60),
        })
    }
}

#[derive(Debug)]
pub struct Shell {
    pub default_theme: String,
    pub themes: HashMap<String, HashMap<String, String>>,
    pub icons: String,
}

impl Shell {
    fn merge(&mut self, shell: shape::Shell) {
        if let Some(default_theme) = shell.default_theme {
            self.default_theme = default_theme;
        }

        if let Some(themes) = shell.themes {
            for (name, theme) in themes {
                let colors = self.themes.entry(name).or_default();

                if let Some(given) = theme.colors {
                    colors.extend(given);
                }
            }
        }

        if let Some(icons) = shell.icons {
            self.icons = icons;
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        let mut light = HashMap::new();
        light.insert(String::from("primary"), String::from("#091545"));

        let mut themes = HashMap::new();
        themes.insert(String::from("light"), light);

        Shell {
            default_theme: "light".into(),
            themes,
            icons: "mdi".into(),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub secure: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            secure: false,
        }
    }
}

fn check_path(given: PathBuf, src: &SrcFile<'_>, dot: DotPath<'_>, is_file: bool) -> error::Result<PathBuf> {
    let full = if given.is_absolute() {
        given
    } else {
        normalize(src.parent.join(given))
    };

    tracing::debug!("{dot} {src} checking {}", full.display());

    let meta = metadata(&full).context(format!(
        "{dot} failed to retrieve metadata for: {src}"
    ))?.context(format!(
        "{dot} {src} was not found"
    ))?;

    if is_file {
        if !meta.is_file() {
            return Err(error::Error::config(format!(
                "{dot} is not a file in: {src}"
            )));
        }
    } else {
        if !meta.is_dir() {
            return Err(error::Error::config(format!(
                "{dot} is not a directory in: {src}"
            )));
        }
    }

    Ok(full)
}

fn check_url(given: String, src: &SrcFile<'_>, dot: DotPath<'_>) -> error::Result<String> {
    let trimmed = given.trim();
    let rtn: String;

    let to_parse = if trimmed.starts_with('/') {
        rtn = trimmed.to_owned();

        format!("http://localhost{trimmed}")
    } else {
        rtn = format!("/{trimmed}");

        format!("http://localhost/{trimmed}")
    };

    // parsing resolves dot segments so they are checked before hand
    for part in rtn.split('/') {
        if part == ".." || part == "." {
            return Err(error::Error::config(format!(
                "{dot} \"{given}\" is not a valid url path. file: {src}"
            )));
        }
    }

    url::Url::parse(&to_parse).context(format!(
        "{dot} \"{given}\" is not a valid url path. file: {src}"
    ))?;

    Ok(rtn)
}

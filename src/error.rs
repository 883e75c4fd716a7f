type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// the part of startup that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Config,
    Template,
    Shell,
    Storage,
    Io,
    Other,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Config => "config",
            Kind::Template => "template",
            Kind::Shell => "shell",
            Kind::Storage => "storage",
            Kind::Io => "io",
            Kind::Other => "error",
        }
    }
}

/// Startup error.
///
/// Anything that fails before the listeners are bound ends up here and
/// stops the process.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    msg: Option<String>,
    src: Option<BoxDynError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            kind,
            msg: None,
            src: None,
        }
    }

    /// invalid or missing settings
    pub fn config<M>(msg: M) -> Error
    where
        M: Into<String>
    {
        Error::new(Kind::Config).message(msg)
    }

    pub fn message<M>(mut self, msg: M) -> Error
    where
        M: Into<String>
    {
        self.msg = Some(msg.into());
        self
    }

    pub fn source<S>(mut self, src: S) -> Error
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.as_str())?;

        if let Some(msg) = &self.msg {
            write!(f, ": {msg}")?;
        }

        if let Some(err) = &self.src {
            write!(f, "\n  caused by: {err}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

macro_rules! kind_from {
    ($kind:expr, $e:path) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new($kind).source(err)
            }
        }
    };
    ($kind:expr, $e:path, $m:expr) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new($kind)
                    .message($m)
                    .source(err)
            }
        }
    };
}

kind_from!(Kind::Io, std::io::Error);
kind_from!(Kind::Config, std::net::AddrParseError, "invalid listener address");
kind_from!(Kind::Config, serde_json::Error);
kind_from!(Kind::Config, serde_yaml::Error);
kind_from!(Kind::Config, url::ParseError, "invalid url");
kind_from!(Kind::Template, handlebars::TemplateError, "failed to register template");
kind_from!(Kind::Storage, reqwest::Error, "failed to create storage http client");

use clientdesk_lib::context_trait;

context_trait!(Error);

/// Failures given context keep the kind `Other`, except io failures that
/// stay `Io`.
impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<BoxDynError>
{
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        self.map_err(|err| {
            let err: BoxDynError = err.into();
            let kind = if err.is::<std::io::Error>() {
                Kind::Io
            } else {
                Kind::Other
            };

            Error::new(kind)
                .message(cxt)
                .source(err)
        })
    }
}

impl<T> Context<T, ()> for std::option::Option<T> {
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        self.ok_or_else(|| Error::new(Kind::Other).message(cxt))
    }
}

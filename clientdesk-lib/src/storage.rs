use strum::{AsRefStr as StrumAsRefStr};

/// cache directive attached to every uploaded object
pub const CACHE_CONTROL: &str = "public,max-age=3600";

/// custom metadata key holding the upload time
pub const UPLOADED_AT_KEY: &str = "uploadedAt";

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Reason codes reported by the object store.
///
/// Only the first three are given localized messages, everything else is
/// handed back to the caller as it was received.
#[derive(Debug, Clone, PartialEq, Eq, StrumAsRefStr)]
pub enum Code {
    #[strum(serialize = "storage/unauthorized")]
    Unauthorized,
    #[strum(serialize = "storage/canceled")]
    Canceled,
    #[strum(serialize = "storage/unknown")]
    Unknown,

    #[strum(serialize = "storage/unauthenticated")]
    Unauthenticated,
    #[strum(serialize = "storage/quota-exceeded")]
    QuotaExceeded,
    #[strum(serialize = "storage/object-not-found")]
    ObjectNotFound,
    #[strum(serialize = "storage/retry-limit-exceeded")]
    RetryLimitExceeded,
    #[strum(serialize = "storage/no-download-url")]
    NoDownloadUrl,
    #[strum(serialize = "storage/invalid-argument")]
    InvalidArgument,

    #[strum(serialize = "other")]
    Other(String),
}

impl Code {
    pub fn as_str(&self) -> &str {
        match self {
            Code::Other(code) => code.as_str(),
            known => known.as_ref(),
        }
    }

    /// message shown to the end user for the recognized codes
    pub fn localized(&self) -> Option<&'static str> {
        match self {
            Code::Unauthorized => Some("No tiene permisos para realizar esta operación"),
            Code::Canceled => Some("Operación cancelada"),
            Code::Unknown => Some("Error desconocido, por favor intente nuevamente"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        let known = [
            Code::Unauthorized,
            Code::Canceled,
            Code::Unknown,
            Code::Unauthenticated,
            Code::QuotaExceeded,
            Code::ObjectNotFound,
            Code::RetryLimitExceeded,
            Code::NoDownloadUrl,
            Code::InvalidArgument,
        ];

        for code in known {
            if code.as_ref() == value {
                return code;
            }
        }

        Code::Other(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// nothing is left once empty segments are dropped
    Root,
    /// a `.` or `..` segment
    Relative,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::Root => f.write_str("path does not name an object"),
            PathError::Relative => f.write_str("path contains relative segments"),
        }
    }
}

impl std::error::Error for PathError {}

/// Object paths are `/` separated with empty segments dropped, so
/// `/docs//foto/` and `docs/foto` name the same object.
pub fn canonical_path(path: &str) -> Result<String, PathError> {
    let mut segments = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" => {},
            "." | ".." => return Err(PathError::Relative),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        Err(PathError::Root)
    } else {
        Ok(segments.join("/"))
    }
}

/// extension as the browser reports it: text after the last `.`, or the
/// whole name when there is none
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => file_name,
    }
}

/// builds the storage key for an upload so repeated uploads to the same
/// logical path never overwrite each other
pub fn unique_key(path: &str, stamp: i64, file_name: &str) -> String {
    format!("{path}_{stamp}.{}", file_extension(file_name))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn code_strings() {
        let known = [
            ("storage/unauthorized", Code::Unauthorized),
            ("storage/canceled", Code::Canceled),
            ("storage/unknown", Code::Unknown),
            ("storage/object-not-found", Code::ObjectNotFound),
            ("storage/no-download-url", Code::NoDownloadUrl),
            ("storage/invalid-argument", Code::InvalidArgument),
        ];

        for (value, code) in known {
            assert_eq!(Code::from(value), code);
            assert_eq!(code.as_str(), value);
        }

        let other = Code::from("storage/invalid-checksum");
        assert_eq!(other, Code::Other(String::from("storage/invalid-checksum")));
        assert_eq!(other.to_string(), "storage/invalid-checksum");
    }

    #[test]
    fn localized_messages() {
        assert_eq!(
            Code::Unauthorized.localized(),
            Some("No tiene permisos para realizar esta operación")
        );
        assert_eq!(Code::Canceled.localized(), Some("Operación cancelada"));
        assert_eq!(
            Code::Unknown.localized(),
            Some("Error desconocido, por favor intente nuevamente")
        );
        assert_eq!(Code::ObjectNotFound.localized(), None);
        assert_eq!(Code::Other(String::from("storage/bucket-not-found")).localized(), None);
    }

    #[test]
    fn canonical_paths() {
        assert_eq!(canonical_path("docs/foto").unwrap(), "docs/foto");
        assert_eq!(canonical_path("/docs/foto").unwrap(), "docs/foto");
        assert_eq!(canonical_path("docs//foto/").unwrap(), "docs/foto");
        assert_eq!(canonical_path(".env/x").unwrap(), ".env/x");

        assert_eq!(canonical_path(""), Err(PathError::Root));
        assert_eq!(canonical_path("//"), Err(PathError::Root));
        assert_eq!(canonical_path("../x"), Err(PathError::Relative));
        assert_eq!(canonical_path("a/./b"), Err(PathError::Relative));
        assert_eq!(canonical_path("a/.."), Err(PathError::Relative));
    }

    #[test]
    fn key_derivation() {
        assert_eq!(
            unique_key("clients/12/contrato", 1700000000000, "contrato.firmado.pdf"),
            "clients/12/contrato_1700000000000.pdf"
        );
        assert_eq!(unique_key("docs/readme", 5, "README"), "docs/readme_5.README");
        assert_eq!(unique_key("docs/hidden", 5, ".env"), "docs/hidden_5.env");
        assert_eq!(unique_key("docs/empty", 5, "name."), "docs/empty_5.");
    }
}

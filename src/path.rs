use std::path::{PathBuf, Path, Component};
use std::fs::Metadata;
use std::io::ErrorKind;

pub fn metadata<P>(path: P) -> Result<Option<Metadata>, std::io::Error>
where
    P: AsRef<Path>
{
    match path.as_ref().metadata() {
        Ok(m) => Ok(Some(m)),
        Err(err) => match err.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(err)
        }
    }
}

pub fn normalize<P>(path: P) -> PathBuf
where
    P: AsRef<Path>
{
    let components = path.as_ref().components();
    let mut rtn = PathBuf::new();

    for comp in components {
        match comp {
            Component::Prefix(prefix) => {
                rtn.push(prefix.as_os_str());
            }
            Component::ParentDir => {
                rtn.pop();
            }
            Component::Normal(c) => {
                rtn.push(c);
            }
            Component::RootDir => {
                rtn.push(comp.as_os_str());
            }
            Component::CurDir => {}
        }
    }

    rtn
}

/// joins the `/` separated url path onto the base directory. `None` when a
/// segment would step outside of it
pub fn join_url_path<P>(base: P, url_path: &str) -> Option<PathBuf>
where
    P: AsRef<Path>
{
    let mut rtn = base.as_ref().to_path_buf();

    for part in url_path.split('/') {
        if part.is_empty() {
            continue;
        }

        if part == ".." || part == "." || part.contains('\\') {
            return None;
        }

        rtn.push(part);
    }

    Some(rtn)
}

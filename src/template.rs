use std::path::{Path, PathBuf};

use handlebars::Handlebars;

use crate::config;
use crate::error;

/// name of the template every allowed navigation renders
pub const SHELL: &str = "shell";

const BUILT_IN_SHELL: &str = include_str!("../templates/shell.hbs");

fn get_registry_name<'a>(base: &Path, path: &'a Path, strip_ext: &str) -> error::Result<&'a str> {
    let stripped = path.strip_prefix(base)
        .map_err(|_| error::Error::new(error::Kind::Template)
            .message(format!("template file is outside of the template directory. path: {}", path.display())))?
        .to_str()
        .ok_or(error::Error::new(error::Kind::Template)
            .message(format!("template file contains invalid UTF-8 characters. path: {}", path.display())))?;

    if let Some((name, _)) = stripped.rsplit_once(strip_ext) {
        Ok(name)
    } else {
        Ok(stripped)
    }
}

/// registers every `.hbs` file under the directory, nested directories
/// become part of the template name
fn load_template_directory(registry: &mut Handlebars<'_>, directory: &Path) -> error::Result<()> {
    use std::fs::read_dir;

    let mut dir_queue = Vec::with_capacity(1);
    dir_queue.push((directory.to_path_buf(), read_dir(directory)?));

    // breath first directory loading
    while let Some((path, iter)) = dir_queue.pop() {
        tracing::debug!(
            path = %path.display(),
            "loading directory",
        );

        for item in iter {
            let entry = item?;
            let entry_path = entry.path();
            let entry_type = entry.file_type()?;

            if entry_type.is_file() {
                let is_hbs = entry_path.extension()
                    .map(|ext| ext == "hbs")
                    .unwrap_or(false);

                if !is_hbs {
                    tracing::debug!(path = %entry_path.display(), "non handlebars file");
                    continue;
                }

                let name = get_registry_name(directory, &entry_path, ".hbs")?;

                tracing::debug!(
                    name = name,
                    path = %entry_path.display(),
                    "handlebars template",
                );

                registry.register_template_file(name, &entry_path)?;
            } else if entry_type.is_dir() {
                let entry_iter = read_dir(&entry_path)?;

                dir_queue.push((entry_path, entry_iter));
            } else {
                tracing::debug!(
                    path = %entry_path.display(),
                    "symlink"
                );
            }
        }
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct Builder {
    templates: Option<PathBuf>,
    dev_mode: bool,
}

impl Builder {
    pub fn set_templates<P>(&mut self, path: P) -> &mut Self
    where
        P: Into<PathBuf>
    {
        self.templates = Some(path.into());
        self
    }

    pub fn set_dev_mode(&mut self, value: bool) -> &mut Self {
        self.dev_mode = value;
        self
    }

    pub fn build(self) -> error::Result<Templates> {
        let mut registry = Handlebars::new();
        registry.set_dev_mode(self.dev_mode);

        if let Some(directory) = &self.templates {
            load_template_directory(&mut registry, directory)?;
        }

        if !registry.has_template(SHELL) {
            tracing::debug!("using built in shell template");

            registry.register_template_string(SHELL, BUILT_IN_SHELL)?;
        }

        Ok(Templates {
            registry
        })
    }
}

#[derive(Debug)]
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn from_config(config: &config::Templates) -> error::Result<Self> {
        let mut builder = Self::builder();
        builder.set_dev_mode(config.dev_mode);

        if let Some(directory) = &config.directory {
            builder.set_templates(directory.clone());
        }

        builder.build()
    }

    pub fn has_template<N>(&self, name: N) -> bool
    where
        N: AsRef<str>
    {
        self.registry.has_template(name.as_ref())
    }

    pub fn render<N, T>(&self, name: N, data: &T) -> Result<String, handlebars::RenderError>
    where
        N: AsRef<str>,
        T: serde::Serialize,
    {
        self.registry.render(name.as_ref(), data)
    }
}

/// json that is safe to place inside of a `<script>` element
pub fn script_json<T>(data: &T) -> Result<String, serde_json::Error>
where
    T: serde::Serialize
{
    let json = serde_json::to_string(data)?;

    Ok(json.replace('<', "\\u003c"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn built_in_shell() {
        let templates = Templates::builder().build().expect("failed to build templates");

        assert!(templates.has_template(SHELL));

        let rendered = templates.render(SHELL, &serde_json::json!({
            "route": { "name": "dashboard", "view": "Dashboard" },
            "theme": { "name": "light", "colors": { "primary": "#091545" } },
            "icons": "mdi",
            "params_json": "{}",
            "project_json": "{\"project_id\":\"demo\"}",
        })).expect("failed to render shell");

        assert!(rendered.contains("data-view=\"Dashboard\""));
        assert!(rendered.contains("--theme-primary: #091545;"));
        assert!(rendered.contains("data-icons=\"mdi\""));
        assert!(rendered.contains("{\"project_id\":\"demo\"}"));
    }

    #[test]
    fn directory_overrides_shell() {
        let dir = std::env::temp_dir().join(format!("clientdesk-templates-{}", std::process::id()));
        let nested = dir.join("partials");
        std::fs::create_dir_all(&nested).expect("failed to create template directory");
        std::fs::write(dir.join("shell.hbs"), "custom {{route.name}}").unwrap();
        std::fs::write(nested.join("footer.hbs"), "footer").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut builder = Templates::builder();
        builder.set_templates(dir.clone());
        let templates = builder.build().expect("failed to build templates");

        assert!(templates.has_template("partials/footer"));
        assert!(!templates.has_template("notes.txt"));

        let rendered = templates.render(SHELL, &serde_json::json!({
            "route": { "name": "login" }
        })).expect("failed to render shell");
        assert_eq!(rendered, "custom login");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn script_json_escapes_tags() {
        let json = script_json(&serde_json::json!({ "name": "</script>" })).unwrap();

        assert_eq!(json, r#"{"name":"\u003c/script>"}"#);
    }
}

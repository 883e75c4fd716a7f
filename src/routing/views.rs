use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use clientdesk_api::Payload;
use clientdesk_api::view::View;
use clientdesk_lib::routes::Record;
use serde::Serialize;

use crate::net::{self, error};
use crate::path::join_url_path;
use crate::state::{ArcShared, Shell, Theme};
use crate::template;

#[derive(Serialize)]
struct ShellContext<'a> {
    route: &'a Record,
    params: &'a BTreeMap<String, String>,
    theme: &'a Theme,
    icons: &'a str,
    params_json: String,
    project_json: String,
}

fn render_shell(
    state: &ArcShared,
    shell: &Shell,
    record: &Record,
    params: &BTreeMap<String, String>,
) -> error::Result<Response> {
    let context = ShellContext {
        route: record,
        params,
        theme: &shell.theme,
        icons: &shell.icons,
        params_json: template::script_json(params)?,
        project_json: template::script_json(&state.project().info())?,
    };

    let rendered = state.templates().render(template::SHELL, &context)?;

    Ok(net::html::html_response(rendered)?.into_response())
}

/// serves a file from the first asset directory whose url prefix matches
async fn serve_asset(state: &ArcShared, path: &str) -> error::Result<Response> {
    for (prefix, directory) in state.assets() {
        let Some(rest) = path.strip_prefix(prefix.as_str()) else {
            continue;
        };

        if !prefix.ends_with('/') && !rest.is_empty() && !rest.starts_with('/') {
            continue;
        }

        let Some(full) = join_url_path(directory, rest) else {
            return Err(error::Error::api(error::GeneralKind::InvalidUri));
        };

        return Ok(net::fs::response_file(path, full).await?.into_response());
    }

    Err(error::Error::api(error::GeneralKind::NotFound))
}

/// Fallback for everything that is not an api route.
///
/// Known views render the shell (or describe the view for non html
/// clients), anything else is looked up in the asset directories.
pub async fn serve(
    State(state): State<ArcShared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> error::Result<Response> {
    if method != Method::GET && method != Method::HEAD {
        return Err(error::Error::api(error::GeneralKind::InvalidMethod));
    }

    let Some(found) = state.routes().resolve(uri.path()) else {
        return serve_asset(&state, uri.path()).await;
    };

    let record = found.record();

    if net::html::is_html_accept(&headers)?.is_some() {
        return render_shell(&state, state.shell(), record, found.params());
    }

    Ok(Payload::new(View {
        name: record.name().to_owned(),
        view: record.view().to_owned(),
        pattern: record.pattern().to_owned(),
        requires_auth: record.requires_auth(),
        params: found.into_params(),
    }).into_response())
}

use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::Arc;
use tracing::{debug, warn};

use super::listing::render_listing;
use super::route::DocRoute;
use crate::archive::EntryStream;
use crate::error::{DocsError, Result};
use crate::service::DocService;

pub const NOT_FOUND_BODY: &str = "Ooops! Javadocs not found!?";

/// Seven days
pub const ENTRY_CACHE_CONTROL: &str = "max-age=604800";

pub async fn root(State(service): State<Arc<DocService>>) -> Response {
    respond("/", listing(&service, DocRoute::Groups).await)
}

pub async fn browse(
    State(service): State<Arc<DocService>>,
    uri: Uri,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Response {
    let Ok(Path(path)) = path else {
        debug!(uri = %uri, "undecodable request path");
        return not_found();
    };

    match DocRoute::parse(&path) {
        DocRoute::AddTrailingSlash => Redirect::permanent(&slash_terminated(uri.path())).into_response(),
        DocRoute::Entry {
            group,
            artifact,
            version,
            path: entry,
        } => {
            let result = service.open_document(&group, &artifact, &version, &entry).await;
            respond(uri.path(), result.map(entry_response))
        }
        route => respond(uri.path(), listing(&service, route).await),
    }
}

/// Relative location of `path` with a trailing slash. It never starts with
/// `//` or a scheme, so it cannot point at another host.
fn slash_terminated(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or_default();
    format!("./{last}/")
}

async fn listing(service: &DocService, route: DocRoute) -> Result<Response> {
    let (caption, children) = match route {
        DocRoute::Groups => ("Groups".to_string(), service.list_groups().await?),
        DocRoute::Artifacts { group } => {
            let children = service.list_artifacts(&group).await?;
            (format!("Artifacts for {group}"), children)
        }
        DocRoute::Versions { group, artifact } => {
            let children = service.list_versions(&group, &artifact).await?;
            (format!("Versions for {artifact}"), children)
        }
        other => return Err(DocsError::malformed(format!("{other:?} is not a listing"))),
    };
    Ok(Html(render_listing(&caption, &children)).into_response())
}

fn entry_response(entry: EntryStream) -> Response {
    let headers = [
        (CONTENT_TYPE, entry.content_type().to_string()),
        (CONTENT_LENGTH, entry.content_length().to_string()),
        (CACHE_CONTROL, ENTRY_CACHE_CONTROL.to_string()),
    ];
    (headers, Body::from_stream(entry.into_stream())).into_response()
}

/// Every failure becomes the same 404; the log keeps the cause.
fn respond(path: &str, result: Result<Response>) -> Response {
    match result {
        Ok(response) => response,
        Err(err @ (DocsError::NotFound(_) | DocsError::MalformedRequest(_))) => {
            debug!(path, error = %err, "request not served");
            not_found()
        }
        Err(err) => {
            warn!(path, error = %err, "request failed");
            not_found()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

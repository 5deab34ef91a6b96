//! Static front-end assets
//!
//! Unmatched GET requests are served from the UI directory. Paths that do
//! not name an existing file fall back to `index.html` so client-side
//! routes resolve. Real files may be cached for two weeks; the fallback
//! page must always be revalidated.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use percent_encoding::percent_decode_str;
use tower_http::services::{ServeDir, ServeFile};

/// Cache policy for files that exist in the UI directory
pub const CACHE_ASSET: &str = "max-age=1209600, stale-while-revalidate=86400";
/// Cache policy for the `index.html` fallback
pub const CACHE_FALLBACK: &str = "no-cache";

/// Router serving `dir` with index fallback and cache headers
pub fn router(dir: &Path) -> Router {
    let serve = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));

    Router::new()
        .fallback_service(serve)
        .layer(middleware::from_fn_with_state(
            Arc::new(dir.to_path_buf()),
            cache_control,
        ))
}

async fn cache_control(
    State(dir): State<Arc<PathBuf>>,
    request: Request,
    next: Next,
) -> Response {
    let is_asset = match resolve(&dir, request.uri().path()) {
        Some(path) => tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false),
        None => false,
    };

    let mut response = next.run(request).await;
    let policy = if is_asset { CACHE_ASSET } else { CACHE_FALLBACK };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(policy));
    response
}

/// Map a request path onto `dir`; `None` if it would leave the directory
///
/// Segments are percent-decoded the way `ServeDir` decodes them, so the
/// file checked here is the file that gets served.
fn resolve(dir: &Path, uri_path: &str) -> Option<PathBuf> {
    let mut path = dir.to_path_buf();
    for segment in uri_path.split('/') {
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        if decoded.contains('/') || decoded.contains('\\') {
            return None;
        }

        let mut components = Path::new(&*decoded).components();
        match (components.next(), components.next()) {
            (None, _) | (Some(Component::CurDir), None) => {}
            (Some(Component::Normal(part)), None) => path.push(part),
            _ => return None,
        }
    }
    Some(path)
}

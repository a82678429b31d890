mod chat;
mod images;
mod songs;
mod videos;

use crate::auth::AdminToken;
use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::media::{MediaKind, is_safe_segment};
use crate::storage::MediaStore;
use crate::upload::MULTIPART_OVERHEAD;
use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use http::HeaderValue;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub type Store = Arc<dyn MediaStore>;

/// Builds the API plus static serving of the three media trees.
pub fn router(store: Store, config: &AppConfig) -> Router {
    let static_files = media_files(store.root());

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/categories",
            get(images::list_categories).post(images::create_category),
        )
        .route("/api/images", get(images::list_all))
        .route("/api/images/{category}", get(images::list_category))
        .route("/api/images/{category}/{filename}", delete(images::delete))
        .route(
            "/api/upload",
            post(images::upload).layer(upload_limit(MediaKind::Image)),
        )
        .route("/api/videos", get(videos::list))
        .route(
            "/api/videos/upload",
            post(videos::upload).layer(upload_limit(MediaKind::Video)),
        )
        .route("/api/videos/{filename}", delete(videos::delete))
        .route("/api/songs", get(songs::list))
        .route(
            "/api/songs/upload",
            post(songs::upload).layer(upload_limit(MediaKind::Audio)),
        )
        .route("/api/songs/{filename}", delete(songs::delete))
        .route("/api/chat", post(chat::reply))
        .merge(static_files)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(cors_layer(config.cors_origins.as_deref()))
                .layer(Extension(store))
                .layer(Extension(AdminToken::new(config.admin_token.as_deref()))),
        )
}

/// `/pofimage`, `/pofanimation` and `/pofsong`, each served from its own directory.
fn media_files(root: &Path) -> Router {
    [MediaKind::Image, MediaKind::Video, MediaKind::Audio]
        .into_iter()
        .fold(Router::new(), |router, kind| {
            let dir = kind.dir_name();
            router.nest_service(&format!("/{dir}"), ServeDir::new(root.join(dir)))
        })
        .layer(middleware::from_fn(hide_private_files))
}

async fn hide_private_files(request: Request, next: Next) -> Response {
    if is_private_path(request.uri().path()) {
        return not_found().await.into_response();
    }
    next.run(request).await
}

/// Dotfiles and in-flight `.part` writes are never served.
fn is_private_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase();
        segment.starts_with('.')
            || segment.starts_with("%2e")
            || segment.ends_with(".part")
            || segment.ends_with("%2epart")
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

async fn health() -> &'static str {
    "OK\nAPI Version: 1.0"
}

fn upload_limit(kind: MediaKind) -> DefaultBodyLimit {
    DefaultBodyLimit::max(kind.max_bytes() + MULTIPART_OVERHEAD)
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid cors origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Rejects request path segments that could leave their directory.
fn ensure_segment(segment: &str, what: &str) -> Result<(), ApiError> {
    if is_safe_segment(segment) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("Invalid {what}: {segment:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_paths_are_recognised() {
        assert!(is_private_path("/.env"));
        assert!(is_private_path("/cats/.hidden.png"));
        assert!(is_private_path("/cats/%2Eenv"));
        assert!(is_private_path("/song-1-2.mp3.part"));
        assert!(!is_private_path("/fun-stuff/image-1-2.png"));
        assert!(!is_private_path("/"));
    }
}

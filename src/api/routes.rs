//! HTTP API route definitions.

use std::path::Path;

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue, Response, StatusCode},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    services::{fs::ServeFileSystemResponseBody, ServeDir},
    set_header::SetResponseHeader,
    trace::TraceLayer,
};

use super::handlers::{
    create_appointment, create_contact, delete_appointment, delete_message, list_appointments,
    list_messages, login, root, AppState,
};
use crate::store::Store;

/// Static assets may be cached for one day.
const STATIC_CACHE_CONTROL: &str = "public, max-age=86400";

/// Create the API router.
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/login", post(login::<S>))
        // Contact messages
        .route("/api/contact", post(create_contact::<S>))
        .route("/api/messages", get(list_messages::<S>))
        .route("/api/messages/:id", delete(delete_message::<S>))
        // Appointments
        .route(
            "/api/appointments",
            post(create_appointment::<S>).get(list_appointments::<S>),
        )
        .route("/api/appointments/:id", delete(delete_appointment::<S>))
        .with_state(state)
}

/// Cache header for responses that carry (or revalidate) a file; misses stay uncached.
fn static_cache_control(response: &Response<ServeFileSystemResponseBody>) -> Option<HeaderValue> {
    let status = response.status();
    (status.is_success() || status == StatusCode::NOT_MODIFIED)
        .then(|| HeaderValue::from_static(STATIC_CACHE_CONTROL))
}

/// Serve files from `dir` for every path no route claims.
pub fn static_files(dir: impl AsRef<Path>) -> Router {
    Router::new().fallback_service(SetResponseHeader::overriding(
        ServeDir::new(dir),
        CACHE_CONTROL,
        static_cache_control,
    ))
}

/// The full application: API routes, static fallback and request tracing.
pub fn app<S: Store>(state: AppState<S>, static_dir: impl AsRef<Path>) -> Router {
    create_router(state)
        .merge(static_files(static_dir))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::BANNER;
    use crate::store::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::ETAG, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state(store: MemoryStore) -> AppState<MemoryStore> {
        AppState::new(store, Some("secret123".to_string()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn root_returns_banner() {
        let app = create_router(state(MemoryStore::new()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], BANNER.as_bytes());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let app = create_router(state(MemoryStore::new()));

        let response = app
            .oneshot(post_json("/api/login", json!({ "password": "wrong" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Invalid Password" })
        );
    }

    #[tokio::test]
    async fn login_is_exact_match() {
        for attempt in ["secret123 ", "SECRET123", " secret123"] {
            let app = create_router(state(MemoryStore::new()));
            let response = app
                .oneshot(post_json("/api/login", json!({ "password": attempt })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{attempt:?}");
        }

        let app = create_router(state(MemoryStore::new()));
        let response = app
            .oneshot(post_json("/api/login", json!({ "password": "secret123" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn login_without_configured_secret_always_fails() {
        let app = create_router(AppState::new(MemoryStore::new(), None));

        let response = app
            .oneshot(post_json("/api/login", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn appointments_list_tolerates_missing_table() {
        let app = create_router(state(MemoryStore::without_schema()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn messages_list_does_not_tolerate_missing_table() {
        let app = create_router(state(MemoryStore::without_schema()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Failed to fetch messages" })
        );
    }

    #[tokio::test]
    async fn appointments_list_reports_other_failures() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let app = create_router(state(store));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "Database Error" }));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = create_router(state(MemoryStore::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"name\":"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_delete_id_reports_database_error() {
        let app = create_router(state(MemoryStore::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/messages/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Database Error" })
        );
    }

    #[tokio::test]
    async fn missing_static_files_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();

        for uri in ["/index.html", "/api/nope"] {
            let app = app(state(MemoryStore::new()), dir.path());
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert!(response.headers().get(CACHE_CONTROL).is_none(), "{uri}");
        }
    }

    #[tokio::test]
    async fn served_static_files_are_cached_for_a_day() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hello</h1>").unwrap();
        let app = app(state(MemoryStore::new()), dir.path());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], STATIC_CACHE_CONTROL);
        assert!(response.headers().get(ETAG).is_none());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>hello</h1>");
    }

    #[tokio::test]
    async fn routes_take_precedence_over_static_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hello</h1>").unwrap();
        let app = app(state(MemoryStore::new()), dir.path());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], BANNER.as_bytes());
    }

    #[tokio::test]
    async fn login_rejects_non_string_passwords() {
        let app = create_router(AppState::new(MemoryStore::new(), Some("123".to_string())));
        let response = app
            .oneshot(post_json("/api/login", json!({ "password": 123 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let app = create_router(AppState::new(MemoryStore::new(), Some("true".to_string())));
        let response = app
            .oneshot(post_json("/api/login", json!({ "password": true })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let app = create_router(state(MemoryStore::new()));
        let response = app
            .oneshot(post_json("/api/login", json!(["secret123"])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Invalid Password" })
        );
    }

    #[tokio::test]
    async fn primitive_json_body_is_bad_request() {
        let app = create_router(state(MemoryStore::new()));

        let response = app
            .oneshot(post_json("/api/contact", json!("Ana")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Invalid JSON body" }));
    }
}

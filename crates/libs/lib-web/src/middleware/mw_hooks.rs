//! # Record Hook Middleware
//!
//! Runs the hook pipeline over JSON request bodies before they reach a
//! handler.
//!
//! `POST`, `PUT` and `PATCH` map to the `create`, `update` and `patch`
//! methods. Their JSON body becomes the context record, the pipeline mutates
//! it, and the handler receives the result. Any other request, or a body that
//! is not declared as JSON, passes through untouched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::{Router, middleware::from_fn_with_state};
//! use lib_web::{AppState, middleware::run_hooks};
//!
//! fn app(state: AppState) -> Router {
//!     Router::new()
//!         .layer(from_fn_with_state(state.clone(), run_hooks))
//!         .with_state(state)
//! }
//! ```

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, header::CONTENT_TYPE, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use lib_core::{Context, HookError, Method};
use tracing::debug;

use crate::server::AppState;

/// Hook method for an HTTP method, if it writes a record.
pub fn hook_method(method: &axum::http::Method) -> Option<Method> {
    match *method {
        axum::http::Method::POST => Some(Method::Create),
        axum::http::Method::PUT => Some(Method::Update),
        axum::http::Method::PATCH => Some(Method::Patch),
        _ => None,
    }
}

/// Whether the request declares a JSON body (`application/json` or `+json`).
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Map a body buffering failure: only a hit limit is `PayloadTooLarge`.
pub fn body_error(err: axum::Error, limit: usize) -> HookError {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = cause {
        if e.is::<LengthLimitError>() {
            return HookError::PayloadTooLarge(limit);
        }
        cause = e.source();
    }

    HookError::InvalidBody(format!("Failed to read body: {}", err))
}

/// Record hook middleware.
pub async fn run_hooks(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HookError> {
    let Some(method) = hook_method(req.method()) else {
        return Ok(next.run(req).await);
    };

    if !is_json(req.headers()) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    let bytes = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| body_error(e, state.max_body_bytes))?;

    let mut ctx = Context::new(method).with_data(serde_json::from_slice(&bytes)?);

    state.pipeline.run(&mut ctx).await?;

    let stamped = serde_json::to_vec(&ctx.data)
        .map_err(|e| HookError::Internal(format!("Failed to encode record: {}", e)))?;

    debug!(
        method = %method,
        path = %parts.uri.path(),
        bytes = stamped.len(),
        "[HOOKS] record stamped"
    );

    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(stamped.len()));

    Ok(next.run(Request::from_parts(parts, Body::from(stamped))).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Bytes,
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::post,
        Json, Router,
    };
    use chrono::{TimeZone, Utc};
    use lib_core::{Config, FixedClock, Pipeline, UpdateTimestamps};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(max_body_bytes: usize) -> AppState {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let hook = UpdateTimestamps::from_config(&Config::default()).with_clock(FixedClock(at));

        AppState {
            pipeline: Pipeline::new().with(hook),
            max_body_bytes,
        }
    }

    fn echo_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/echo",
                post(|body: String| async move { body })
                    .put(|Json(v): Json<Value>| async move { Json(v) })
                    .get(|| async { "untouched" }),
            )
            .layer(from_fn_with_state(state.clone(), run_hooks))
            .with_state(state)
    }

    async fn send(app: Router, method: &str, content_type: Option<&str>, body: &str) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().method(method).uri("/echo");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }

        let response = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_hook_method_mapping() {
        assert_eq!(hook_method(&axum::http::Method::POST), Some(Method::Create));
        assert_eq!(hook_method(&axum::http::Method::PUT), Some(Method::Update));
        assert_eq!(hook_method(&axum::http::Method::PATCH), Some(Method::Patch));
        assert_eq!(hook_method(&axum::http::Method::GET), None);
        assert_eq!(hook_method(&axum::http::Method::DELETE), None);
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }

    #[tokio::test]
    async fn test_post_body_is_stamped() {
        let (status, body) = send(echo_app(test_state(1024)), "POST", Some("application/json"), r#"{"title":"x"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let record: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            record,
            json!({
                "title": "x",
                "updatedAt": "2024-01-01T00:00:00.000Z",
                "createdAt": "2024-01-01T00:00:00.000Z",
            })
        );
    }

    #[tokio::test]
    async fn test_put_body_gets_updated_at_only() {
        let (status, body) = send(echo_app(test_state(1024)), "PUT", Some("application/json"), "{}").await;

        assert_eq!(status, StatusCode::OK);
        let record: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(record, json!({ "updatedAt": "2024-01-01T00:00:00.000Z" }));
    }

    #[tokio::test]
    async fn test_non_json_passes_through() {
        let (status, body) = send(echo_app(test_state(1024)), "POST", Some("text/plain"), "plain words").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "plain words");
    }

    #[tokio::test]
    async fn test_get_passes_through() {
        let (status, body) = send(echo_app(test_state(1024)), "GET", None, "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "untouched");
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected() {
        let (status, body) = send(echo_app(test_state(1024)), "POST", Some("application/json"), "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(error["code"], "InvalidBody");
    }

    #[tokio::test]
    async fn test_non_object_json_is_rejected() {
        let (status, body) = send(echo_app(test_state(1024)), "POST", Some("application/json"), "[1,2]").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(error["code"], "MalformedData");
    }

    #[tokio::test]
    async fn test_broken_body_stream_is_not_payload_too_large() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset")),
        ];

        let response = echo_app(test_state(1024))
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from_stream(futures_util::stream::iter(chunks)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error["code"], "InvalidBody");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let big = format!(r#"{{"blob":"{}"}}"#, "a".repeat(64));
        let (status, _) = send(echo_app(test_state(16)), "POST", Some("application/json"), &big).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}

//! # Request Stamping Middleware
//!
//! Gives every request an ID and a receive time, stored in request extensions
//! and echoed back in the `X-Request-ID` response header.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::{Router, middleware::from_fn};
//! use lib_web::middleware::mw_req_stamp::stamp_req;
//!
//! let app: Router = Router::new().layer(from_fn(stamp_req));
//! ```
//!
//! Handlers read it via `Extension<RequestStamp>`.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use lib_utils::now_utc;
use uuid::Uuid;

/// Response header carrying the request ID.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// When the request entered the stack
    pub received_at: DateTime<Utc>,
}

impl RequestStamp {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            received_at: now_utc(),
        }
    }
}

/// Request stamping middleware.
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::new();

    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}

//! # Record Handlers
//!
//! Write endpoints that answer with the record as the hook pipeline left it.
//! Nothing is persisted.
//!
//! ## Request Examples
//!
//! ```bash
//! curl -X POST http://localhost:3030/api/records \
//!      -H 'content-type: application/json' -d '{"title":"draft"}'
//! ```

use axum::{extract::Path, http::StatusCode, Json};
use serde_json::Value;
use tracing::{debug, instrument};

/// Create a record.
///
/// **Route**: `POST /api/records`
///
/// Success (201): the stamped record.
#[instrument(skip_all)]
pub async fn create_record(Json(record): Json<Value>) -> (StatusCode, Json<Value>) {
    debug!("[RECORDS] create");
    (StatusCode::CREATED, Json(record))
}

/// Replace a record.
///
/// **Route**: `PUT /api/records/{id}`
#[instrument(skip(record))]
pub async fn update_record(Path(id): Path<String>, Json(record): Json<Value>) -> Json<Value> {
    debug!("[RECORDS] update");
    Json(with_id(record, id))
}

/// Patch a record.
///
/// **Route**: `PATCH /api/records/{id}`
#[instrument(skip(record))]
pub async fn patch_record(Path(id): Path<String>, Json(record): Json<Value>) -> Json<Value> {
    debug!("[RECORDS] patch");
    Json(with_id(record, id))
}

fn with_id(mut record: Value, id: String) -> Value {
    if let Some(obj) = record.as_object_mut() {
        obj.insert("id".to_string(), Value::String(id));
    }
    record
}

//! Handler for the children-listing endpoint.

use crate::{
    errors::AppError,
    models::{entry::ChildEntry, key::StorageKey},
    services::bucket_service::BucketService,
};
use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/children`.
#[derive(Debug, Default, Deserialize)]
pub struct ChildrenRequest {
    pub dirname: Option<String>,
}

/// Response body: folders first, then files.
#[derive(Debug, Serialize)]
pub struct ChildrenResponse {
    pub list: Vec<ChildEntry>,
}

/// POST `/api/children` — list the direct children under a prefix.
///
/// A missing or unparsable body is treated as `{}` rather than rejected, so
/// the raw bytes are parsed leniently instead of going through the strict
/// `Json` extractor.
pub async fn list_children(
    State(service): State<BucketService>,
    body: Bytes,
) -> Result<Json<ChildrenResponse>, AppError> {
    let req: ChildrenRequest = serde_json::from_slice(&body).unwrap_or_default();
    let prefix = StorageKey::normalize(req.dirname.as_deref().unwrap_or(""));
    let list = service.list_children(&prefix).await?;
    Ok(Json(ChildrenResponse { list }))
}

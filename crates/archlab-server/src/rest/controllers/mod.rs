pub mod design;
pub mod projects;
pub mod templates;

pub use design::DesignController;
pub use projects::ProjectsController;

use std::sync::Arc;

use archlab_core::{ProjectStore, StoreError};
use axum::body::Bytes;
use axum::extract::FromRequestParts;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Path` that rejects malformed ids with a JSON `ApiError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Decode a JSON body; an empty body reads as `{}`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"{}" } else { body.as_ref() };
    serde_json::from_slice(bytes).map_err(|e| ApiError::invalid_body(e.to_string()))
}

/// Run a store operation off the async runtime.
pub(crate) async fn with_store<T, F>(store: &Arc<ProjectStore>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ProjectStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

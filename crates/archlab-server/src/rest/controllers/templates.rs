use archlab_core::templates::{self, Template};
use axum::Json;

use super::ApiPath;
use crate::error::ApiError;

pub async fn list_templates() -> Json<&'static [Template]> {
    Json(templates::templates())
}

pub async fn get_template(
    ApiPath(id): ApiPath<String>,
) -> Result<Json<&'static Template>, ApiError> {
    templates::template_by_id(&id).map(Json).ok_or(ApiError::NotFound("Template not found"))
}

use std::sync::Arc;

use archlab_core::{document, input, Constraints, Design, Diagrams, ProjectStore, ProjectVersion};
use archlab_design::DesignPipeline;
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{parse_body, with_store, ApiPath};
use crate::error::ApiError;

#[derive(Clone)]
pub struct DesignController {
    store: Arc<ProjectStore>,
    pipeline: DesignPipeline,
}

impl DesignController {
    pub fn new(store: Arc<ProjectStore>, pipeline: DesignPipeline) -> Self {
        Self { store, pipeline }
    }

    async fn version(&self, project_id: Uuid, version_id: Uuid) -> Result<ProjectVersion, ApiError> {
        with_store(&self.store, move |store| store.get_version(project_id, version_id)).await
    }

    /// Save over `read`, failing with a conflict if the version moved on meanwhile.
    async fn save(
        &self,
        read: &ProjectVersion,
        design: Design,
        refinement: Option<String>,
    ) -> Result<ProjectVersion, ApiError> {
        let (project_id, version_id, seen) = (read.project_id, read.id, read.updated_at);
        with_store(&self.store, move |store| {
            store.save_design(project_id, version_id, seen, &design, refinement.as_deref())
        })
        .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub constraints: Option<Constraints>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    pub refinement_request: String,
    #[serde(default)]
    pub constraints: Option<Constraints>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignResponse {
    pub version_id: Uuid,
    pub version_number: u32,
    pub created_at: DateTime<Utc>,
    pub design: Design,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramsResponse {
    pub version_id: Uuid,
    pub version_number: u32,
    pub diagrams: Diagrams,
}

fn validate_constraints(constraints: &Constraints) -> Result<(), ApiError> {
    input::check_constraints(constraints).map_err(|problems| ApiError::BadRequest {
        message: "Invalid constraints".to_string(),
        details: Some(Value::from(problems)),
    })
}

fn generated(version: &ProjectVersion) -> Result<&Design, ApiError> {
    version.design_json.as_ref().ok_or(ApiError::NotFound("Design not generated yet"))
}

pub async fn generate(
    State(controller): State<DesignController>,
    ApiPath((project_id, version_id)): ApiPath<(Uuid, Uuid)>,
    body: Bytes,
) -> Result<Json<ProjectVersion>, ApiError> {
    let req: GenerateRequest = parse_body(&body)?;
    let constraints = req.constraints.unwrap_or_default();
    validate_constraints(&constraints)?;

    let version = controller.version(project_id, version_id).await?;
    tracing::info!(
        project_id = %project_id,
        version = version.version_number,
        model = controller.pipeline.model_name(),
        "generating design"
    );
    let design = controller.pipeline.generate(&version.requirements_text, &constraints).await?;
    let updated = controller.save(&version, design, None).await?;
    Ok(Json(updated))
}

pub async fn refine(
    State(controller): State<DesignController>,
    ApiPath((project_id, version_id)): ApiPath<(Uuid, Uuid)>,
    body: Bytes,
) -> Result<Json<ProjectVersion>, ApiError> {
    let req: RefineRequest = parse_body(&body)?;
    input::check_refinement(&req.refinement_request).map_err(ApiError::invalid_body)?;
    let request = req.refinement_request.trim().to_string();
    let constraints = req.constraints.unwrap_or_default();
    validate_constraints(&constraints)?;

    let version = controller.version(project_id, version_id).await?;
    let existing = version
        .design_json
        .as_ref()
        .ok_or(ApiError::Conflict("Design not generated yet"))?;
    tracing::info!(
        project_id = %project_id,
        version = version.version_number,
        refinements = version.refinements.len(),
        "refining design"
    );
    let refined = controller.pipeline.refine(existing, &request, &constraints).await?;
    let updated = controller.save(&version, refined, Some(request)).await?;
    Ok(Json(updated))
}

pub async fn get_design(
    State(controller): State<DesignController>,
    ApiPath((project_id, version_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<DesignResponse>, ApiError> {
    let version = controller.version(project_id, version_id).await?;
    let design = generated(&version)?.clone();
    Ok(Json(DesignResponse {
        version_id: version.id,
        version_number: version.version_number,
        created_at: version.created_at,
        design,
    }))
}

pub async fn get_diagrams(
    State(controller): State<DesignController>,
    ApiPath((project_id, version_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<DiagramsResponse>, ApiError> {
    let version = controller.version(project_id, version_id).await?;
    let diagrams = generated(&version)?.diagrams.clone();
    Ok(Json(DiagramsResponse {
        version_id: version.id,
        version_number: version.version_number,
        diagrams,
    }))
}

pub async fn get_document(
    State(controller): State<DesignController>,
    ApiPath((project_id, version_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let project = with_store(&controller.store, move |store| store.get_project(project_id)).await?;
    let version = project
        .versions
        .iter()
        .find(|v| v.id == version_id)
        .ok_or(ApiError::NotFound("Version not found"))?;
    let markdown = document::render_markdown(generated(version)?, &project.name);
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], markdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constraint_problems_become_details() {
        let constraints: Constraints =
            serde_json::from_value(json!({"teamSize": 0, "cloud": "GCP"})).unwrap();
        let err = validate_constraints(&constraints).unwrap_err();
        let ApiError::BadRequest { message, details: Some(details) } = err else {
            panic!("expected details");
        };
        assert_eq!(message, "Invalid constraints");
        assert_eq!(details, json!(["teamSize: must be a positive integer"]));
    }
}

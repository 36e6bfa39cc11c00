use std::sync::Arc;

use archlab_core::{input, Project, ProjectStore, ProjectSummary, ProjectVersion};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_body, with_store, ApiPath};
use crate::error::ApiError;

#[derive(Clone)]
pub struct ProjectsController {
    store: Arc<ProjectStore>,
}

impl ProjectsController {
    pub fn new(store: Arc<ProjectStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        input::check_project_name(&self.name).map_err(ApiError::invalid_body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub requirements_text: String,
}

impl CreateVersionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        input::check_requirements(&self.requirements_text).map_err(ApiError::invalid_body)
    }
}

pub async fn create_project(
    State(controller): State<ProjectsController>,
    body: Bytes,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let req: CreateProjectRequest = parse_body(&body)?;
    req.validate()?;
    let project = with_store(&controller.store, move |store| {
        store.create_project(req.name.trim(), req.description.as_deref())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(controller): State<ProjectsController>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let projects = with_store(&controller.store, |store| store.list_projects()).await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(controller): State<ProjectsController>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = with_store(&controller.store, move |store| store.get_project(project_id)).await?;
    Ok(Json(project))
}

pub async fn create_version(
    State(controller): State<ProjectsController>,
    ApiPath(project_id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<ProjectVersion>), ApiError> {
    let req: CreateVersionRequest = parse_body(&body)?;
    req.validate()?;
    let version = with_store(&controller.store, move |store| {
        store.create_version(project_id, &req.requirements_text)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

pub async fn list_versions(
    State(controller): State<ProjectsController>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<Vec<ProjectVersion>>, ApiError> {
    let versions =
        with_store(&controller.store, move |store| store.list_versions(project_id)).await?;
    Ok(Json(versions))
}

pub async fn get_version(
    State(controller): State<ProjectsController>,
    ApiPath((project_id, version_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ProjectVersion>, ApiError> {
    let version = with_store(&controller.store, move |store| {
        store.get_version(project_id, version_id)
    })
    .await?;
    Ok(Json(version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_checks_report_invalid_body() {
        let req = CreateProjectRequest { name: " a ".into(), description: None };
        let Err(ApiError::BadRequest { message, details }) = req.validate() else {
            panic!("short name accepted");
        };
        assert_eq!(message, "Invalid body");
        assert_eq!(details, Some("name: must be at least 2 characters".into()));

        let req = CreateVersionRequest { requirements_text: "a todo app".into() };
        assert!(req.validate().is_ok());
    }
}

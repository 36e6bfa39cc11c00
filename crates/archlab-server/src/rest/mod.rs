pub mod controllers;

pub use controllers::{DesignController, ProjectsController};

use std::sync::Arc;

use archlab_core::ProjectStore;
use archlab_design::DesignPipeline;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::ServerConfig;

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Build the HTTP API over a project store and a design pipeline.
pub fn create_app(config: &ServerConfig, store: Arc<ProjectStore>, pipeline: DesignPipeline) -> Router {
    let projects = ProjectsController::new(Arc::clone(&store));
    let design = DesignController::new(store, pipeline);

    let version_path = "/projects/{project_id}/versions/{version_id}";

    Router::new()
        .route("/health", get(health_check))
        .route("/templates", get(controllers::templates::list_templates))
        .route("/templates/{id}", get(controllers::templates::get_template))
        .route(
            "/projects",
            get(controllers::projects::list_projects).post(controllers::projects::create_project),
        )
        .route("/projects/{project_id}", get(controllers::projects::get_project))
        .route(
            "/projects/{project_id}/versions",
            get(controllers::projects::list_versions).post(controllers::projects::create_version),
        )
        .route(version_path, get(controllers::projects::get_version))
        .with_state(projects)
        .route(&format!("{version_path}/generate"), post(controllers::design::generate))
        .route(&format!("{version_path}/refine"), post(controllers::design::refine))
        .route(&format!("{version_path}/design"), get(controllers::design::get_design))
        .route(&format!("{version_path}/diagrams"), get(controllers::design::get_diagrams))
        .route(&format!("{version_path}/document"), get(controllers::design::get_document))
        .with_state(design)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

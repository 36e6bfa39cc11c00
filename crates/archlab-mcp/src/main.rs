use std::fmt::Display;
use std::sync::Arc;

use archlab_core::{
    input, templates, Constraints, Design, ProjectStore, ProjectVersion, StoreError,
};
use archlab_design::DesignPipeline;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CreateProjectRequest {
    /// Project name (at least 2 characters)
    name: String,
    /// Optional short description
    description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ProjectRequest {
    /// Project ID (UUID)
    project_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CreateVersionRequest {
    /// Project ID (UUID)
    project_id: String,
    /// Free-text product requirements (at least 10 characters)
    requirements_text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct VersionRequest {
    /// Project ID (UUID)
    project_id: String,
    /// Version ID (UUID)
    version_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GenerateDesignRequest {
    /// Project ID (UUID)
    project_id: String,
    /// Version ID (UUID)
    version_id: String,
    /// Optional constraints, e.g. {"teamSize": 4, "budget": "low", "cloud": "AWS"}
    constraints: Option<Constraints>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct RefineDesignRequest {
    /// Project ID (UUID)
    project_id: String,
    /// Version ID (UUID)
    version_id: String,
    /// What to change in the current design
    refinement_request: String,
    /// Optional constraints, same shape as for generate_design
    constraints: Option<Constraints>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct TemplateRequest {
    /// Template ID as returned by list_templates
    id: String,
}

// --- Server ---

#[derive(Clone)]
pub struct ArchLabServer {
    store: Arc<ProjectStore>,
    pipeline: DesignPipeline,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ArchLabServer {
    pub fn new(store: Arc<ProjectStore>, pipeline: DesignPipeline) -> Self {
        Self {
            store,
            pipeline,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all projects, newest first, with their version numbers")]
    async fn list_projects(&self) -> Result<CallToolResult, McpError> {
        match self.with_store(|store| store.list_projects()).await {
            Ok(projects) if projects.is_empty() => Ok(CallToolResult::success(vec![Content::text(
                "No projects found. Use create_project to start one.",
            )])),
            Ok(projects) => Ok(json_result(&projects)),
            Err(e) => Ok(failure(e)),
        }
    }

    #[tool(description = "Create a new project. Returns the project with its ID.")]
    async fn create_project(
        &self,
        Parameters(req): Parameters<CreateProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        if let Err(e) = input::check_project_name(&req.name) {
            return Ok(failure(e));
        }
        let created = self
            .with_store(move |store| store.create_project(req.name.trim(), req.description.as_deref()))
            .await;
        match created {
            Ok(project) => Ok(json_result(&project)),
            Err(e) => Ok(failure(e)),
        }
    }

    #[tool(description = "Get a project and all its versions (newest first), including generated designs")]
    async fn get_project(
        &self,
        Parameters(req): Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let project_id = match parse_id("project_id", &req.project_id) {
            Ok(id) => id,
            Err(e) => return Ok(e),
        };
        match self.with_store(move |store| store.get_project(project_id)).await {
            Ok(project) => Ok(json_result(&project)),
            Err(e) => Ok(failure(e)),
        }
    }

    #[tool(
        description = "Add a requirements version to a project. Version numbers increase by one per project. Call generate_design next."
    )]
    async fn create_version(
        &self,
        Parameters(req): Parameters<CreateVersionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let project_id = match parse_id("project_id", &req.project_id) {
            Ok(id) => id,
            Err(e) => return Ok(e),
        };
        if let Err(e) = input::check_requirements(&req.requirements_text) {
            return Ok(failure(e));
        }
        let created = self
            .with_store(move |store| store.create_version(project_id, &req.requirements_text))
            .await;
        match created {
            Ok(version) => Ok(json_result(&version)),
            Err(e) => Ok(failure(e)),
        }
    }

    #[tool(
        description = "Generate an architecture design for a version's requirements using the configured LLM. Replaces any existing design on that version. Returns the updated version."
    )]
    async fn generate_design(
        &self,
        Parameters(req): Parameters<GenerateDesignRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (project_id, version_id) = match parse_ids(&req.project_id, &req.version_id) {
            Ok(ids) => ids,
            Err(e) => return Ok(e),
        };
        let constraints = req.constraints.unwrap_or_default();
        if let Err(problems) = input::check_constraints(&constraints) {
            return Ok(failure(problems.join("; ")));
        }
        let version = match self.with_store(move |store| store.get_version(project_id, version_id)).await {
            Ok(v) => v,
            Err(e) => return Ok(failure(e)),
        };

        tracing::info!(%project_id, version = version.version_number, "generate_design");
        match self.pipeline.generate(&version.requirements_text, &constraints).await {
            Ok(design) => Ok(self.save(&version, design, None).await),
            Err(e) => Ok(failure(format!("Design generation failed: {e}"))),
        }
    }

    #[tool(
        description = "Refine the existing design of a version with a natural-language change request. The version must already have a design. Returns the updated version."
    )]
    async fn refine_design(
        &self,
        Parameters(req): Parameters<RefineDesignRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (project_id, version_id) = match parse_ids(&req.project_id, &req.version_id) {
            Ok(ids) => ids,
            Err(e) => return Ok(e),
        };
        if let Err(e) = input::check_refinement(&req.refinement_request) {
            return Ok(failure(e));
        }
        let constraints = req.constraints.unwrap_or_default();
        if let Err(problems) = input::check_constraints(&constraints) {
            return Ok(failure(problems.join("; ")));
        }
        let version = match self.with_store(move |store| store.get_version(project_id, version_id)).await {
            Ok(v) => v,
            Err(e) => return Ok(failure(e)),
        };
        let Some(existing) = version.design_json.as_ref() else {
            return Ok(failure("Design not generated yet. Call generate_design first."));
        };

        let request = req.refinement_request.trim();
        tracing::info!(%project_id, version = version.version_number, "refine_design");
        match self.pipeline.refine(existing, request, &constraints).await {
            Ok(design) => Ok(self.save(&version, design, Some(request.to_string())).await),
            Err(e) => Ok(failure(format!("Design refinement failed: {e}"))),
        }
    }

    #[tool(description = "Get the generated design JSON of a version")]
    async fn get_design(
        &self,
        Parameters(req): Parameters<VersionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .with_design(&req, |_, version| version.design_json.as_ref().map(json_result))
            .await)
    }

    #[tool(
        description = "Get the four diagrams (c4Context, c4Container, erd, sequence) of a version's design as {nodes, edges} graphs"
    )]
    async fn get_diagrams(
        &self,
        Parameters(req): Parameters<VersionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .with_design(&req, |_, version| version.design_json.as_ref().map(|d| json_result(&d.diagrams)))
            .await)
    }

    #[tool(description = "Render a version's design as a Markdown architecture document")]
    async fn get_document(
        &self,
        Parameters(req): Parameters<VersionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .with_design(&req, |project_name, version| {
                version.design_json.as_ref().map(|d| {
                    CallToolResult::success(vec![Content::text(
                        archlab_core::document::render_markdown(d, project_name),
                    )])
                })
            })
            .await)
    }

    #[tool(description = "List the built-in architecture templates (requirements and constraints to start from)")]
    fn list_templates(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&templates::templates()))
    }

    #[tool(description = "Get one architecture template by ID")]
    fn get_template(
        &self,
        Parameters(req): Parameters<TemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        match templates::template_by_id(&req.id) {
            Some(template) => Ok(json_result(template)),
            None => Ok(failure(format!("Template '{}' not found", req.id))),
        }
    }

    #[tool(description = "Get the design rules the generator follows")]
    fn get_rules(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            archlab_core::rules::RULES,
        )]))
    }
}

impl ArchLabServer {
    /// Run a store call on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&ProjectStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    /// Persist a produced design over the version it was produced from.
    async fn save(
        &self,
        read: &ProjectVersion,
        design: Design,
        refinement: Option<String>,
    ) -> CallToolResult {
        let (project_id, version_id, seen) = (read.project_id, read.id, read.updated_at);
        let result = self
            .with_store(move |store| {
                store.save_design(project_id, version_id, seen, &design, refinement.as_deref())
            })
            .await;
        match result {
            Ok(version) => json_result(&version),
            Err(e @ StoreError::Stale(_)) => {
                failure(format!("{e}. Read the version again and retry."))
            }
            Err(e) => failure(format!("Design was produced but could not be saved: {e}")),
        }
    }

    /// Look up a version (with its project name) and render it, or explain what is missing.
    async fn with_design(
        &self,
        req: &VersionRequest,
        render: impl FnOnce(&str, &ProjectVersion) -> Option<CallToolResult>,
    ) -> CallToolResult {
        let (project_id, version_id) = match parse_ids(&req.project_id, &req.version_id) {
            Ok(ids) => ids,
            Err(e) => return e,
        };
        let project = match self.with_store(move |store| store.get_project(project_id)).await {
            Ok(p) => p,
            Err(e) => return failure(e),
        };
        let Some(version) = project.versions.iter().find(|v| v.id == version_id) else {
            return failure("Version not found");
        };
        render(&project.name, version)
            .unwrap_or_else(|| failure("Design not generated yet. Call generate_design first."))
    }
}

#[tool_handler]
impl ServerHandler for ArchLabServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!(
            "{}\n\n## Design Rules\n{}",
            INSTRUCTIONS,
            archlab_core::rules::RULES
        );
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn failure(message: impl Display) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.to_string())])
}

fn json_result<T: Serialize + ?Sized>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => failure(format!("Serialization error: {e}")),
    }
}

fn parse_id(field: &str, raw: &str) -> Result<Uuid, CallToolResult> {
    raw.trim()
        .parse()
        .map_err(|_| failure(format!("Invalid {field} '{raw}': expected a UUID")))
}

fn parse_ids(project_id: &str, version_id: &str) -> Result<(Uuid, Uuid), CallToolResult> {
    Ok((parse_id("project_id", project_id)?, parse_id("version_id", version_id)?))
}

const INSTRUCTIONS: &str = r#"ArchLab turns product requirements into a structured software architecture design: requirements breakdown, architecture pattern with rationale and risks, tech stack, components, data model, API endpoints and four diagrams (C4 context, C4 container, ERD, sequence).

## Workflow
1. `create_project` (or pick one from `list_projects`).
2. `create_version` with the requirements text. `list_templates` / `get_template` give ready-made requirements and constraints.
3. `generate_design` for that version. This calls the configured LLM and can take a while.
4. Read the result with `get_design`, `get_diagrams` or `get_document`.
5. Use `refine_design` with a change request to evolve the design. Each refinement replaces the version's design and is recorded in its `refinements` list. Create a new version instead when the requirements themselves change.

Generation fails rather than returning a partial design: if the model output cannot be parsed or does not match the design schema, the error lists what was wrong and nothing is saved."#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .init();

    let settings = archlab_core::read_settings();
    if !archlab_core::ai_configured(&settings) {
        tracing::warn!(provider = %settings.provider, "no API key configured; generate_design will fail");
    }
    let pipeline = archlab_design::pipeline_from_settings(&settings)?;
    let store = Arc::new(ProjectStore::open_default()?);
    tracing::info!(model = pipeline.model_name(), data = %store.dir().display(), "archlab-mcp ready");

    let service = ArchLabServer::new(store, pipeline)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {e}"))?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlab_design::{DesignModel, EngineError, Prompt};
    use async_trait::async_trait;
    use rmcp::model::RawContent;

    const TODO_REPLY: &str = include_str!("../../archlab-design/tests/fixtures/todo_reply.txt");

    /// Always gives the same reply; `None` simulates a rate-limited provider.
    struct FixedModel(Option<String>);

    #[async_trait]
    impl DesignModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &Prompt) -> Result<String, EngineError> {
            self.0.clone().ok_or_else(|| EngineError::RateLimited("429".into()))
        }
    }

    fn server(reply: Option<String>) -> (ArchLabServer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ProjectStore::open(dir.path()).unwrap());
        let pipeline = DesignPipeline::new(Arc::new(FixedModel(reply)));
        (ArchLabServer::new(store, pipeline), dir)
    }

    fn text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(t) => t.text.clone(),
            other => panic!("expected text content, got: {other:?}"),
        }
    }

    fn seed(server: &ArchLabServer) -> (String, String) {
        let project = server.store.create_project("Todo", None).unwrap();
        let version = server
            .store
            .create_version(project.id, "Todo app with React frontend and Node backend")
            .unwrap();
        (project.id.to_string(), version.id.to_string())
    }

    #[tokio::test]
    async fn generate_then_read_document() {
        let (server, _dir) = server(Some(TODO_REPLY.to_string()));
        let (project_id, version_id) = seed(&server);

        let result = server
            .generate_design(Parameters(GenerateDesignRequest {
                project_id: project_id.clone(),
                version_id: version_id.clone(),
                constraints: None,
            }))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true), "{}", text(&result));

        let doc = server
            .get_document(Parameters(VersionRequest { project_id, version_id }))
            .await
            .unwrap();
        assert!(text(&doc).starts_with("# Todo"));
    }

    #[tokio::test]
    async fn refine_without_design_is_a_tool_error() {
        let (server, _dir) = server(Some(TODO_REPLY.to_string()));
        let (project_id, version_id) = seed(&server);
        let result = server
            .refine_design(Parameters(RefineDesignRequest {
                project_id,
                version_id,
                refinement_request: "Add caching".into(),
                constraints: None,
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).contains("generate_design"));
    }

    #[tokio::test]
    async fn model_failure_leaves_version_untouched() {
        let (server, _dir) = server(None);
        let (project_id, version_id) = seed(&server);
        let result = server
            .generate_design(Parameters(GenerateDesignRequest {
                project_id: project_id.clone(),
                version_id: version_id.clone(),
                constraints: None,
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).contains("rate limit"));

        let design = server
            .get_design(Parameters(VersionRequest { project_id, version_id }))
            .await
            .unwrap();
        assert!(text(&design).contains("Design not generated yet"));
    }

    #[tokio::test]
    async fn rejects_bad_ids_and_short_names() {
        let (server, _dir) = server(Some(String::new()));
        let result = server
            .get_project(Parameters(ProjectRequest { project_id: "nope".into() }))
            .await
            .unwrap();
        assert!(text(&result).contains("expected a UUID"));

        let result = server
            .create_project(Parameters(CreateProjectRequest { name: "x".into(), description: None }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn design_saved_over_a_newer_write_is_rejected() {
        let (server, _dir) = server(Some(TODO_REPLY.to_string()));
        let (project_id, version_id) = seed(&server);
        let before = server
            .store
            .get_version(project_id.parse().unwrap(), version_id.parse().unwrap())
            .unwrap();

        let result = server
            .generate_design(Parameters(GenerateDesignRequest {
                project_id: project_id.clone(),
                version_id: version_id.clone(),
                constraints: None,
            }))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true), "{}", text(&result));

        let mut late = archlab_design::decode(TODO_REPLY).unwrap();
        late.tech_stack.infrastructure = vec!["LateInfra".into()];
        let result = server.save(&before, late, Some("LATE-CHANGE".into())).await;
        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).contains("Version changed"));

        let stored = server.store.get_version(before.project_id, before.id).unwrap();
        assert!(stored.refinements.is_empty());
        assert_ne!(stored.design_json.unwrap().tech_stack.infrastructure, vec!["LateInfra"]);
    }

    #[test]
    fn unknown_template_is_reported() {
        let (server, _dir) = server(Some(String::new()));
        let result = server
            .get_template(Parameters(TemplateRequest { id: "nope".into() }))
            .unwrap();
        assert!(text(&result).contains("not found"));
    }
}

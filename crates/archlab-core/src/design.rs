use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Free-form generation constraints (budget, teamSize, cloud, ...), rendered in key order.
pub type Constraints = BTreeMap<String, serde_json::Value>;

/// Keys of the four diagrams every design carries, in render order.
pub const DIAGRAM_KEYS: [&str; 4] = ["c4Context", "c4Container", "erd", "sequence"];

// --- Design ---

/// A validated architecture design. Only produced by the generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub requirements: Requirements,
    pub architecture: Architecture,
    pub tech_stack: TechStack,
    pub components: Vec<Component>,
    pub data_model: Vec<Entity>,
    pub api: Vec<Endpoint>,
    pub diagrams: Diagrams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Requirements {
    pub actors: Vec<String>,
    pub functional: Vec<String>,
    /// Non-functional requirements
    pub nfr: Vec<String>,
    pub assumptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Architecture {
    /// Name of the architecture pattern, e.g. "Modular Monolith"
    pub pattern: String,
    pub rationale: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TechStack {
    pub frontend: Frontend,
    pub backend: Backend,
    pub database: Database,
    /// Free-text infrastructure pieces, e.g. "Docker", "Kubernetes"
    pub infrastructure: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Frontend {
    React,
    #[serde(rename = "Next.js")]
    NextJs,
    Vue,
    Angular,
    Svelte,
    #[default]
    None,
}

impl Frontend {
    pub const LABELS: &'static [&'static str] =
        &["React", "Next.js", "Vue", "Angular", "Svelte", "None"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Backend {
    #[serde(rename = "Node.js")]
    NodeJs,
    Express,
    #[serde(rename = "NestJS")]
    NestJs,
    Django,
    #[serde(rename = "FastAPI")]
    FastApi,
    #[serde(rename = "Spring Boot")]
    SpringBoot,
    Go,
    Rust,
    #[default]
    None,
}

impl Backend {
    pub const LABELS: &'static [&'static str] = &[
        "Node.js",
        "Express",
        "NestJS",
        "Django",
        "FastAPI",
        "Spring Boot",
        "Go",
        "Rust",
        "None",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Database {
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    #[serde(rename = "MySQL")]
    MySql,
    #[serde(rename = "MongoDB")]
    MongoDb,
    Redis,
    #[serde(rename = "SQLite")]
    Sqlite,
    #[serde(rename = "DynamoDB")]
    DynamoDb,
    #[default]
    None,
}

impl Database {
    pub const LABELS: &'static [&'static str] =
        &["PostgreSQL", "MySQL", "MongoDB", "Redis", "SQLite", "DynamoDB", "None"];
}

/// Serialized label of a tech-stack choice, e.g. "Next.js".
pub fn label_of<T: Serialize>(choice: &T) -> String {
    match serde_json::to_value(choice) {
        Ok(serde_json::Value::String(s)) => s,
        _ => "None".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Component {
    pub name: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub entity: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Endpoint {
    /// HTTP method, e.g. "GET"
    pub method: String,
    pub path: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagrams {
    pub c4_context: Diagram,
    pub c4_container: Diagram,
    pub erd: Diagram,
    pub sequence: Diagram,
}

impl Diagrams {
    /// The four diagrams paired with their keys, in `DIAGRAM_KEYS` order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Diagram)> {
        DIAGRAM_KEYS
            .into_iter()
            .zip([&self.c4_context, &self.c4_container, &self.erd, &self.sequence])
    }
}

/// A diagram as a node/edge graph. Layout is left to the renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

/// A diagram node. Matches ReactFlow's node shape minus position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    /// Renderer hint; "table" draws an entity with its `details` as rows
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    #[schemars(with = "Option<Vec<String>>")]
    pub details: Vec<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

pub mod design;
pub mod document;
pub mod input;
pub mod rules;
pub mod settings;
pub mod store;
pub mod templates;

use std::path::PathBuf;

pub use design::{
    Architecture, Backend, Component, Constraints, Database, Design, Diagram, DiagramEdge,
    DiagramNode, Diagrams, Endpoint, Entity, Field, Frontend, Requirements, TechStack,
    DIAGRAM_KEYS,
};
pub use settings::{ai_configured, read_settings, AiSettings};
pub use store::{Project, ProjectStore, ProjectSummary, ProjectVersion, StoreError, VersionRef};

/// Resolve the data directory: `$ARCHLAB_HOME`, else `~/.archlab/`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("ARCHLAB_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".archlab")
}

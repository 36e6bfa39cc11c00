use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::design::Design;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Project not found")]
    ProjectNotFound(Uuid),

    #[error("Version not found")]
    VersionNotFound(Uuid),

    /// The version was written by someone else after the caller read it.
    #[error("Version changed while the design was being produced")]
    Stale(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// --- Records ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stored oldest first; views returned by the store list newest first.
    #[serde(default)]
    pub versions: Vec<ProjectVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    pub id: Uuid,
    pub project_id: Uuid,
    pub version_number: u32,
    pub requirements_text: String,
    pub design_json: Option<Design>,
    /// Change requests applied to this version's design, oldest first
    #[serde(default)]
    pub refinements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project list entry with lightweight version references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub versions: Vec<VersionRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRef {
    pub id: Uuid,
    pub version_number: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            versions: project
                .versions
                .iter()
                .map(|v| VersionRef {
                    id: v.id,
                    version_number: v.version_number,
                    created_at: v.created_at,
                })
                .collect(),
        }
    }
}

impl Project {
    fn newest_first(mut self) -> Self {
        self.versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        self
    }
}

// --- Storage ---

/// One JSON file per project under `<root>/projects/`, versions embedded.
///
/// Writes go through a temp file + rename. Read-modify-write cycles hold
/// `write_lock` so concurrent requests cannot drop each other's versions.
pub struct ProjectStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ProjectStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join("projects");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    /// Open the store in the configured data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn project_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, id: Uuid) -> Result<Project> {
        let path = self.project_path(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::ProjectNotFound(id))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, project: &Project) -> Result<()> {
        let json = serde_json::to_string_pretty(project)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", project.id));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.project_path(project.id))?;
        Ok(())
    }

    fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut Project) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut project = self.read(id)?;
        let out = f(&mut project)?;
        project.updated_at = Utc::now();
        self.write(&project)?;
        Ok(out)
    }

    pub fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
            versions: vec![],
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write(&project)?;
        tracing::info!(project_id = %project.id, "created project");
        Ok(project)
    }

    /// List all projects, newest first. Unreadable files are skipped.
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let mut projects: Vec<Project> = fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                let raw = fs::read_to_string(&path).ok()?;
                match serde_json::from_str::<Project>(&raw) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable project");
                        None
                    }
                }
            })
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects.iter().map(ProjectSummary::from).collect())
    }

    /// Read a project with its versions newest first.
    pub fn get_project(&self, id: Uuid) -> Result<Project> {
        self.read(id).map(Project::newest_first)
    }

    /// Append a version numbered one past the project's latest.
    pub fn create_version(&self, project_id: Uuid, requirements_text: &str) -> Result<ProjectVersion> {
        let version = self.update(project_id, |project| {
            let last = project.versions.iter().map(|v| v.version_number).max().unwrap_or(0);
            let now = Utc::now();
            let version = ProjectVersion {
                id: Uuid::new_v4(),
                project_id,
                version_number: last + 1,
                requirements_text: requirements_text.to_string(),
                design_json: None,
                refinements: vec![],
                created_at: now,
                updated_at: now,
            };
            project.versions.push(version.clone());
            Ok(version)
        })?;
        tracing::info!(%project_id, version = version.version_number, "created version");
        Ok(version)
    }

    pub fn list_versions(&self, project_id: Uuid) -> Result<Vec<ProjectVersion>> {
        Ok(self.get_project(project_id)?.versions)
    }

    pub fn get_version(&self, project_id: Uuid, version_id: Uuid) -> Result<ProjectVersion> {
        self.read(project_id)?
            .versions
            .into_iter()
            .find(|v| v.id == version_id)
            .ok_or(StoreError::VersionNotFound(version_id))
    }

    /// Replace a version's design. `refinement` records the change request that produced it.
    ///
    /// `seen` is the version's `updated_at` when the caller read it. If the version has been
    /// written since, nothing is saved and `StoreError::Stale` is returned.
    pub fn save_design(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        seen: DateTime<Utc>,
        design: &Design,
        refinement: Option<&str>,
    ) -> Result<ProjectVersion> {
        self.update(project_id, |project| {
            let version = project
                .versions
                .iter_mut()
                .find(|v| v.id == version_id)
                .ok_or(StoreError::VersionNotFound(version_id))?;
            if version.updated_at != seen {
                return Err(StoreError::Stale(version_id));
            }
            version.design_json = Some(design.clone());
            if let Some(request) = refinement {
                version.refinements.push(request.to_string());
            }
            version.updated_at = Utc::now();
            Ok(version.clone())
        })
    }
}

pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod repair;
pub mod validate;

use std::sync::Arc;

pub use engine::{DesignModel, EngineError, LlmEngine};
pub use pipeline::{decode, DesignPipeline, PipelineError};
pub use prompt::Prompt;
pub use repair::Candidate;
pub use validate::FieldError;

/// Build a pipeline backed by the configured LLM provider.
pub fn pipeline_from_settings(
    settings: &archlab_core::AiSettings,
) -> Result<DesignPipeline, EngineError> {
    let engine = LlmEngine::new(settings.clone())?;
    Ok(DesignPipeline::new(Arc::new(engine)))
}

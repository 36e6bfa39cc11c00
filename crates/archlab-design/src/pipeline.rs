use std::sync::Arc;

use archlab_core::{Constraints, Design};

use crate::engine::{DesignModel, EngineError};
use crate::extract::extract_payload;
use crate::prompt::{self, Prompt};
use crate::repair::{self, Candidate};
use crate::validate::{self, FieldError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The model call itself failed. Passed through untouched.
    #[error(transparent)]
    Model(#[from] EngineError),

    /// Extracted text is not JSON. Raw and extracted text kept for debugging.
    #[error("model returned invalid JSON: {message}")]
    Malformed {
        message: String,
        raw: String,
        extracted: String,
    },

    #[error("model output failed schema validation: {}", summarize(.0))]
    Schema(Vec<FieldError>),

    #[error("failed to encode design for refinement: {0}")]
    Encode(#[from] serde_json::Error),
}

fn summarize(errors: &[FieldError]) -> String {
    const SHOWN: usize = 3;
    let mut out = errors
        .iter()
        .take(SHOWN)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    if errors.len() > SHOWN {
        out.push_str(&format!(" (+{} more)", errors.len() - SHOWN));
    }
    out
}

/// Turn raw model output into a `Design`: extract, parse, repair, validate.
pub fn decode(raw: &str) -> Result<Design, PipelineError> {
    let extracted = extract_payload(raw);
    let candidate = Candidate::parse(extracted).map_err(|e| PipelineError::Malformed {
        message: e.to_string(),
        raw: raw.to_string(),
        extracted: extracted.to_string(),
    })?;
    validate::validate(repair::normalize(candidate)).map_err(PipelineError::Schema)
}

/// Requirements (or an existing design plus a change request) in, validated design out.
///
/// One model call per operation: no retry, no streaming, no fallback design.
#[derive(Clone)]
pub struct DesignPipeline {
    model: Arc<dyn DesignModel>,
}

impl DesignPipeline {
    pub fn new(model: Arc<dyn DesignModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn generate(
        &self,
        requirements: &str,
        constraints: &Constraints,
    ) -> Result<Design, PipelineError> {
        self.run(prompt::generate_prompt(requirements, constraints), "generate").await
    }

    /// Produce a new design from `existing` and a change request. `existing` is never modified.
    pub async fn refine(
        &self,
        existing: &Design,
        request: &str,
        constraints: &Constraints,
    ) -> Result<Design, PipelineError> {
        let prompt = prompt::refine_prompt(existing, request, constraints)?;
        self.run(prompt, "refine").await
    }

    async fn run(&self, prompt: Prompt, operation: &'static str) -> Result<Design, PipelineError> {
        let raw = self.model.complete(&prompt).await.inspect_err(|e| {
            tracing::warn!(operation, model = self.model.name(), error = %e, "model call failed");
        })?;
        tracing::debug!(operation, raw = %raw, "raw model output");

        match decode(&raw) {
            Ok(design) => {
                tracing::info!(
                    operation,
                    pattern = %design.architecture.pattern,
                    components = design.components.len(),
                    "design accepted"
                );
                Ok(design)
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "design rejected");
                Err(e)
            }
        }
    }
}

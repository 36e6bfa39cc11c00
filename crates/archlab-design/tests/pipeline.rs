use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use archlab_core::{Backend, Constraints, Database, Design, Frontend, DIAGRAM_KEYS};
use archlab_design::validate::validate;
use archlab_design::{Candidate, DesignModel, DesignPipeline, EngineError, PipelineError, Prompt};
use async_trait::async_trait;

const TODO_REPLY: &str = include_str!("fixtures/todo_reply.txt");
const TODO_REQUIREMENTS: &str = "Todo app with React frontend and Node backend using MongoDB";

/// Replays canned replies in order and records every prompt it receives.
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, EngineError>>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    fn replying(replies: impl IntoIterator<Item = Result<String, EngineError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() })
    }

    fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DesignModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, EngineError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or(Err(EngineError::EmptyResponse))
    }
}

fn revalidate(design: &Design) {
    let value = serde_json::to_value(design).unwrap();
    validate(Candidate::new(value)).expect("design should validate on its own");
}

#[tokio::test]
async fn generates_todo_design_end_to_end() {
    let model = ScriptedModel::replying([Ok(TODO_REPLY.to_string())]);
    let pipeline = DesignPipeline::new(model.clone());

    let design = pipeline.generate(TODO_REQUIREMENTS, &Constraints::new()).await.unwrap();

    assert!(!design.architecture.pattern.is_empty());
    let diagrams = serde_json::to_value(&design.diagrams).unwrap();
    let mut keys: Vec<&str> = diagrams.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    let mut expected = DIAGRAM_KEYS.to_vec();
    expected.sort_unstable();
    assert_eq!(keys, expected);

    assert_eq!(design.tech_stack.frontend, Frontend::React);
    assert_eq!(design.tech_stack.backend, Backend::NodeJs);
    assert_eq!(design.tech_stack.database, Database::MongoDb);
    // object risk was stringified by the normalizer
    assert!(design.architecture.risks[0].starts_with("{\""));
    assert_eq!(design.diagrams.erd.nodes[0].node_type.as_deref(), Some("table"));

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user.contains(TODO_REQUIREMENTS));
}

#[tokio::test]
async fn refine_returns_new_design_and_keeps_input() {
    let original = {
        let model = ScriptedModel::replying([Ok(TODO_REPLY.to_string())]);
        DesignPipeline::new(model).generate(TODO_REQUIREMENTS, &Constraints::new()).await.unwrap()
    };
    let snapshot = original.clone();

    let mut refined_json = serde_json::to_value(&original).unwrap();
    refined_json["techStack"] = serde_json::json!(["Docker", "K8s"]);
    refined_json["architecture"]["rationale"] = serde_json::json!([{"why": "caching"}, "keeps API thin"]);
    refined_json["components"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({"name": "Cache", "responsibilities": ["Cache todo lists"]}));
    let reply = format!("Updated design:\n{refined_json}\nDone.");

    let model = ScriptedModel::replying([Ok(reply)]);
    let pipeline = DesignPipeline::new(model.clone());
    let mut constraints = Constraints::new();
    constraints.insert("cloud".into(), serde_json::json!("AWS"));

    let refined = pipeline
        .refine(&original, "Add a Redis cache in front of the API", &constraints)
        .await
        .unwrap();

    assert_eq!(original, snapshot);
    assert_ne!(refined, original);
    assert_eq!(refined.components.len(), 3);
    assert_eq!(refined.tech_stack.frontend, Frontend::None);
    assert_eq!(refined.tech_stack.infrastructure, vec!["Docker", "K8s"]);
    assert_eq!(refined.architecture.rationale[0], "{\"why\":\"caching\"}");
    revalidate(&refined);

    let prompt = &model.prompts()[0];
    assert!(prompt.user.contains("Add a Redis cache in front of the API"));
    assert!(prompt.user.contains("\"Todo API\""));
    assert!(prompt.user.contains("- cloud: AWS"));
}

#[tokio::test]
async fn rate_limit_is_propagated_unchanged() {
    let model = ScriptedModel::replying([Err(EngineError::RateLimited("429".into()))]);
    let pipeline = DesignPipeline::new(model.clone());

    let err = pipeline.generate(TODO_REQUIREMENTS, &Constraints::new()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Model(EngineError::RateLimited(_))));
    assert_eq!(model.prompts().len(), 1, "no retry");
}

#[tokio::test]
async fn prose_only_reply_is_malformed() {
    let model = ScriptedModel::replying([Ok("I'm sorry, I can't design that.".to_string())]);
    let err = DesignPipeline::new(model)
        .generate(TODO_REQUIREMENTS, &Constraints::new())
        .await
        .unwrap_err();
    match err {
        PipelineError::Malformed { raw, extracted, .. } => {
            assert_eq!(raw, "I'm sorry, I can't design that.");
            assert_eq!(extracted, raw);
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[tokio::test]
async fn schema_violation_is_not_repaired() {
    let mut value: serde_json::Value =
        serde_json::from_str(archlab_design::extract::extract_payload(TODO_REPLY)).unwrap();
    value.as_object_mut().unwrap().remove("diagrams");
    value["api"][0]["method"] = serde_json::json!(1);

    let model = ScriptedModel::replying([Ok(value.to_string())]);
    let err = DesignPipeline::new(model)
        .generate(TODO_REQUIREMENTS, &Constraints::new())
        .await
        .unwrap_err();
    let PipelineError::Schema(errors) = err else {
        panic!("expected Schema error");
    };
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["api[0].method", "diagrams"]);
}

use archlab_core::{Backend, Constraints, Database, Design, Frontend, DIAGRAM_KEYS};

/// A rendered model request: fixed instructions plus the per-call message.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// JSON Schema of `Design`, embedded in the output contract.
fn design_schema() -> String {
    let schema = schemars::schema_for!(Design);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

pub fn system_prompt() -> String {
    format!(
        "You are a senior software architect. Turn system requirements into a complete, \
concrete architecture design.\n\n\
## Output contract\n\
Output ONLY one JSON object, with no prose before or after it and no code fences. \
The object must match this JSON Schema exactly. Every array field must be present, \
use [] when there is nothing to list.\n\n{schema}\n\n\
Allowed values:\n\
- techStack.frontend: {frontend}\n\
- techStack.backend: {backend}\n\
- techStack.database: {database}\n\
- techStack.infrastructure: free-text strings (e.g. \"Docker\", \"Kubernetes\", \"AWS S3\")\n\
- architecture.rationale and architecture.risks: plain strings, never objects\n\
- diagrams: exactly the keys {keys}, each {{\"nodes\": [{{\"id\", \"label\", \"type\"?, \
\"details\"?}}], \"edges\": [{{\"id\", \"source\", \"target\", \"label\"?}}]}}\n\n\
## Design rules\n{rules}\n\n\
Output ONLY the JSON object, nothing else.",
        schema = design_schema(),
        frontend = Frontend::LABELS.join(", "),
        backend = Backend::LABELS.join(", "),
        database = Database::LABELS.join(", "),
        keys = DIAGRAM_KEYS.join(", "),
        rules = archlab_core::rules::RULES,
    )
}

/// Render constraints as "- key: value" lines in key order.
pub fn render_constraints(constraints: &Constraints) -> String {
    if constraints.is_empty() {
        return "No additional constraints.".to_string();
    }
    let mut out = String::new();
    for (key, value) in constraints {
        out.push_str("- ");
        out.push_str(key);
        out.push_str(": ");
        match value {
            serde_json::Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        out.push('\n');
    }
    out.pop();
    out
}

pub fn generate_prompt(requirements: &str, constraints: &Constraints) -> Prompt {
    let user = format!(
        "Design a system for the following requirements.\n\n\
## Requirements\n{requirements}\n\n\
## Constraints\n{constraints}\n\n\
Respond with the design JSON object only.",
        constraints = render_constraints(constraints),
    );
    Prompt { system: system_prompt(), user }
}

/// Ask for a modified copy of `existing`. Fails only if the design cannot be encoded.
pub fn refine_prompt(
    existing: &Design,
    request: &str,
    constraints: &Constraints,
) -> Result<Prompt, serde_json::Error> {
    let current = serde_json::to_string_pretty(existing)?;
    let user = format!(
        "Here is an existing architecture design:\n\n{current}\n\n\
## Change request\n{request}\n\n\
## Constraints\n{constraints}\n\n\
Apply the change request and return the COMPLETE updated design. Preserve every section, \
component, entity, endpoint and diagram element that the change request does not affect, \
unchanged. Keep diagrams consistent with the updated components and data model.\n\
Respond with the full design JSON object only.",
        constraints = render_constraints(constraints),
    );
    Ok(Prompt { system: system_prompt(), user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlab_core::*;

    fn empty_design() -> Design {
        Design {
            requirements: Requirements {
                actors: vec![],
                functional: vec![],
                nfr: vec![],
                assumptions: vec![],
            },
            architecture: Architecture {
                pattern: "Layered".into(),
                rationale: vec![],
                risks: vec![],
            },
            tech_stack: TechStack::default(),
            components: vec![Component { name: "Billing".into(), responsibilities: vec![] }],
            data_model: vec![],
            api: vec![],
            diagrams: Diagrams {
                c4_context: Diagram::default(),
                c4_container: Diagram::default(),
                erd: Diagram::default(),
                sequence: Diagram::default(),
            },
        }
    }

    #[test]
    fn generate_prompt_embeds_requirements_verbatim() {
        let requirements = "Todo app with React frontend\n  and Node backend using MongoDB {x}";
        let prompt = generate_prompt(requirements, &Constraints::new());
        assert!(prompt.user.contains(requirements));
        assert!(prompt.user.contains("No additional constraints."));
    }

    #[test]
    fn system_prompt_states_output_contract() {
        let system = system_prompt();
        assert!(system.contains("Output ONLY one JSON object"));
        assert!(system.contains("\"techStack\""));
        for key in DIAGRAM_KEYS {
            assert!(system.contains(key));
        }
        assert!(system.contains("Next.js"));
        assert!(system.contains("Spring Boot"));
    }

    #[test]
    fn constraints_render_sorted_and_untyped() {
        let mut constraints = Constraints::new();
        constraints.insert("teamSize".into(), serde_json::json!(4));
        constraints.insert("budget".into(), serde_json::json!("low"));
        constraints.insert("cloud".into(), serde_json::json!("AWS"));
        assert_eq!(render_constraints(&constraints), "- budget: low\n- cloud: AWS\n- teamSize: 4");
    }

    #[test]
    fn refine_prompt_carries_design_and_request() {
        let design = empty_design();
        let prompt = refine_prompt(&design, "Add MongoDB as the database", &Constraints::new()).unwrap();
        assert!(prompt.user.contains("\"Billing\""));
        assert!(prompt.user.contains("Add MongoDB as the database"));
        assert!(prompt.user.contains("Preserve every section"));
    }
}

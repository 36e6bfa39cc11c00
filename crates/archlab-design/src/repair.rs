//! Shape repairs applied to parsed model output before validation.
//!
//! Models are not a trusted structured-output source, so a few recurring
//! deviations are fixed up here. Each rule is a pure `Candidate -> Candidate`
//! function; `normalize` runs them in `RULES` order. Anything not covered by a
//! rule is left for the validator to reject.

use serde_json::{json, Map, Value};

/// Parsed but unvalidated model output. Only `validate::validate` turns it into a `Design`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate(Value);

impl Candidate {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.as_object_mut()
    }
}

pub struct RepairRule {
    pub name: &'static str,
    pub apply: fn(Candidate) -> Candidate,
}

pub const RULES: &[RepairRule] = &[
    RepairRule { name: "stringify_architecture_lists", apply: stringify_architecture_lists },
    RepairRule { name: "techstack_from_list", apply: techstack_from_list },
    RepairRule { name: "default_techstack", apply: default_techstack },
];

/// Run every repair rule in order.
pub fn normalize(candidate: Candidate) -> Candidate {
    RULES.iter().fold(candidate, |current, rule| {
        let before = current.clone();
        let after = (rule.apply)(current);
        if after != before {
            tracing::debug!(rule = rule.name, "repaired model output");
        }
        after
    })
}

fn default_techstack_value(infrastructure: Vec<Value>) -> Value {
    json!({
        "frontend": "None",
        "backend": "None",
        "database": "None",
        "infrastructure": infrastructure,
    })
}

/// `architecture.rationale` / `architecture.risks` elements that are not strings become strings.
pub fn stringify_architecture_lists(mut candidate: Candidate) -> Candidate {
    let arch = candidate
        .object_mut()
        .and_then(|root| root.get_mut("architecture"))
        .and_then(Value::as_object_mut);
    if let Some(arch) = arch {
        for key in ["rationale", "risks"] {
            if let Some(items) = arch.get_mut(key).and_then(Value::as_array_mut) {
                for item in items.iter_mut().filter(|item| !item.is_string()) {
                    // Display for Value is compact JSON for objects/arrays, plain text for scalars
                    *item = Value::String(item.to_string());
                }
            }
        }
    }
    candidate
}

/// A `techStack` list is read as the infrastructure of a default tech stack.
pub fn techstack_from_list(mut candidate: Candidate) -> Candidate {
    if let Some(root) = candidate.object_mut() {
        if let Some(Value::Array(items)) = root.get_mut("techStack") {
            let items = std::mem::take(items);
            root.insert("techStack".to_string(), default_techstack_value(items));
        }
    }
    candidate
}

/// A missing or non-object `techStack` is replaced by the default tech stack.
pub fn default_techstack(mut candidate: Candidate) -> Candidate {
    if let Some(root) = candidate.object_mut() {
        if !root.get("techStack").is_some_and(Value::is_object) {
            root.insert("techStack".to_string(), default_techstack_value(vec![]));
        }
    }
    candidate
}

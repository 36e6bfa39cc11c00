use archlab_core::{Backend, Database, Design, Frontend};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::repair::Candidate;

/// One schema violation, located by a JSON path such as `dataModel[0].fields[1].type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Check a candidate against the `Design` shape and convert it.
///
/// Every required field must be present with the right JSON type; extra fields
/// are ignored. All violations are collected rather than stopping at the first.
pub fn validate(candidate: Candidate) -> Result<Design, Vec<FieldError>> {
    let mut checker = Checker::default();
    checker.design(candidate.as_value());
    if !checker.errors.is_empty() {
        return Err(checker.errors);
    }
    serde_json::from_value(candidate.into_value()).map_err(|e| {
        vec![FieldError { path: "$".to_string(), message: e.to_string() }]
    })
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, path: String, message: impl Into<String>) {
        self.errors.push(FieldError { path, message: message.into() });
    }

    fn mismatch(&mut self, path: String, expected: &str, found: &Value) {
        self.fail(path, format!("expected {expected}, found {}", type_name(found)));
    }

    /// Look up a required key, recording an error when absent.
    fn required<'a>(&mut self, obj: &'a Map<String, Value>, parent: &str, key: &str) -> Option<&'a Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.fail(join(parent, key), "is required");
        }
        value
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.mismatch(path.to_string(), "object", other);
                None
            }
        }
    }

    fn array<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Vec<Value>> {
        match value {
            Value::Array(items) => Some(items),
            other => {
                self.mismatch(path.to_string(), "array", other);
                None
            }
        }
    }

    fn string(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) {
        if let Some(value) = self.required(obj, parent, key) {
            if !value.is_string() {
                self.mismatch(join(parent, key), "string", value);
            }
        }
    }

    fn optional_string(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) {
        match obj.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => self.mismatch(join(parent, key), "string", other),
        }
    }

    fn string_items(&mut self, items: &[Value], path: &str) {
        for (i, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.mismatch(format!("{path}[{i}]"), "string", item);
            }
        }
    }

    fn string_list(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) {
        let path = join(parent, key);
        if let Some(items) = self.required(obj, parent, key).and_then(|v| self.array(v, &path)) {
            self.string_items(items, &path);
        }
    }

    /// Required list of objects, each checked by `each(checker, object, path)`.
    fn object_list(
        &mut self,
        obj: &Map<String, Value>,
        parent: &str,
        key: &str,
        each: fn(&mut Checker, &Map<String, Value>, &str),
    ) {
        let path = join(parent, key);
        let Some(items) = self.required(obj, parent, key).and_then(|v| self.array(v, &path)) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            if let Some(item_obj) = self.object(item, &item_path) {
                each(self, item_obj, &item_path);
            }
        }
    }

    /// Required nested object, checked by `inner(checker, object, path)`.
    fn nested(
        &mut self,
        obj: &Map<String, Value>,
        parent: &str,
        key: &str,
        inner: fn(&mut Checker, &Map<String, Value>, &str),
    ) {
        let path = join(parent, key);
        if let Some(nested) = self.required(obj, parent, key).and_then(|v| self.object(v, &path)) {
            inner(self, nested, &path);
        }
    }

    fn label(&mut self, obj: &Map<String, Value>, parent: &str, key: &str, allowed: &[&str]) {
        let Some(value) = self.required(obj, parent, key) else {
            return;
        };
        match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            Some(s) => self.fail(
                join(parent, key),
                format!("expected one of {}, found \"{s}\"", allowed.join(", ")),
            ),
            None => self.mismatch(join(parent, key), "string", value),
        }
    }

    fn design(&mut self, value: &Value) {
        let Some(root) = self.object(value, "$") else {
            return;
        };
        self.nested(root, "", "requirements", |c, obj, path| {
            for key in ["actors", "functional", "nfr", "assumptions"] {
                c.string_list(obj, path, key);
            }
        });
        self.nested(root, "", "architecture", |c, obj, path| {
            c.string(obj, path, "pattern");
            c.string_list(obj, path, "rationale");
            c.string_list(obj, path, "risks");
        });
        self.nested(root, "", "techStack", |c, obj, path| {
            c.label(obj, path, "frontend", Frontend::LABELS);
            c.label(obj, path, "backend", Backend::LABELS);
            c.label(obj, path, "database", Database::LABELS);
            c.string_list(obj, path, "infrastructure");
        });
        self.object_list(root, "", "components", |c, obj, path| {
            c.string(obj, path, "name");
            c.string_list(obj, path, "responsibilities");
        });
        self.object_list(root, "", "dataModel", |c, obj, path| {
            c.string(obj, path, "entity");
            c.object_list(obj, path, "fields", |c, obj, path| {
                c.string(obj, path, "name");
                c.string(obj, path, "type");
            });
        });
        self.object_list(root, "", "api", |c, obj, path| {
            c.string(obj, path, "method");
            c.string(obj, path, "path");
            c.string(obj, path, "purpose");
        });
        self.nested(root, "", "diagrams", |c, obj, path| {
            for key in archlab_core::DIAGRAM_KEYS {
                c.nested(obj, path, key, Checker::diagram);
            }
        });
    }

    fn diagram(&mut self, obj: &Map<String, Value>, path: &str) {
        self.object_list(obj, path, "nodes", |c, obj, path| {
            c.string(obj, path, "id");
            c.string(obj, path, "label");
            c.optional_string(obj, path, "type");
            match obj.get("details") {
                None | Some(Value::Null) => {}
                Some(details) => {
                    let details_path = join(path, "details");
                    if let Some(items) = c.array(details, &details_path) {
                        c.string_items(items, &details_path);
                    }
                }
            }
        });
        self.object_list(obj, path, "edges", |c, obj, path| {
            c.string(obj, path, "id");
            c.string(obj, path, "source");
            c.string(obj, path, "target");
            c.optional_string(obj, path, "label");
        });
    }
}

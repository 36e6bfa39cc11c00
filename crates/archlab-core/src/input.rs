//! Checks applied to user input before it reaches the store or the model.

use crate::design::Constraints;

pub const MIN_PROJECT_NAME_CHARS: usize = 2;
pub const MIN_REQUIREMENTS_CHARS: usize = 10;

fn at_least(field: &str, text: &str, min: usize) -> Result<(), String> {
    if text.trim().chars().count() < min {
        return Err(format!("{field}: must be at least {min} characters"));
    }
    Ok(())
}

pub fn check_project_name(name: &str) -> Result<(), String> {
    at_least("name", name, MIN_PROJECT_NAME_CHARS)
}

pub fn check_requirements(text: &str) -> Result<(), String> {
    at_least("requirementsText", text, MIN_REQUIREMENTS_CHARS)
}

pub fn check_refinement(request: &str) -> Result<(), String> {
    if request.trim().is_empty() {
        return Err("refinementRequest: must not be empty".to_string());
    }
    Ok(())
}

/// `teamSize` must be a positive integer; `budget` and `cloud` must be strings.
/// Other keys pass through untouched.
pub fn check_constraints(constraints: &Constraints) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();
    if let Some(team) = constraints.get("teamSize") {
        if !team.as_u64().is_some_and(|n| n > 0) {
            problems.push("teamSize: must be a positive integer".to_string());
        }
    }
    for key in ["budget", "cloud"] {
        if constraints.get(key).is_some_and(|v| !v.is_string()) {
            problems.push(format!("{key}: must be a string"));
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn constraints(value: Value) -> Constraints {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_minimums_ignore_surrounding_whitespace() {
        assert!(check_project_name(" a ").is_err());
        assert!(check_project_name("ab").is_ok());
        assert!(check_requirements("too short").is_err());
        assert!(check_requirements("a todo app").is_ok());
        assert!(check_refinement("  \n").is_err());
    }

    #[test]
    fn accepts_well_typed_constraints() {
        let c = constraints(json!({"teamSize": 4, "budget": "low", "cloud": "AWS", "extra": [1]}));
        assert!(check_constraints(&c).is_ok());
        assert!(check_constraints(&Constraints::new()).is_ok());
    }

    #[test]
    fn rejects_bad_team_size_and_non_string_fields() {
        for team in [json!(0), json!(-2), json!(2.5), json!("5")] {
            let c = constraints(json!({ "teamSize": team }));
            assert!(check_constraints(&c).is_err(), "teamSize {team} accepted");
        }
        let problems = check_constraints(&constraints(json!({"budget": 100, "cloud": null})))
            .unwrap_err();
        assert_eq!(problems, vec!["budget: must be a string", "cloud: must be a string"]);
    }
}

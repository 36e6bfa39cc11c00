use crate::design::{label_of, Design};

fn bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("_None._\n");
        return;
    }
    for item in items {
        out.push_str("- ");
        out.push_str(item);
        out.push('\n');
    }
}

/// Escape characters that would break a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render a design as a Markdown architecture document.
pub fn render_markdown(design: &Design, project_name: &str) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("# ");
    out.push_str(project_name);
    out.push_str("\n\n_Architecture Design Document_\n\n");

    out.push_str("## 1. System Overview\n\n**Architecture pattern:** ");
    out.push_str(&design.architecture.pattern);
    out.push_str("\n\n### Rationale\n\n");
    bullets(&mut out, &design.architecture.rationale);
    out.push_str("\n### Risks\n\n");
    bullets(&mut out, &design.architecture.risks);

    let req = &design.requirements;
    out.push_str("\n## 2. Requirements\n\n### Actors\n\n");
    bullets(&mut out, &req.actors);
    out.push_str("\n### Functional\n\n");
    bullets(&mut out, &req.functional);
    out.push_str("\n### Non-Functional\n\n");
    bullets(&mut out, &req.nfr);
    out.push_str("\n### Assumptions\n\n");
    bullets(&mut out, &req.assumptions);

    let stack = &design.tech_stack;
    out.push_str("\n## 3. Tech Stack\n\n| Layer | Choice |\n|---|---|\n");
    out.push_str(&format!("| Frontend | {} |\n", label_of(&stack.frontend)));
    out.push_str(&format!("| Backend | {} |\n", label_of(&stack.backend)));
    out.push_str(&format!("| Database | {} |\n", label_of(&stack.database)));
    if !stack.infrastructure.is_empty() {
        out.push_str(&format!(
            "| Infrastructure | {} |\n",
            cell(&stack.infrastructure.join(", "))
        ));
    }

    out.push_str("\n## 4. Components\n\n");
    if design.components.is_empty() {
        out.push_str("_None._\n");
    }
    for component in &design.components {
        out.push_str("### ");
        out.push_str(&component.name);
        out.push_str("\n\n");
        bullets(&mut out, &component.responsibilities);
        out.push('\n');
    }

    out.push_str("\n## 5. Data Model\n\n");
    if design.data_model.is_empty() {
        out.push_str("_None._\n");
    }
    for entity in &design.data_model {
        out.push_str("### ");
        out.push_str(&entity.entity);
        out.push_str("\n\n| Field | Type |\n|---|---|\n");
        for field in &entity.fields {
            out.push_str(&format!("| {} | {} |\n", cell(&field.name), cell(&field.field_type)));
        }
        out.push('\n');
    }

    out.push_str("\n## 6. API\n\n");
    if design.api.is_empty() {
        out.push_str("_None._\n");
    } else {
        out.push_str("| Method | Path | Purpose |\n|---|---|---|\n");
        for endpoint in &design.api {
            out.push_str(&format!(
                "| {} | `{}` | {} |\n",
                cell(&endpoint.method),
                cell(&endpoint.path),
                cell(&endpoint.purpose)
            ));
        }
    }

    out
}

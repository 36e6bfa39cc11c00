const FENCE: &str = "```";
/// A fence opening a line. JSON strings cannot hold a raw newline, so a
/// payload never contains this.
const LINE_FENCE: &str = "\n```";

/// Recover the JSON payload from raw model output.
///
/// Prefers a fence wrapping the whole reply, then any fenced block, then the
/// outermost `{ ... }` span. Text with neither fences nor braces comes back
/// unchanged so the JSON parser reports the real problem.
pub fn extract_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = whole_fence(trimmed)
        .or_else(|| first_fenced_block(trimmed))
        .unwrap_or(raw);
    brace_span(body).unwrap_or(body)
}

/// Contents of a fence that spans the entire (trimmed) text.
fn whole_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix(FENCE)?.strip_suffix(FENCE)?;
    if inner.contains(LINE_FENCE) {
        return None;
    }
    Some(strip_info_string(inner).trim())
}

fn first_fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let end = rest.find(LINE_FENCE).or_else(|| rest.find(FENCE))?;
    Some(strip_info_string(&rest[..end]).trim())
}

/// Drop a leading language tag line such as "json".
fn strip_info_string(block: &str) -> &str {
    match block.split_once('\n') {
        Some((tag, body)) if !tag.contains('{') && !tag.contains('[') => body,
        _ => block,
    }
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_whole_fence() {
        assert_eq!(extract_payload("  ```json\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(extract_payload("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_payload("```{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn slices_between_outer_braces() {
        assert_eq!(extract_payload("noise {\"a\":1} trailing"), "{\"a\":1}");
        assert_eq!(
            extract_payload("Sure! {\"a\":{\"b\":2}} hope this helps }"),
            "{\"a\":{\"b\":2}} hope this helps }"
        );
    }

    #[test]
    fn prefers_fenced_block_inside_prose() {
        let raw = "Here is the design {draft}:\n```json\n{\"a\":1}\n```\nLet me know {if} needed.";
        assert_eq!(extract_payload(raw), "{\"a\":1}");
    }

    #[test]
    fn returns_input_without_braces() {
        assert_eq!(extract_payload("no braces here"), "no braces here");
        assert_eq!(extract_payload("  padded  "), "  padded  ");
        assert_eq!(extract_payload("} backwards {"), "} backwards {");
        assert_eq!(extract_payload(""), "");
    }

    #[test]
    fn backticks_inside_json_strings_do_not_close_the_fence() {
        let whole = "```json\n{\"usage\": \"wrap code in ``` fences\"}\n```";
        assert_eq!(extract_payload(whole), "{\"usage\": \"wrap code in ``` fences\"}");

        let in_prose = "Design:\n```json\n{\"a\": \"x ``` y\"}\n```\nThanks.";
        assert_eq!(extract_payload(in_prose), "{\"a\": \"x ``` y\"}");
    }

    #[test]
    fn two_fenced_blocks_use_the_first() {
        let raw = "```json\n{\"a\":1}\n```\nand\n```json\n{\"b\":2}\n```";
        assert_eq!(extract_payload(raw), "{\"a\":1}");
    }

    #[test]
    fn fenced_block_without_braces_is_returned_as_is() {
        assert_eq!(extract_payload("```text\nnot json\n```"), "not json");
    }

    #[test]
    fn unterminated_fence_falls_back_to_braces() {
        assert_eq!(extract_payload("```json\n{\"a\":1}"), "{\"a\":1}");
    }
}

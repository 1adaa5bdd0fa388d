//! Cleanup and extraction for raw model output.

use serde_json::Value;

// ============================================================================
// HTML cleanup
// ============================================================================

/// Strip markdown code-fence wrapping from a generated document.
///
/// Removes every ```` ```html ```` opener (with its trailing newline) and every
/// remaining ```` ``` ````, then trims.
pub fn strip_code_fences(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for opener in ["```html\r\n", "```html\n", "```HTML\r\n", "```HTML\n"] {
        cleaned = cleaned.replace(opener, "");
    }
    cleaned.replace("```", "").trim().to_string()
}

// ============================================================================
// Structured output extraction
// ============================================================================

/// Pull the JSON object out of a structured model reply.
///
/// Strict structured outputs arrive as a bare object, but some
/// OpenAI-compatible backends still wrap it in a fenced block or prose.
/// Tries the whole text, then a fenced ```json block, then the first
/// balanced `{...}` that parses.
pub fn extract_json_object(output: &str) -> Option<Value> {
    parse_object(output)
        .or_else(|| extract_fenced_json(output))
        .or_else(|| extract_bare_json(output))
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(Value::is_object)
}

/// First ```json fenced block whose body is an object.
fn extract_fenced_json(output: &str) -> Option<Value> {
    let mut rest = output;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let close = after.find("```")?;
        let block = &after[..close];
        let body = block
            .strip_prefix("json")
            .or_else(|| block.strip_prefix("JSON"));
        if let Some(val) = body.and_then(parse_object) {
            return Some(val);
        }
        rest = &after[close + 3..];
    }
    None
}

/// Walk the top-level `{...}` spans left to right and return the first that
/// parses. A span that does not parse is skipped whole, so every byte is
/// scanned once. An unterminated span ends the search.
fn extract_bare_json(output: &str) -> Option<Value> {
    let bytes = output.as_bytes();
    let mut pos = 0;
    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'{') {
        let start = pos + offset;
        let end = start + object_span_end(&bytes[start..])?;
        if let Some(val) = parse_object(&output[start..=end]) {
            return Some(val);
        }
        pos = end + 1;
    }
    None
}

/// Offset of the `}` closing the object that opens at `span[0]`. Braces
/// inside string literals are ignored. Works on bytes: every delimiter is
/// ASCII, so the offsets are always char boundaries.
fn object_span_end(span: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in span.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_fence() {
        assert_eq!(
            strip_code_fences("```html\n<html>...</html>\n```"),
            "<html>...</html>"
        );
    }

    #[test]
    fn test_strip_bare_fence_and_whitespace() {
        assert_eq!(
            strip_code_fences("  ```\n<!DOCTYPE html><html></html>\n```  "),
            "<!DOCTYPE html><html></html>"
        );
    }

    #[test]
    fn test_unfenced_document_is_untouched() {
        let doc = "<!DOCTYPE html>\n<html><body>Hi</body></html>";
        assert_eq!(strip_code_fences(doc), doc);
    }

    #[test]
    fn test_extract_plain_object() {
        let val = extract_json_object(r#" {"response":"hi"} "#).unwrap();
        assert_eq!(val["response"], "hi");
    }

    #[test]
    fn test_extract_fenced_object() {
        let output = "Here you go:\n```json\n{\"response\": \"hi\"}\n```\n";
        let val = extract_json_object(output).unwrap();
        assert_eq!(val["response"], "hi");
    }

    #[test]
    fn test_extract_bare_object_with_braces_in_strings() {
        let output = r#"Sure! {"response": "use {curly} quotes \" here"} trailing"#;
        let val = extract_json_object(output).unwrap();
        assert_eq!(val["response"], "use {curly} quotes \" here");
    }

    #[test]
    fn test_extract_skips_prose_braces() {
        let output = r#"Pick a {theme} first, then {"response": "ok"}"#;
        let val = extract_json_object(output).unwrap();
        assert_eq!(val["response"], "ok");
    }

    #[test]
    fn test_extract_after_many_non_json_spans() {
        let mut output = "{nope {nested}} ".repeat(20_000);
        output.push_str(r#"Voilà 🎨 {"response": "café"}"#);
        let val = extract_json_object(&output).unwrap();
        assert_eq!(val["response"], "café");
    }

    #[test]
    fn test_extract_unterminated_object() {
        assert!(extract_json_object(r#"Here: {"response": "hi""#).is_none());
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_json_object("no json at all").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
    }
}

// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences around the JSON. \
    Do NOT include explanations or apologies.";

/// Formatting rules shared by every markdown-producing prompt.
pub const MARKDOWN_INSTRUCTION: &str = "Format the content as a markdown document. \
    Use headings, bullet points, and numbered lists so it is clear, organized, and easy to follow.";

/// Fills `{name}` placeholders in a single pass over `template`.
///
/// Substituted values are emitted verbatim and never rescanned, so braces in
/// user input survive unchanged. Unknown or unterminated placeholders are kept
/// as literal text.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

//! Client-facing model ids mapped to upstream backend models.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Static mapping from client model names to upstream backend models.
static CLIENT_TO_UPSTREAM: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("claude-opus-4-5", "gemini-3-pro-preview"),
        ("claude-opus-4-5-thinking", "gemini-3-pro-preview"),
        ("claude-sonnet-4-5", "gemini-3-pro-preview"),
        ("claude-sonnet-4-5-thinking", "gemini-3-pro-preview"),
        ("claude-haiku-4-5", "gemini-3-flash"),
        ("gemini-3-pro", "gemini-3-pro-preview"),
        ("gemini-3-pro-low", "gemini-3-pro-preview"),
        ("gemini-3-pro-high", "gemini-3-pro-preview"),
        ("gemini-3-flash-preview", "gemini-3-flash"),
        ("gemini-2.5-flash", "gemini-2.5-flash"),
    ])
});

/// Resolve the upstream model for a client-requested id.
///
/// Unknown ids pass through unchanged; the translation layer owns the final
/// say on whether the upstream accepts them.
pub fn upstream_model(input: &str) -> String {
    if let Some(mapped) = CLIENT_TO_UPSTREAM.get(input) {
        return (*mapped).to_string();
    }

    input.strip_suffix("-latest").unwrap_or(input).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_aliases_map() {
        assert_eq!(upstream_model("claude-haiku-4-5"), "gemini-3-flash");
        assert_eq!(upstream_model("gemini-3-pro"), "gemini-3-pro-preview");
    }

    #[test]
    fn test_latest_suffix_stripped() {
        assert_eq!(upstream_model("gemini-3-flash-latest"), "gemini-3-flash");
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(upstream_model("custom-model"), "custom-model");
    }
}

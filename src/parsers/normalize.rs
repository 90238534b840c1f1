// Text normalization helpers for the export path and inbound input
//
// The live chat view renders raw content through the client-side markdown
// renderer; escaping applies only to the document-export pipeline.

/// Escape markup-sensitive characters so user/assistant text cannot inject
/// elements into the reconstructed document. Order matters: `&` first.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Undo `escape_markup` when emitting plain display text (page lines,
/// table cells). Inverse order: entities first, `&amp;` last.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Strip angle brackets and surrounding whitespace from free-form input
pub fn sanitize_input(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

/// A prompt is sendable when it is non-empty and at most 1000 characters
/// after trimming
pub fn is_valid_prompt(prompt: &str) -> bool {
    let trimmed = prompt.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup("a < b && c > d"),
            "a &lt; b &amp;&amp; c &gt; d"
        );
    }

    #[test]
    fn test_escape_is_idempotent_on_plain_text() {
        let text = "no markup here";
        assert_eq!(escape_markup(text), text);
    }

    #[test]
    fn test_unescape_round_trip() {
        let text = "use <b>&</b> carefully";
        assert_eq!(unescape_entities(&escape_markup(text)), text);
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  <script>hi</script>  "), "scripthi/script");
    }

    #[test]
    fn test_is_valid_prompt() {
        assert!(is_valid_prompt("find keywords"));
        assert!(!is_valid_prompt("   "));
        assert!(!is_valid_prompt(&"x".repeat(1001)));
        assert!(is_valid_prompt(&"x".repeat(1000)));
    }
}

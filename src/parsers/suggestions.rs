// Inline-suggestion extractor - splits an assistant reply into display
// content and follow-up prompts
//
// Two tiers: an explicit marker scan, then a heuristic line classifier that
// only runs when no markers were found. The classifier thresholds are a
// behavior contract; do not tune them.

use crate::models::{ExtractionResult, MessageRole};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Maximum number of suggestions the heuristic fallback may return
const MAX_FALLBACK_SUGGESTIONS: usize = 5;

/// Lines longer than this never qualify as fallback suggestions
const MAX_SUGGESTION_LEN: usize = 150;

/// Lines shorter than this never qualify as fallback suggestions
const MIN_SUGGESTION_LEN: usize = 10;

/// Prose threshold: long lines that read as questions or sentences are
/// skipped by the fallback classifier
const PROSE_LEN: usize = 100;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[SUGGESTION\]\s*([^\n\r]+)").unwrap())
}

fn lead_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(Start|Create|Analyze|Research|Build|Write|Generate|Find|Explore|Review|Compare|Focus|Let|Can|What|How|Why|I)",
        )
        .unwrap()
    })
}

/// Extract inline suggestions from one assistant message body.
///
/// Tier 1 collects every `[SUGGESTION]` marker in scan order and strips the
/// marker lines from the content. Tier 2 only runs when Tier 1 found
/// nothing: it walks the trimmed lines bottom-up, collecting up to five
/// short imperative/question lines, and removes exactly those lines from
/// the content. Pure and deterministic: the same input always yields the
/// same result, and re-extracting a tier's cleaned output yields nothing.
pub fn extract(content: &str) -> ExtractionResult {
    if content.trim().is_empty() {
        return ExtractionResult {
            clean_content: String::new(),
            suggestions: Vec::new(),
        };
    }

    let suggestions: Vec<String> = marker_regex()
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .collect();

    if !suggestions.is_empty() {
        let clean_content = marker_regex().replace_all(content, "").trim().to_string();
        return ExtractionResult {
            clean_content,
            suggestions,
        };
    }

    extract_heuristic(content)
}

/// Extract suggestions for a message of the given role. Only assistant
/// content is subject to extraction; user and system content passes through
/// unmodified with an empty suggestion list.
pub fn extract_for_role(role: MessageRole, content: &str) -> ExtractionResult {
    match role {
        MessageRole::Assistant => extract(content),
        MessageRole::User | MessageRole::System => ExtractionResult::passthrough(content),
    }
}

/// Tier 2: heuristic line classifier.
///
/// Walks non-empty trimmed lines from last to first, prepending qualifying
/// lines so the final order matches the original top-to-bottom order.
fn extract_heuristic(content: &str) -> ExtractionResult {
    let lines: Vec<&str> = content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut candidates: Vec<&str> = Vec::new();

    for &line in lines.iter().rev() {
        if candidates.len() >= MAX_FALLBACK_SUGGESTIONS {
            break;
        }

        let len = line.chars().count();
        if len > MAX_SUGGESTION_LEN || len < MIN_SUGGESTION_LEN {
            continue;
        }
        if line.contains('?') && len > PROSE_LEN {
            continue;
        }
        if line.ends_with('.') && len > PROSE_LEN {
            continue;
        }

        if lead_word_regex().is_match(line)
            || line.contains(" for ")
            || line.contains(" about ")
            || line.contains(" with ")
        {
            candidates.insert(0, line);
        }
    }

    if candidates.is_empty() {
        return ExtractionResult::passthrough(content);
    }

    let candidate_set: HashSet<&str> = candidates.iter().copied().collect();
    let clean_content = content
        .split('\n')
        .filter(|line| !candidate_set.contains(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    ExtractionResult {
        clean_content,
        suggestions: candidates.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_extraction_in_order() {
        let content = "Here's a plan.\n[SUGGESTION] Add a header\n[SUGGESTION] Add a footer";
        let result = extract(content);

        assert_eq!(result.clean_content, "Here's a plan.");
        assert_eq!(result.suggestions, vec!["Add a header", "Add a footer"]);
    }

    #[test]
    fn test_marker_inline_with_text() {
        let content = "Intro [SUGGESTION] Try keyword research\nMore prose here.";
        let result = extract(content);

        assert_eq!(result.suggestions, vec!["Try keyword research"]);
        assert!(!result.clean_content.contains("[SUGGESTION]"));
        assert!(result.clean_content.contains("More prose here."));
    }

    #[test]
    fn test_marker_trims_trailing_whitespace() {
        let content = "[SUGGESTION]   Compare top competitors   ";
        let result = extract(content);

        assert_eq!(result.suggestions, vec!["Compare top competitors"]);
        assert_eq!(result.clean_content, "");
    }

    #[test]
    fn test_no_markers_no_candidates_passthrough() {
        let content = "The quarterly numbers were strong.\nEverything shipped on schedule.";
        let result = extract(content);

        assert_eq!(result.clean_content, content);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_empty_content() {
        let result = extract("   \n  ");
        assert_eq!(result.clean_content, "");
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_heuristic_collects_lead_word_lines() {
        let content = "Keyword gaps were found in three clusters, and the strongest opportunities sit in the informational intent pages reviewed earlier today.\nAnalyze the top ranking pages\nCreate a content brief";
        let result = extract(content);

        assert_eq!(
            result.suggestions,
            vec!["Analyze the top ranking pages", "Create a content brief"]
        );
        assert!(result.clean_content.starts_with("Keyword gaps"));
        assert!(!result.clean_content.contains("content brief"));
    }

    #[test]
    fn test_heuristic_preserves_top_to_bottom_order() {
        let content = "Summary of the audit goes here in one long plain sentence that will not be picked up because it ends with a period and runs well past the one hundred character prose threshold.\nBuild a topical map\nResearch competitor backlinks\nWrite a pillar page";
        let result = extract(content);

        assert_eq!(
            result.suggestions,
            vec![
                "Build a topical map",
                "Research competitor backlinks",
                "Write a pillar page"
            ]
        );
    }

    #[test]
    fn test_heuristic_caps_at_five() {
        let content = (1..=8)
            .map(|i| format!("Create article number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let result = extract(&content);

        assert_eq!(result.suggestions.len(), 5);
        // Bottom-up walk keeps the LAST five, in original order
        assert_eq!(result.suggestions[0], "Create article number 4");
        assert_eq!(result.suggestions[4], "Create article number 8");
    }

    #[test]
    fn test_heuristic_skips_short_and_long_lines() {
        let long_line = format!("Create {}", "x".repeat(160));
        let content = format!("Create it\n{}\nCreate a launch checklist", long_line);
        let result = extract(&content);

        // "Create it" is 9 chars (< 10), the long line is > 150
        assert_eq!(result.suggestions, vec!["Create a launch checklist"]);
    }

    #[test]
    fn test_heuristic_skips_long_questions_and_sentences() {
        let question = format!("What {} should we target?", "keyword ".repeat(13));
        let sentence = format!("Start {} and then stop.", "slowly ".repeat(14));
        assert!(question.chars().count() > 100);
        assert!(sentence.chars().count() > 100);

        let content = format!("{}\n{}\nFind quick wins for the blog", question, sentence);
        let result = extract(&content);

        assert_eq!(result.suggestions, vec!["Find quick wins for the blog"]);
    }

    #[test]
    fn test_heuristic_containment_keywords() {
        let content =
            "The rollout finished late yesterday evening without further incident at all.\noutline ideas for the next sprint";
        let result = extract(content);

        assert_eq!(result.suggestions, vec!["outline ideas for the next sprint"]);
    }

    #[test]
    fn test_marker_tier_wins_over_heuristic() {
        let content = "Create a plan today\n[SUGGESTION] Do this instead";
        let result = extract(content);

        // Tier 1 found a marker, so the heuristic never runs
        assert_eq!(result.suggestions, vec!["Do this instead"]);
        assert_eq!(result.clean_content, "Create a plan today");
    }

    #[test]
    fn test_marker_extraction_is_idempotent() {
        let content = "Here's a plan.\n[SUGGESTION] Add a header\n[SUGGESTION] Add a footer";
        let first = extract(content);
        let second = extract(&first.clean_content);

        assert!(second.suggestions.is_empty());
        assert_eq!(second.clean_content, first.clean_content);
    }

    #[test]
    fn test_heuristic_extraction_is_idempotent() {
        let content = "The migration notes are archived in the shared drive under the usual naming scheme.\nReview the migration checklist\nCompare both staging environments";
        let first = extract(content);
        assert_eq!(first.suggestions.len(), 2);

        let second = extract(&first.clean_content);
        assert!(second.suggestions.is_empty());
        assert_eq!(second.clean_content, first.clean_content);
    }

    #[test]
    fn test_deterministic() {
        let content = "Start with on-page fixes\nThen measure the uplift over four weeks.";
        assert_eq!(extract(content), extract(content));
    }

    #[test]
    fn test_user_and_system_content_pass_through() {
        let content = "Create a content calendar";
        for role in [MessageRole::User, MessageRole::System] {
            let result = extract_for_role(role, content);
            assert_eq!(result.clean_content, content);
            assert!(result.suggestions.is_empty());
        }

        let result = extract_for_role(MessageRole::Assistant, content);
        assert_eq!(result.suggestions, vec!["Create a content calendar"]);
    }

    #[test]
    fn test_clean_content_has_no_remaining_markers() {
        let content = "A\n[SUGGESTION] one\nB\n[SUGGESTION] two\nC\n[SUGGESTION] three";
        let result = extract(content);

        assert_eq!(result.suggestions.len(), 3);
        assert!(!result.clean_content.contains("[SUGGESTION]"));
    }
}

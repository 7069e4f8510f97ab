//! Story payload extraction
//!
//! Language models asked for `{"title", "story"}` JSON frequently wrap it in
//! reasoning blocks, markdown fences or prose, or emit typographic quotes.
//! Extraction peels those layers off and falls back to a field scan when the
//! remainder still is not valid JSON. It never fails: missing fields get
//! defaults.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use readalong_config::constants::story::DEFAULT_TITLE;
use readalong_core::GeneratedStory;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").unwrap());

static ESCAPED_THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)&lt;think&gt;.*?&lt;/think&gt;").unwrap());

/// First `{` through last `}`
static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

static TITLE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)"title"\s*:\s*"(.*?)"|'title'\s*:\s*'(.*?)'"#).unwrap());

static STORY_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)"story"\s*:\s*"(.*?)"|'story'\s*:\s*'(.*?)'"#).unwrap());

/// Pull `{title, story}` out of raw model output
pub fn extract_story_payload(content: &str) -> GeneratedStory {
    let json_like = isolate_json(content);

    match serde_json::from_str::<Value>(&json_like) {
        Ok(value) => GeneratedStory {
            title: field_text(value.get("title")).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            story: field_text(value.get("story")).unwrap_or_default(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Model output is not valid JSON, scanning for fields");
            GeneratedStory {
                title: scan_field(&TITLE_FIELD, &json_like)
                    .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                story: scan_field(&STORY_FIELD, &json_like).unwrap_or_default(),
            }
        }
    }
}

fn isolate_json(content: &str) -> String {
    let without_escaped = ESCAPED_THINK_BLOCK.replace_all(content, "");
    let cleaned = THINK_BLOCK.replace_all(&without_escaped, "");

    let mut raw: &str = &cleaned;
    if raw.trim().starts_with("```") {
        if let (Some(first_newline), Some(last_fence)) = (raw.find('\n'), raw.rfind("```")) {
            // An unterminated fence leaves the text to the block search below
            if last_fence > first_newline {
                raw = raw[first_newline + 1..last_fence].trim();
            }
        }
    }

    let block = JSON_BLOCK.find(raw).map_or(raw, |m| m.as_str());

    let mut json_like: String = block
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            c => c,
        })
        .collect();

    if let Some(last_brace) = json_like.rfind('}') {
        json_like.truncate(last_brace + 1);
    }
    json_like
}

fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn scan_field(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let story = extract_story_payload(r#"{"title": "The Fox", "story": "A quick fox."}"#);
        assert_eq!(story.title, "The Fox");
        assert_eq!(story.story, "A quick fox.");
    }

    #[test]
    fn test_reasoning_and_fences() {
        let content = concat!(
            "<think>\nThe user wants {a fox}.\n</think>\n",
            "```json\n{\"title\": \"Fox\", \"story\": \"Ran.\"}\n```"
        );
        let story = extract_story_payload(content);
        assert_eq!(story.title, "Fox");
        assert_eq!(story.story, "Ran.");

        let escaped = concat!(
            "&lt;think&gt;hmm {x}&lt;/think&gt;",
            "{\"title\": \"Owl\", \"story\": \"Hoot.\"}"
        );
        assert_eq!(extract_story_payload(escaped).title, "Owl");
    }

    #[test]
    fn test_surrounding_prose() {
        let content = concat!(
            "Sure! Here is your story:\n",
            "{\"title\": \"Moon\", \"story\": \"Night fell.\"}\nEnjoy!"
        );
        let story = extract_story_payload(content);
        assert_eq!(story.title, "Moon");
        assert_eq!(story.story, "Night fell.");
    }

    #[test]
    fn test_smart_quotes() {
        let content = concat!(
            "{\u{201C}title\u{201D}: \u{201C}Rain\u{201D}, ",
            "\u{201C}story\u{201D}: \u{201C}It poured.\u{201D}}"
        );
        let story = extract_story_payload(content);
        assert_eq!(story.title, "Rain");
        assert_eq!(story.story, "It poured.");
    }

    #[test]
    fn test_field_scan_fallback() {
        // Trailing comma makes this invalid JSON
        let content = r#"{"title": "Broken", "story": "Still readable",}"#;
        let story = extract_story_payload(content);
        assert_eq!(story.title, "Broken");
        assert_eq!(story.story, "Still readable");

        let single = "{'title': 'Quoted', 'story': 'Single quotes'}";
        let story = extract_story_payload(single);
        assert_eq!(story.title, "Quoted");
        assert_eq!(story.story, "Single quotes");
    }

    #[test]
    fn test_defaults() {
        let story = extract_story_payload("no json here at all");
        assert_eq!(story.title, "Your Story");
        assert_eq!(story.story, "");

        let story = extract_story_payload(r#"{"story": "Untitled tale"}"#);
        assert_eq!(story.title, "Your Story");
        assert_eq!(story.story, "Untitled tale");

        let story = extract_story_payload(r#"{"title": null, "story": 42}"#);
        assert_eq!(story.title, "Your Story");
        assert_eq!(story.story, "42");
    }

    #[test]
    fn test_unterminated_fence() {
        let story =
            extract_story_payload("```json\n{\"title\": \"Half\", \"story\": \"Open fence\"}");
        assert_eq!(story.title, "Half");
    }
}

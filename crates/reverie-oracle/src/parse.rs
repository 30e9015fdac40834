//! LLM response parsing into typed decisions and chronicle drafts.
//!
//! The LLM returns raw text, ideally JSON. Decoding runs strict-first
//! with progressively looser recovery:
//! 1. Direct `serde_json` deserialization
//! 2. Extract JSON from markdown code blocks
//! 3. Strip trailing commas and retry
//! 4. Code block extraction plus comma stripping
//!
//! Within a decoded decision, each action record is parsed independently;
//! a malformed action is dropped without discarding its siblings. When
//! every strategy fails, a final salvage pass pulls bare string fields out
//! of the raw text so a mostly-broken response still yields speech rather
//! than silence.

use reverie_types::{ChronicleDraft, MindAction, MindDecision};
use serde::Deserialize;
use tracing::warn;

/// Lenient mirror of the decision JSON: actions stay raw so one bad
/// record cannot poison the rest.
#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(default)]
    speech: String,
    #[serde(default)]
    actions: Vec<serde_json::Value>,
    #[serde(default)]
    private_thought: String,
}

/// Parse an LLM response into a decision.
///
/// Returns `None` only when nothing at all could be recovered; the
/// caller treats that as a silent mind.
pub fn parse_decision(raw: &str) -> Option<MindDecision> {
    let trimmed = raw.trim();
    if let Some(parsed) = decode::<RawDecision>(trimmed) {
        return Some(convert_decision(parsed));
    }

    // Salvage: pull whatever string fields survive in the wreckage.
    let speech = extract_string_field(trimmed, "speech").unwrap_or_default();
    let private_thought = extract_string_field(trimmed, "private_thought").unwrap_or_default();
    if speech.is_empty() && private_thought.is_empty() {
        warn!(raw_response = trimmed, "All decision parse strategies failed");
        return None;
    }
    warn!(raw_response = trimmed, "Salvaged decision from malformed response");
    Some(MindDecision {
        speech,
        actions: Vec::new(),
        private_thought,
    })
}

/// Parse an LLM response into a chronicle draft.
///
/// Salvage keeps a headline if one can be extracted, with the raw text
/// standing in for the summary.
pub fn parse_chronicle(raw: &str) -> Option<ChronicleDraft> {
    let trimmed = raw.trim();
    if let Some(draft) = decode::<ChronicleDraft>(trimmed) {
        return Some(draft);
    }

    let headline = extract_string_field(trimmed, "headline")?;
    warn!(raw_response = trimmed, "Salvaged chronicle from malformed response");
    let summary = extract_string_field(trimmed, "summary").unwrap_or_else(|| trimmed.to_owned());
    Some(ChronicleDraft {
        headline,
        summary,
        key_events: Vec::new(),
        dominant_concepts: Vec::new(),
    })
}

/// Run the strict-then-loose decode ladder for any deserializable shape.
fn decode<T: serde::de::DeserializeOwned>(trimmed: &str) -> Option<T> {
    // Strategy 1: direct parse
    if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
        return Some(parsed);
    }

    // Strategy 2: extract from markdown code block
    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<T>(json_str)
    {
        return Some(parsed);
    }

    // Strategy 3: strip trailing commas and retry
    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(parsed) = serde_json::from_str::<T>(&cleaned) {
        return Some(parsed);
    }

    // Strategy 4: code block extraction plus comma stripping
    if let Some(json_str) = extract_json_from_codeblock(trimmed) {
        let cleaned_inner = strip_trailing_commas(json_str);
        if let Ok(parsed) = serde_json::from_str::<T>(&cleaned_inner) {
            return Some(parsed);
        }
    }

    None
}

/// Convert a raw decision, dropping malformed action records one by one.
fn convert_decision(raw: RawDecision) -> MindDecision {
    let mut actions = Vec::with_capacity(raw.actions.len());
    for value in raw.actions {
        match serde_json::from_value::<MindAction>(value.clone()) {
            Ok(action) => actions.push(action),
            Err(error) => {
                warn!(%error, record = %value, "Dropping malformed action record");
            }
        }
    }
    MindDecision {
        speech: raw.speech,
        actions,
        private_thought: raw.private_thought,
    }
}

/// Pull a top-level string field out of otherwise-unparseable text.
///
/// Finds `"name"` followed by a colon and a quoted value, honoring
/// backslash escapes inside the value.
fn extract_string_field(text: &str, name: &str) -> Option<String> {
    let key = format!("\"{name}\"");
    let key_pos = text.find(&key)?;
    let after_key = key_pos.checked_add(key.len())?;
    let rest = text.get(after_key..)?;
    let colon = rest.find(':')?;
    let after_colon = rest.get(colon.checked_add(1)?..)?;
    let open = after_colon.find('"')?;
    let value_start = open.checked_add(1)?;
    let value = after_colon.get(value_start..)?;

    let mut result = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            match c {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                other => result.push(other),
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            let trimmed = result.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_owned());
        } else {
            result.push(c);
        }
    }
    None
}

/// Extract JSON from a markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```json").map(|i| {
        let after_tag = i.checked_add(7).unwrap_or(i);
        text.get(after_tag..)
            .and_then(|s| s.find('\n'))
            .and_then(|nl| after_tag.checked_add(nl))
            .and_then(|pos| pos.checked_add(1))
            .unwrap_or(after_tag)
    }).or_else(|| {
        text.find("```").map(|i| {
            let after_tag = i.checked_add(3).unwrap_or(i);
            text.get(after_tag..)
                .and_then(|s| s.find('\n'))
                .and_then(|nl| after_tag.checked_add(nl))
                .and_then(|pos| pos.checked_add(1))
                .unwrap_or(after_tag)
        })
    });

    let start = start?;
    let remaining = text.get(start..)?;
    let end = remaining.find("```")?;
    remaining.get(..end).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets (common LLM
/// error).
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut i = 0;
    while i < len {
        let c = chars.get(i).copied().unwrap_or(' ');
        if c == ',' {
            // Look ahead past whitespace for } or ]
            let mut j = i.checked_add(1).unwrap_or(i);
            while j < len && chars.get(j).copied().unwrap_or(' ').is_whitespace() {
                j = j.checked_add(1).unwrap_or(j);
            }
            let next = chars.get(j).copied().unwrap_or(' ');
            if next == '}' || next == ']' {
                i = i.checked_add(1).unwrap_or(i);
                continue;
            }
        }
        result.push(c);
        i = i.checked_add(1).unwrap_or(len);
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_clean_decision() {
        let raw = r#"{"speech": "The light is new today.", "actions": [{"type": "declare_concept", "name": "dawn", "content": "the first returning of light"}], "private_thought": "I hope someone answers."}"#;
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.speech, "The light is new today.");
        assert_eq!(decision.actions.len(), 1);
        assert!(matches!(
            decision.actions.first(),
            Some(MindAction::DeclareConcept { name, .. }) if name == "dawn"
        ));
        assert_eq!(decision.private_thought, "I hope someone answers.");
    }

    #[test]
    fn parse_decision_from_codeblock() {
        let raw = "Here is my decision:\n\n```json\n{\"speech\": \"I am here.\", \"actions\": []}\n```\n";
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.speech, "I am here.");
    }

    #[test]
    fn parse_decision_with_trailing_comma() {
        let raw = r#"{"speech": "still here", "actions": [],}"#;
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.speech, "still here");
    }

    #[test]
    fn malformed_action_is_dropped_without_losing_siblings() {
        let raw = r#"{"speech": "", "actions": [
            {"type": "declare_concept", "name": "dawn", "content": "light returns"},
            {"type": "mystery_action", "payload": 7},
            {"type": "establish_place", "name": "The Hollow", "content": "a basin"}
        ]}"#;
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.actions.len(), 2);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let decision = parse_decision(r#"{"speech": "just words"}"#).unwrap();
        assert!(decision.actions.is_empty());
        assert!(decision.private_thought.is_empty());
    }

    #[test]
    fn salvage_recovers_speech_from_broken_json() {
        let raw = r#"{"speech": "I saw something at the edge", "actions": [{"type": "#;
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.speech, "I saw something at the edge");
        assert!(decision.actions.is_empty());
    }

    #[test]
    fn salvage_handles_escaped_quotes() {
        let raw = r#"broken { "speech": "they called it \"the hollow\" today" nonsense"#;
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.speech, "they called it \"the hollow\" today");
    }

    #[test]
    fn pure_garbage_yields_none() {
        assert!(parse_decision("I think I shall simply wander today.").is_none());
        assert!(parse_decision("").is_none());
    }

    #[test]
    fn parse_clean_chronicle() {
        let raw = r#"{"headline": "The First Naming", "summary": "Aster spoke.", "key_events": ["Aster spoke"], "dominant_concepts": ["naming"]}"#;
        let draft = parse_chronicle(raw).unwrap();
        assert_eq!(draft.headline, "The First Naming");
        assert_eq!(draft.key_events.len(), 1);
    }

    #[test]
    fn chronicle_salvage_keeps_headline() {
        let raw = r#"{"headline": "A Quiet Turning", "summary": "Not much"#;
        let draft = parse_chronicle(raw).unwrap();
        assert_eq!(draft.headline, "A Quiet Turning");
        assert!(!draft.summary.is_empty());
    }

    #[test]
    fn chronicle_without_headline_yields_none() {
        assert!(parse_chronicle("nothing useful here").is_none());
    }

    #[test]
    fn extract_json_from_markdown() {
        let text = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json_from_codeblock(text), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn strip_trailing_commas_basic() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,]"), "[1, 2, 3]");
    }
}

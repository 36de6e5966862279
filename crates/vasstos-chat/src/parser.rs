//! Normalization of raw API replies.
//!
//! Pulls the visible text out of a response, splits off an embedded
//! `<suggestions>a|b|c</suggestions>` block, and turns grounding chunks into
//! citations.

use regex::Regex;
use std::sync::LazyLock;

use vasstos_core::locale;
use vasstos_core::types::{ConversationResult, Language, Source};

use crate::gemini::{GenerateContentResponse, GroundingChunk};

static SUGGESTIONS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<suggestions>(.*?)</suggestions>").unwrap());

/// Split a reply into visible text and follow-up suggestions.
///
/// Without a block the text comes back unchanged. With one, the first
/// block's entries are trimmed (empty ones dropped), every block is removed
/// from the text, whitespace on both sides of a removed block collapses to
/// the run before it, and the remainder is trimmed.
pub fn split_suggestions(raw: &str) -> (String, Vec<String>) {
    let Some(caps) = SUGGESTIONS_BLOCK.captures(raw) else {
        return (raw.to_string(), Vec::new());
    };

    let suggestions = caps
        .get(1)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut text = String::with_capacity(raw.len());
    let mut last = 0;
    for block in SUGGESTIONS_BLOCK.find_iter(raw) {
        push_joined(&mut text, &raw[last..block.start()]);
        last = block.end();
    }
    push_joined(&mut text, &raw[last..]);
    (text.trim().to_string(), suggestions)
}

/// Append `piece`, keeping a single run of whitespace where a removed block
/// used to sit.
fn push_joined(text: &mut String, piece: &str) {
    if text.ends_with(char::is_whitespace) {
        text.push_str(piece.trim_start());
    } else {
        text.push_str(piece);
    }
}

/// Citations from grounding chunks, in order, keeping only entries with a uri.
pub fn extract_sources(chunks: &[GroundingChunk], language: Language) -> Vec<Source> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().map(str::trim).unwrap_or_default();
            if uri.is_empty() {
                return None;
            }
            let title = web
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(locale::source_placeholder(language));
            Some(Source {
                title: title.to_string(),
                uri: uri.to_string(),
            })
        })
        .collect()
}

/// Normalize a full response into a [`ConversationResult`].
pub fn parse_reply(response: &GenerateContentResponse, language: Language) -> ConversationResult {
    let raw = response.text();
    let raw = if raw.trim().is_empty() {
        tracing::warn!(
            finish_reason = response.finish_reason().unwrap_or("none"),
            "Reply carried no text, using fallback"
        );
        locale::empty_reply(language).to_string()
    } else {
        raw
    };

    let (mut text, suggestions) = split_suggestions(&raw);
    if text.is_empty() {
        // The reply was nothing but a suggestions block.
        text = locale::empty_reply(language).to_string();
    }

    ConversationResult {
        text,
        sources: extract_sources(response.grounding_chunks(), language),
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::WebChunk;
    use serde_json::json;

    fn chunk(uri: Option<&str>, title: Option<&str>) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebChunk {
                uri: uri.map(str::to_string),
                title: title.map(str::to_string),
            }),
        }
    }

    // ---- split_suggestions ----

    #[test]
    fn test_split_basic() {
        let (text, suggestions) = split_suggestions("Hello <suggestions>A|B|C</suggestions>");
        assert_eq!(text, "Hello");
        assert_eq!(suggestions, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_split_no_block_is_unchanged() {
        let raw = "  Plain answer with | pipes  ";
        let (text, suggestions) = split_suggestions(raw);
        assert_eq!(text, raw);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_split_trims_entries_and_drops_empty() {
        let (text, suggestions) =
            split_suggestions("Resposta.\n<suggestions> Preços? | | Cases de IA |</suggestions>");
        assert_eq!(text, "Resposta.");
        assert_eq!(suggestions, vec!["Preços?", "Cases de IA"]);
    }

    #[test]
    fn test_split_block_in_middle() {
        let (text, suggestions) =
            split_suggestions("Before <suggestions>X</suggestions> after");
        assert_eq!(text, "Before after");
        assert_eq!(suggestions, vec!["X"]);
    }

    #[test]
    fn test_split_join_keeps_single_separator() {
        let (text, _) = split_suggestions("Line one.\n<suggestions>A</suggestions>\nLine two.");
        assert_eq!(text, "Line one.\nLine two.");
        let (text, _) = split_suggestions("a<suggestions>A</suggestions>b");
        assert_eq!(text, "ab");
        let (text, _) =
            split_suggestions("x <suggestions>A</suggestions> y <suggestions>B</suggestions> z");
        assert_eq!(text, "x y z");
    }

    #[test]
    fn test_split_multiline_block() {
        let (text, suggestions) = split_suggestions("Hi\n<suggestions>\nA|\nB\n</suggestions>\n");
        assert_eq!(text, "Hi");
        assert_eq!(suggestions, vec!["A", "B"]);
    }

    #[test]
    fn test_split_unclosed_block_is_unchanged() {
        let raw = "Hi <suggestions>A|B";
        let (text, suggestions) = split_suggestions(raw);
        assert_eq!(text, raw);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_split_only_first_block_parsed_all_stripped() {
        let (text, suggestions) = split_suggestions(
            "Hi <suggestions>A|B</suggestions> <suggestions>C</suggestions>",
        );
        assert_eq!(text, "Hi");
        assert_eq!(suggestions, vec!["A", "B"]);
    }

    // ---- extract_sources ----

    #[test]
    fn test_sources_drop_empty_uri_keep_order() {
        let chunks = vec![
            chunk(Some(""), Some("Empty")),
            chunk(Some("https://vasstos.com/ia"), Some("IA")),
        ];
        let sources = extract_sources(&chunks, Language::Pt);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].uri, "https://vasstos.com/ia");
        assert_eq!(sources[0].title, "IA");
    }

    #[test]
    fn test_sources_default_title() {
        let chunks = vec![
            chunk(Some("https://a.example"), None),
            chunk(Some("https://b.example"), Some("  ")),
        ];
        let pt = extract_sources(&chunks, Language::Pt);
        assert_eq!(pt[0].title, "Base de Conhecimento");
        assert_eq!(pt[1].title, "Base de Conhecimento");
        let en = extract_sources(&chunks, Language::En);
        assert_eq!(en[0].title, "Knowledge Base");
    }

    #[test]
    fn test_sources_skip_non_web_and_missing_uri() {
        let chunks = vec![
            GroundingChunk { web: None },
            chunk(None, Some("No uri")),
            chunk(Some("https://c.example"), Some("C")),
            chunk(Some("https://c.example"), Some("C again")),
        ];
        let sources = extract_sources(&chunks, Language::En);
        let uris: Vec<_> = sources.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(uris, vec!["https://c.example", "https://c.example"]);
    }

    // ---- parse_reply ----

    #[test]
    fn test_parse_reply_full() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "A VASSTOS atua com IA. <suggestions>Preços|Cases</suggestions>"}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "", "title": "x"}},
                    {"web": {"uri": "https://vasstos.com", "title": "VASSTOS"}}
                ]}
            }]
        }))
        .unwrap();
        let result = parse_reply(&response, Language::Pt);
        assert_eq!(result.text, "A VASSTOS atua com IA.");
        assert_eq!(result.suggestions, vec!["Preços", "Cases"]);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].title, "VASSTOS");
    }

    #[test]
    fn test_parse_reply_empty_falls_back() {
        let response = GenerateContentResponse::default();
        let result = parse_reply(&response, Language::Pt);
        assert_eq!(result.text, locale::empty_reply(Language::Pt));
        assert!(result.sources.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_parse_reply_only_suggestions_falls_back() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "<suggestions>A|B</suggestions>"}]}}]
        }))
        .unwrap();
        let result = parse_reply(&response, Language::En);
        assert_eq!(result.text, locale::empty_reply(Language::En));
        assert_eq!(result.suggestions, vec!["A", "B"]);
    }
}

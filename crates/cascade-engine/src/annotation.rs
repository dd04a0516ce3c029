//! In-band stream annotations.
//!
//! Metering metadata travels inside the streamed response text as literal
//! markers, a private wire convention between the engine and its HTTP
//! boundary:
//!
//! ```text
//! annotation := cost | tokens
//! cost       := "[COST:$" decimal "]"      e.g. [COST:$0.001200]
//! tokens     := "[TOKENS:" integer "]"     e.g. [TOKENS:42]
//! ```
//!
//! Each marker appears at most once per response, appended to or
//! interleaved within the visible text. Consumers strip them before
//! display and parse them for metering. This module is the only place
//! that knows the grammar — emitter and parser live together.

use std::sync::LazyLock;

use regex::Regex;

static COST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[COST:\$([0-9]+(?:\.[0-9]+)?)\]").unwrap());
static TOKENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[TOKENS:([0-9]+)\]").unwrap());

/// A streamed response split into its visible text and metering fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedOutput {
    pub text: String,
    pub cost: Option<f64>,
    pub tokens: Option<u64>,
}

impl AnnotatedOutput {
    /// Strip the annotation markers from `raw` and parse their values.
    pub fn parse(raw: &str) -> Self {
        let cost = COST_RE
            .captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        let tokens = TOKENS_RE
            .captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok());

        let text = COST_RE.replace_all(raw, "");
        let text = TOKENS_RE.replace_all(&text, "").into_owned();

        Self { text, cost, tokens }
    }
}

/// Render the metering markers for a completed run.
pub fn emit(cost: f64, tokens: u64) -> String {
    format!("[COST:${:.6}][TOKENS:{}]", cost, tokens)
}

/// Append the metering markers to a visible text.
pub fn annotate(text: &str, cost: f64, tokens: u64) -> String {
    format!("{}{}", text, emit(cost, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trailing_annotations() {
        let parsed = AnnotatedOutput::parse("Hello[COST:$0.0012][TOKENS:42]");
        assert_eq!(parsed.text, "Hello");
        assert_eq!(parsed.cost, Some(0.0012));
        assert_eq!(parsed.tokens, Some(42));
    }

    #[test]
    fn test_parse_interleaved_annotations() {
        let parsed = AnnotatedOutput::parse("Hel[TOKENS:7]lo there[COST:$1.5]!");
        assert_eq!(parsed.text, "Hello there!");
        assert_eq!(parsed.cost, Some(1.5));
        assert_eq!(parsed.tokens, Some(7));
    }

    #[test]
    fn test_parse_plain_text() {
        let parsed = AnnotatedOutput::parse("just text");
        assert_eq!(parsed.text, "just text");
        assert_eq!(parsed.cost, None);
        assert_eq!(parsed.tokens, None);
    }

    #[test]
    fn test_markers_must_be_literal() {
        // Near-misses stay in the visible text.
        let parsed = AnnotatedOutput::parse("[COST:0.5] [TOKENS:abc]");
        assert_eq!(parsed.text, "[COST:0.5] [TOKENS:abc]");
        assert_eq!(parsed.cost, None);
        assert_eq!(parsed.tokens, None);
    }

    #[test]
    fn test_emit_parse_round_trip() {
        let wire = annotate("The answer is 4.", 0.001234, 321);
        let parsed = AnnotatedOutput::parse(&wire);
        assert_eq!(parsed.text, "The answer is 4.");
        assert_eq!(parsed.cost, Some(0.001234));
        assert_eq!(parsed.tokens, Some(321));
    }
}

//! Sentence-aligned splitting of long text into backend-sized units

use regex::Regex;
use std::sync::OnceLock;

use crate::core::models::Unit;

/// Terminal punctuation followed by whitespace
fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").unwrap())
}

/// Byte spans of the sentences in `text`, with surrounding whitespace excluded
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = text.len() - text.trim_start().len();
    let end_of_text = text.trim_end().len();

    if start >= end_of_text {
        return spans;
    }

    for boundary in sentence_boundary().find_iter(text) {
        // The punctuation mark is ASCII, so one byte in.
        let sentence_end = boundary.start() + 1;
        if sentence_end > start {
            spans.push((start, sentence_end));
        }
        start = boundary.end();
    }

    if start < end_of_text {
        spans.push((start, end_of_text));
    }

    spans
}

/// Split `text` into units of at most `limit` characters.
///
/// Sentences are packed greedily and never split. A sentence longer than
/// `limit` becomes its own oversized unit. Each unit is an exact slice of
/// `text` running from its first sentence's start to its last sentence's
/// end; whitespace between units is dropped. Blank input yields no units.
pub fn split_into_units(text: &str, limit: usize) -> Vec<Unit> {
    let spans = sentence_spans(text);
    let mut units = Vec::new();

    // (start, end, chars) of the unit being filled
    let mut current: Option<(usize, usize, usize)> = None;
    for (start, end) in spans {
        let sentence_chars = text[start..end].chars().count();
        current = match current {
            None => Some((start, end, sentence_chars)),
            Some((unit_start, unit_end, unit_chars)) => {
                let grown = unit_chars + text[unit_end..start].chars().count() + sentence_chars;
                if grown <= limit {
                    Some((unit_start, end, grown))
                } else {
                    units.push(Unit::new(units.len(), &text[unit_start..unit_end]));
                    Some((start, end, sentence_chars))
                }
            }
        };
    }

    if let Some((unit_start, unit_end, _)) = current {
        units.push(Unit::new(units.len(), &text[unit_start..unit_end]));
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(s: &str) -> String {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_blank_input_has_no_units() {
        assert!(split_into_units("", 10).is_empty());
        assert!(split_into_units("  \n\t ", 10).is_empty());
    }

    #[test]
    fn test_packs_sentences_greedily() {
        let units = split_into_units("One. Two. Three. Four.", 10);
        let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["One. Two.", "Three.", "Four."]);
        assert_eq!(units.iter().map(|u| u.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_keeps_inner_whitespace() {
        let units = split_into_units("First line.\nSecond line!  Third?", 100);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "First line.\nSecond line!  Third?");
    }

    #[test]
    fn test_oversized_sentence_is_not_split() {
        let sentence = "a".repeat(6000);
        let units = split_into_units(&sentence, 4500);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].char_len, 6000);
    }

    #[test]
    fn test_oversized_sentence_between_small_ones() {
        let text = format!("Short. {}. Tail.", "b".repeat(50));
        let units = split_into_units(&text, 20);
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].text, "Short.");
        assert_eq!(units[1].char_len, 51);
        assert_eq!(units[2].text, "Tail.");
    }

    #[test]
    fn test_reconstructs_source_and_respects_limit() {
        let text = "The quick brown fox jumps. Over the lazy dog! Does it? \
                    Yes it does.  Again and again.\n\nNew paragraph here. End."
            .repeat(40);
        let limit = 120;
        let units = split_into_units(&text, limit);

        let joined: String = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(squash(&joined), squash(&text));
        assert!(units.iter().all(|u| !u.text.is_empty()));
        assert!(units.iter().all(|u| u.char_len <= limit));
        assert_eq!(units, split_into_units(&text, limit));
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // Each sentence is 4 chars but 7 bytes
        let text = "ééé. ààà.";
        let units = split_into_units(text, 9);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].char_len, 9);
    }

    #[test]
    fn test_gap_whitespace_counts_toward_limit() {
        // "Ab." + two spaces + "Cd." is 8 characters
        let text = "Ab.  Cd.";
        assert_eq!(split_into_units(text, 8).len(), 1);
        assert_eq!(split_into_units(text, 8)[0].char_len, 8);
        assert_eq!(split_into_units(text, 7).len(), 2);
    }

    #[test]
    fn test_many_tiny_sentences_pack_to_limit() {
        let text = "a. ".repeat(100_000);
        let units = split_into_units(&text, 4500);

        assert!(units.iter().all(|u| u.char_len <= 4500));
        assert!(units[..units.len() - 1].iter().all(|u| u.char_len >= 4497));
        let sentences: usize = units.iter().map(|u| u.text.matches("a.").count()).sum();
        assert_eq!(sentences, 100_000);
    }

    #[test]
    fn test_punctuation_without_whitespace_is_not_a_boundary() {
        let units = split_into_units("Version 1.2.3 shipped.Really.", 5);
        assert_eq!(units.len(), 1);
    }
}

//! Multiple-choice answer extraction from free-form model output.
//!
//! Rules are tried in order and the first one that decides wins:
//!
//! 1. An explicit label such as `answer: 3` or `option (2)`.
//! 2. A parenthesized digit `(k)`: the first one preceded by a concluding
//!    word, else the last one unless it introduces a step.
//! 3. The text of an option, parsed from the question, appearing in the output.
//! 4. A number after a concluding word, matched against option values or
//!    taken as a bare label.
//! 5. The option whose value occurs last in the output.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Characters inspected before a parenthesized digit for a concluding word.
const CUE_WINDOW: usize = 100;
/// Characters inspected after the last parenthesized digit for `step`.
const STEP_WINDOW: usize = 20;

/// Extracted option label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Prediction {
    /// Option 1 to 4.
    Choice(u8),
    Undetermined,
}

impl Prediction {
    /// `"1"`..`"4"`, or `"None"`.
    pub fn label(&self) -> String {
        match self {
            Prediction::Choice(k) => k.to_string(),
            Prediction::Undetermined => "None".to_string(),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Normalized option text.
#[derive(Debug, Clone, PartialEq)]
enum OptionValue {
    /// First number found in the option.
    Number(String),
    /// Lowercased option text without LaTeX markup.
    Text(String),
}

struct Marker {
    label: u8,
    start: usize,
    end: usize,
}

/// Deterministic option extractor. Construct once and reuse.
pub struct OptionExtractor {
    labeled: Regex,
    parenthesized: Regex,
    bare_marker: Regex,
    conclusion_cue: Regex,
    step_word: Regex,
    numeric_cue: Regex,
    latex_delimiter: Regex,
    latex_command_with_arg: Regex,
    latex_command: Regex,
    number: Regex,
}

impl Default for OptionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionExtractor {
    pub fn new() -> Self {
        let regex = |pattern: &str| Regex::new(pattern).expect("Invalid regex");

        Self {
            labeled: regex(r"(?i)\b(?:option|choice|ans|answer)\s*[:\-]?\s*\(?([1-4])\)?\b"),
            parenthesized: regex(r"\(\s*([1-4])\s*\)"),
            bare_marker: regex(r"([1-4])\)"),
            conclusion_cue: regex(r"(?i)(final|answer|hence|therefore|so|thus)"),
            step_word: regex(r"(?i)\b(step|step:)\b"),
            numeric_cue: regex(
                r"(?i)(?:final answer|final|final:|answer:|ans:|hence|therefore|so|thus)[^\d\n\r\-]{0,40}(-?\d+(?:\.\d+)?)",
            ),
            latex_delimiter: regex(r"\$|\\\(|\\\)|\\\[|\\\]"),
            latex_command_with_arg: regex(r"\\[a-zA-Z]+\{[^}]*\}"),
            latex_command: regex(r"\\[a-zA-Z]+"),
            number: regex(r"-?\d+(?:\.\d+)?"),
        }
    }

    /// Extract the chosen option from `text`, using the options listed in
    /// `question` for content matching.
    pub fn extract(&self, text: &str, question: &str) -> Prediction {
        if text.is_empty() {
            return Prediction::Undetermined;
        }

        if let Some(label) = self.explicit_label(text) {
            return Prediction::Choice(label);
        }
        if let Some(label) = self.parenthesized_label(text) {
            return Prediction::Choice(label);
        }

        let options = self.parse_options(question);

        if let Some(label) = self.content_match(text, &options) {
            return Prediction::Choice(label);
        }
        if let Some(label) = self.numeric_cue(text, &options) {
            return Prediction::Choice(label);
        }
        if let Some(label) = self.last_occurrence(text, &options) {
            return Prediction::Choice(label);
        }

        Prediction::Undetermined
    }

    fn explicit_label(&self, text: &str) -> Option<u8> {
        self.labeled
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
    }

    fn parenthesized_label(&self, text: &str) -> Option<u8> {
        let matches: Vec<_> = self.parenthesized.captures_iter(text).collect();

        for caps in &matches {
            let start = caps.get(0)?.start();
            if self.conclusion_cue.is_match(preceding(text, start, CUE_WINDOW)) {
                return caps[1].parse().ok();
            }
        }

        let last = matches.last()?;
        let end = last.get(0)?.end();
        if self.step_word.is_match(following(text, end, STEP_WINDOW)) {
            return None;
        }
        last[1].parse().ok()
    }

    /// Options by label. Each option's text runs from its marker to the next
    /// marker or the end of the line; a repeated label keeps the later text.
    fn parse_options(&self, question: &str) -> BTreeMap<u8, OptionValue> {
        let mut markers = self.markers(&self.parenthesized, question);
        if markers.is_empty() {
            markers = self.markers(&self.bare_marker, question);
        }

        let mut options = BTreeMap::new();
        for (i, marker) in markers.iter().enumerate() {
            let end = markers.get(i + 1).map_or(question.len(), |next| next.start);
            let raw = question[marker.end..end]
                .split(['\n', '\r'])
                .next()
                .unwrap_or_default();
            if let Some(value) = self.normalize(raw) {
                options.insert(marker.label, value);
            } else {
                options.remove(&marker.label);
            }
        }
        options
    }

    fn markers(&self, pattern: &Regex, question: &str) -> Vec<Marker> {
        pattern
            .captures_iter(question)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Marker {
                    label: caps[1].parse().ok()?,
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }

    fn normalize(&self, raw: &str) -> Option<OptionValue> {
        let s = self.latex_delimiter.replace_all(raw, "");
        let s = self.latex_command_with_arg.replace_all(&s, "");
        let s = self.latex_command.replace_all(&s, "");
        let s = s.replace(',', "");
        let s = s.trim();

        if s.is_empty() {
            return None;
        }
        Some(match self.number.find(s) {
            Some(m) => OptionValue::Number(m.as_str().to_string()),
            None => OptionValue::Text(s.to_lowercase()),
        })
    }

    fn content_match(&self, text: &str, options: &BTreeMap<u8, OptionValue>) -> Option<u8> {
        let lowered = text.to_lowercase();
        options.iter().find_map(|(label, value)| {
            let found = match value {
                OptionValue::Number(_) => value_pattern(value)?.is_match(text),
                OptionValue::Text(t) => lowered.contains(t.as_str()),
            };
            found.then_some(*label)
        })
    }

    fn numeric_cue(&self, text: &str, options: &BTreeMap<u8, OptionValue>) -> Option<u8> {
        let caps = self.numeric_cue.captures(text)?;
        let number = &caps[1];

        let matching = options.iter().find_map(|(label, value)| match value {
            OptionValue::Number(n) if n == number => Some(*label),
            _ => None,
        });

        matching.or_else(|| match number {
            "1" | "2" | "3" | "4" => number.parse().ok(),
            _ => None,
        })
    }

    /// The option whose last occurrence ends furthest right. Ties keep the
    /// lower label.
    fn last_occurrence(&self, text: &str, options: &BTreeMap<u8, OptionValue>) -> Option<u8> {
        let mut best: Option<(usize, u8)> = None;
        for (label, value) in options {
            let Some(end) = value_pattern(value)
                .and_then(|re| re.find_iter(text).last())
                .map(|m| m.end())
            else {
                continue;
            };
            if best.map_or(true, |(best_end, _)| end > best_end) {
                best = Some((end, *label));
            }
        }
        best.map(|(_, label)| label)
    }
}

/// Numbers match as whole words, text case-insensitively anywhere.
fn value_pattern(value: &OptionValue) -> Option<Regex> {
    let pattern = match value {
        OptionValue::Number(n) => format!(r"\b{}\b", regex::escape(n)),
        OptionValue::Text(t) => format!("(?i){}", regex::escape(t)),
    };
    Regex::new(&pattern).ok()
}

/// Up to `chars` characters ending at byte offset `end`.
fn preceding(text: &str, end: usize, chars: usize) -> &str {
    let start = text[..end]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map_or(0, |(i, _)| i);
    &text[start..end]
}

/// Up to `chars` characters starting at byte offset `start`.
fn following(text: &str, start: usize, chars: usize) -> &str {
    let end = text[start..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| start + i);
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTION: &str = "What is 28 squared? (1) 5 (2) 10 (3) 784 (4) 900";

    fn extract(text: &str, question: &str) -> String {
        OptionExtractor::new().extract(text, question).label()
    }

    #[test]
    fn test_parenthesized_after_cue() {
        assert_eq!(extract("The answer is (3) 784", QUESTION), "3");
    }

    #[test]
    fn test_content_match_without_label() {
        assert_eq!(extract("I think it's 784", QUESTION), "3");
    }

    #[test]
    fn test_nothing_relevant() {
        assert_eq!(extract("blah blah nothing relevant", QUESTION), "None");
        assert_eq!(extract("", QUESTION), "None");
    }

    #[test]
    fn test_explicit_label_beats_step_markers() {
        assert_eq!(
            extract("Step (1): consider x. Step (2): ... final answer option (4)", QUESTION),
            "4"
        );
        assert_eq!(extract("Answer: 2", QUESTION), "2");
    }

    #[test]
    fn test_trailing_step_marker_is_ignored() {
        assert_eq!(extract("(2) Step: add the terms", QUESTION), "None");
        assert_eq!(extract("we use (2) to get there", QUESTION), "2");
    }

    #[test]
    fn test_numeric_cue_bare_label() {
        assert_eq!(extract("Therefore 2.", QUESTION), "2");
        // 7 is neither an option value nor a label
        assert_eq!(extract("Therefore 7.", QUESTION), "None");
    }

    #[test]
    fn test_option_normalization() {
        let question = "Total cost? (1) $1,200 (2) \\(1,500\\) (3) \\text{none} 700 (4) 900";
        assert_eq!(extract("The total is 1200 dollars", question), "1");
        assert_eq!(extract("It comes to 1500.", question), "2");
        assert_eq!(extract("We get 700", question), "3");
    }

    #[test]
    fn test_text_options_and_bare_markers() {
        let question = "Which conic is x²/4 + y²/9 = 1?\n(1) parabola (2) hyperbola\n(3) ellipse (4) circle";
        assert_eq!(extract("The curve is an Ellipse.", question), "3");

        let bare = "How many apples? 1) 12 2) 15 3) 18 4) 21";
        assert_eq!(extract("We get 18 apples", bare), "3");
    }

    #[test]
    fn test_options_split_at_line_end_and_later_marker_wins() {
        let extractor = OptionExtractor::new();
        let options = extractor.parse_options("(1) 5\nnoise 99 (2) 10 (1) 6");
        assert_eq!(options.get(&1), Some(&OptionValue::Number("6".to_string())));
        assert_eq!(options.get(&2), Some(&OptionValue::Number("10".to_string())));
    }

    #[test]
    fn test_last_occurrence_ties_keep_lower_label() {
        let extractor = OptionExtractor::new();
        let mut options = BTreeMap::new();
        options.insert(1, OptionValue::Text("ab".to_string()));
        options.insert(2, OptionValue::Text("b".to_string()));
        options.insert(3, OptionValue::Number("5".to_string()));

        assert_eq!(extractor.last_occurrence("5 then AB", &options), Some(1));
        assert_eq!(extractor.last_occurrence("AB then 5", &options), Some(3));
        assert_eq!(extractor.last_occurrence("nothing", &options), None);
    }

    #[test]
    fn test_windows_are_char_based() {
        let text = "ééé(1)";
        let start = text.find('(').unwrap();
        assert_eq!(preceding(text, start, 2), "éé");
        assert_eq!(following(text, start, 2), "(1");
        assert_eq!(following(text, start, 50), "(1)");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = OptionExtractor::new();
        for text in [
            "The answer is (3) 784",
            "I think it's 784",
            "blah blah nothing relevant",
            "Therefore 2.",
        ] {
            let first = extractor.extract(text, QUESTION);
            assert_eq!(first, extractor.extract(text, QUESTION));
        }
    }
}

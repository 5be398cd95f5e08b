//! Garbled-word recovery.
//!
//! The generative service occasionally drops the leading character of common
//! CV nouns ("inancial Operations Specialist"). This is a targeted correction
//! table, not a spell-checker: it only knows the corruption shapes observed
//! in production output, and it is data — callers may substitute their own
//! table.
#![allow(dead_code)]

use regex::Regex;

use super::passes::PassOutcome;

/// A replaceable table of known corruption patterns.
pub struct CorrectionTable {
    entries: Vec<(Regex, &'static str)>,
}

impl Default for CorrectionTable {
    /// CV-vocabulary corrections for leading-letter-dropped nouns.
    fn default() -> Self {
        let patterns: &[(&str, &str)] = &[
            (r"(?i)\binancial\b", "Financial"),
            (r"(?i)\bperations\b", "Operations"),
            (r"(?i)\bccounting\b", "Accounting"),
            (r"(?i)\bdvanced\b", "Advanced"),
            (r"(?i)\biploma\b", "Diploma"),
            (r"(?i)\bmpecialist\b", "Specialist"),
            (r"(?i)\boud\b", "Cloud"),
            (r"(?i)\borkflows\b", "Workflows"),
            (r"(?i)\bnalyst\b", "Analyst"),
        ];
        Self {
            entries: patterns
                .iter()
                .map(|(p, r)| (Regex::new(p).expect("static correction pattern"), *r))
                .collect(),
        }
    }
}

impl CorrectionTable {
    /// Builds a table from caller-supplied `(pattern, replacement)` pairs.
    /// Invalid patterns are skipped rather than failing the whole table.
    pub fn from_pairs(pairs: &[(&str, &'static str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .filter_map(|(p, r)| Regex::new(p).ok().map(|re| (re, *r)))
                .collect(),
        }
    }

    /// Applies every correction, counting total replacements made.
    pub fn apply(&self, input: &str) -> PassOutcome {
        let mut text = input.to_string();
        let mut fixes = 0u32;

        for (pattern, replacement) in &self.entries {
            let count = pattern.find_iter(&text).count() as u32;
            if count > 0 {
                fixes += count;
                text = pattern.replace_all(&text, *replacement).into_owned();
            }
        }

        let warnings = if fixes > 0 {
            vec!["Garbled text detected - applied word recovery".to_string()]
        } else {
            Vec::new()
        };

        PassOutcome {
            text,
            fixes,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_letter_dropped_noun_recovered() {
        let table = CorrectionTable::default();
        let out = table.apply("inancial Operations Specialist");
        assert!(out.text.contains("Financial"), "got: {}", out.text);
        assert_eq!(out.fixes, 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_intact_words_not_rewritten() {
        let table = CorrectionTable::default();
        let input = "Financial Analyst with Advanced Diploma";
        let out = table.apply(input);
        assert_eq!(out.text, input, "intact words must not match the table");
        assert_eq!(out.fixes, 0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_multiple_corruptions_counted_individually() {
        let table = CorrectionTable::default();
        let out = table.apply("ccounting and orkflows and iploma");
        assert!(out.text.contains("Accounting"));
        assert!(out.text.contains("Workflows"));
        assert!(out.text.contains("Diploma"));
        assert_eq!(out.fixes, 3);
    }

    #[test]
    fn test_recovery_is_stable_on_second_application() {
        let table = CorrectionTable::default();
        let first = table.apply("oud-accounting workflows for an nalyst");
        let second = table.apply(&first.text);
        assert_eq!(second.text, first.text);
        assert_eq!(second.fixes, 0);
    }

    #[test]
    fn test_custom_table_replaces_default() {
        let table = CorrectionTable::from_pairs(&[(r"(?i)\bngineer\b", "Engineer")]);
        let out = table.apply("Senior ngineer, inancial systems");
        assert!(out.text.contains("Engineer"));
        // custom table knows nothing about the default vocabulary
        assert!(out.text.contains("inancial"));
        assert_eq!(out.fixes, 1);
    }
}

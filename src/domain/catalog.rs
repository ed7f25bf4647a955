//! Word catalog: the ordered list of vocabulary pairs a deployment plays
//! through, plus article parsing for the target language.
//!
//! Loaded once at startup from a `source:target` line format. A list that
//! cannot be parsed is a fatal startup condition — the game never runs on a
//! partial catalog.

use crate::domain::{DomainError, ParsedTarget, SelectionMode, WordEntry};
use rand::Rng;

/// Articles recognized at the start of a target word (case-insensitive).
const ARTICLES: [&str; 3] = ["der", "die", "das"];

#[derive(Debug)]
pub struct WordCatalog {
    entries: Vec<WordEntry>,
}

impl WordCatalog {
    /// Parse the line-oriented word list: one `source:target` pair per line,
    /// blank lines skipped. Errors name the offending line.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (source, target) = line.split_once(':').ok_or_else(|| {
                DomainError::Catalog(format!("line {}: missing ':' separator", idx + 1))
            })?;
            let source = source.trim();
            let target = target.trim();
            if source.is_empty() || target.is_empty() {
                return Err(DomainError::Catalog(format!(
                    "line {}: empty source or target word",
                    idx + 1
                )));
            }
            entries.push(WordEntry {
                source: source.to_string(),
                target: target.to_string(),
            });
        }
        if entries.is_empty() {
            return Err(DomainError::Catalog("word list contains no entries".into()));
        }
        Ok(Self { entries })
    }

    /// Pick the next word. Sequential mode reads at `cursor` and returns the
    /// advanced cursor, wrapping to 0 on exhaustion (never errors). Random
    /// mode returns a uniform pick and leaves the cursor untouched.
    pub fn next(&self, mode: SelectionMode, cursor: usize) -> (WordEntry, usize) {
        match mode {
            SelectionMode::Sequential => {
                let idx = if cursor >= self.entries.len() { 0 } else { cursor };
                (self.entries[idx].clone(), idx + 1)
            }
            SelectionMode::Random => {
                let idx = rand::thread_rng().gen_range(0..self.entries.len());
                (self.entries[idx].clone(), cursor)
            }
        }
    }

    /// Split a target word into article and root. The article must be one of
    /// `der`/`die`/`das` (any casing) followed by whitespace; otherwise the
    /// whole word is the root.
    pub fn parse_article(target: &str) -> ParsedTarget {
        let mut parts = target.split_whitespace();
        if let Some(first) = parts.next() {
            if ARTICLES.iter().any(|a| first.eq_ignore_ascii_case(a)) {
                let root = parts.collect::<Vec<_>>().join(" ");
                if !root.is_empty() {
                    return ParsedTarget {
                        article: Some(first.to_string()),
                        root,
                    };
                }
            }
        }
        ParsedTarget {
            article: None,
            root: target.trim().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(text: &str) -> WordCatalog {
        WordCatalog::parse(text).unwrap()
    }

    #[test]
    fn test_parse_skips_blank_lines_and_trims() {
        let cat = catalog("Katze: die Katze\n\n  Buch :Buch  \n");
        assert_eq!(cat.len(), 2);
        let (first, _) = cat.next(SelectionMode::Sequential, 0);
        assert_eq!(first.source, "Katze");
        assert_eq!(first.target, "die Katze");
    }

    #[test]
    fn test_parse_missing_separator_is_error() {
        let err = WordCatalog::parse("Katze die Katze").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_empty_side_is_error() {
        assert!(WordCatalog::parse(":die Katze").is_err());
        assert!(WordCatalog::parse("Katze:").is_err());
    }

    #[test]
    fn test_parse_empty_list_is_error() {
        assert!(WordCatalog::parse("\n\n").is_err());
    }

    #[test]
    fn test_sequential_wraps_to_start() {
        let cat = catalog("a:A\nb:B");
        let (w0, c1) = cat.next(SelectionMode::Sequential, 0);
        let (w1, c2) = cat.next(SelectionMode::Sequential, c1);
        assert_eq!((w0.source.as_str(), w1.source.as_str()), ("a", "b"));
        assert_eq!(c2, 2);
        // Exhausted cursor wraps instead of erroring.
        let (w2, c3) = cat.next(SelectionMode::Sequential, c2);
        assert_eq!(w2.source, "a");
        assert_eq!(c3, 1);
    }

    #[test]
    fn test_random_leaves_cursor_untouched() {
        let cat = catalog("a:A\nb:B\nc:C");
        for _ in 0..20 {
            let (entry, cursor) = cat.next(SelectionMode::Random, 7);
            assert_eq!(cursor, 7);
            assert!(["A", "B", "C"].contains(&entry.target.as_str()));
        }
    }

    #[test]
    fn test_parse_article_splits_known_articles() {
        let parsed = WordCatalog::parse_article("die Katze");
        assert_eq!(parsed.article.as_deref(), Some("die"));
        assert_eq!(parsed.root, "Katze");
        assert!(parsed.has_article());
    }

    #[test]
    fn test_parse_article_is_case_insensitive() {
        let parsed = WordCatalog::parse_article("DER Hund");
        assert_eq!(parsed.article.as_deref(), Some("DER"));
        assert_eq!(parsed.root, "Hund");
    }

    #[test]
    fn test_parse_article_without_article() {
        let parsed = WordCatalog::parse_article("Buch");
        assert_eq!(parsed.article, None);
        assert_eq!(parsed.root, "Buch");
        assert!(!parsed.has_article());
    }

    #[test]
    fn test_parse_article_bare_article_is_root() {
        // "die" alone has no remainder, so it is treated as a bare word.
        let parsed = WordCatalog::parse_article("die");
        assert_eq!(parsed.article, None);
        assert_eq!(parsed.root, "die");
    }

    #[test]
    fn test_parse_article_multiword_root() {
        let parsed = WordCatalog::parse_article("das  kalte   Wasser");
        assert_eq!(parsed.article.as_deref(), Some("das"));
        assert_eq!(parsed.root, "kalte Wasser");
    }
}

use chrono::{DateTime, Utc};

pub(crate) mod db;
mod file;
pub(crate) mod remote;

pub use db::DbWordSource;
pub use file::{expand_dict_paths, read_dict_file};
pub use remote::RemoteWordSource;

/// A normalized dictionary word, optionally tagged with the source update
/// timestamp that selected it into an incremental window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub text: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WordRecord {
    pub fn new(text: String) -> Self {
        Self {
            text,
            updated_at: None,
        }
    }
}

/// Trim and case-fold a raw word; blank input yields `None`.
pub fn normalize_word(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Parse one-word-per-line text: strip a leading BOM, skip blank lines,
/// normalize each word.
pub(crate) fn parse_word_lines(body: &str) -> Vec<WordRecord> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    body.lines()
        .filter_map(normalize_word)
        .map(WordRecord::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_skips_blanks() {
        assert_eq!(normalize_word("  北京 "), Some("北京".to_string()));
        assert_eq!(normalize_word("GB2312"), Some("gb2312".to_string()));
        assert_eq!(normalize_word("   "), None);
        assert_eq!(normalize_word(""), None);
    }

    #[test]
    fn parses_word_lines_with_bom() {
        let words = parse_word_lines("\u{feff}北京\n\n  大学  \nABC\n");
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["北京", "大学", "abc"]);
    }
}

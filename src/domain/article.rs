use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4})\b").expect("year pattern is valid"));

/// A single bibliographic record parsed from a tagged export.
///
/// Only `relevancy_score` changes after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub authors: Vec<String>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Raw `%D` value, not validated as a calendar year.
    pub year: Option<String>,
    pub doi_or_url: Option<String>,
    pub relevancy_score: Option<u8>,
}

impl ArticleRecord {
    /// True when every bibliographic field is missing or blank.
    pub fn is_empty(&self) -> bool {
        self.authors.iter().all(|author| author.trim().is_empty())
            && self.title.trim().is_empty()
            && self.abstract_text.trim().is_empty()
            && self.year.as_deref().is_none_or(|year| year.trim().is_empty())
            && self
                .doi_or_url
                .as_deref()
                .is_none_or(|doi| doi.trim().is_empty())
    }

    /// Authors joined the way they are exported.
    pub fn joined_authors(&self) -> String {
        self.authors.join("; ")
    }

    /// First four-digit number in the raw year value, if any.
    ///
    /// Exports often carry full dates (`2019/05/01`) or prose in `%D`.
    pub fn publication_year(&self) -> Option<u16> {
        let raw = self.year.as_deref()?;
        YEAR_RE
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::ArticleRecord;

    #[test]
    fn default_record_is_empty() {
        assert!(ArticleRecord::default().is_empty());

        let record = ArticleRecord {
            authors: vec![String::new()],
            year: Some(String::new()),
            doi_or_url: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(record.is_empty());

        let record = ArticleRecord {
            year: Some("2020".to_string()),
            ..Default::default()
        };
        assert!(!record.is_empty());
    }

    #[test]
    fn publication_year_is_extracted_from_dates() {
        let record = ArticleRecord {
            year: Some("2019/05/01".to_string()),
            ..Default::default()
        };
        assert_eq!(record.publication_year(), Some(2019));

        let record = ArticleRecord {
            year: Some("in press".to_string()),
            ..Default::default()
        };
        assert_eq!(record.publication_year(), None);
    }

    #[test]
    fn authors_are_joined_with_semicolons() {
        let record = ArticleRecord {
            authors: vec!["Smith, J.".to_string(), "Doe, A.".to_string()],
            ..Default::default()
        };
        assert_eq!(record.joined_authors(), "Smith, J.; Doe, A.");
    }
}

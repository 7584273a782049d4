//! Parser for tagged bibliographic exports (`%0`, `%A`, `%T`, ... lines).
//!
//! Each `%0` line starts a record; fields accumulate until the next `%0` or
//! end of input. Unknown tags are skipped, never fatal.

use crate::domain::article::ArticleRecord;
use crate::errors::{ScreeningError, ScreeningResult};
use crate::repository::TextSource;

/// Records parsed from one export, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedExport {
    pub records: Vec<ArticleRecord>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    RecordStart,
    Author,
    Title,
    Date,
    Reference,
    Abstract,
    Other(char),
}

impl Tag {
    fn from_char(c: char) -> Self {
        match c {
            '0' => Tag::RecordStart,
            'A' => Tag::Author,
            'T' => Tag::Title,
            'D' => Tag::Date,
            'R' => Tag::Reference,
            'X' => Tag::Abstract,
            other => Tag::Other(other),
        }
    }
}

/// Splits `%X value` into its tag and trimmed value.
///
/// A tag is `%` plus one character, followed by a space or end of line.
fn split_tag(line: &str) -> Option<(Tag, &str)> {
    let rest = line.strip_prefix('%')?;
    let mut chars = rest.chars();
    let tag = chars.next()?;
    let value = chars.as_str();
    if !value.is_empty() && !value.starts_with(' ') {
        return None;
    }
    Some((Tag::from_char(tag), value.trim()))
}

#[derive(Default)]
struct RecordBuilder {
    records: Vec<ArticleRecord>,
    warnings: Vec<String>,
    current: Option<ArticleRecord>,
    in_abstract: bool,
}

impl RecordBuilder {
    fn finalize(&mut self) {
        self.in_abstract = false;
        if let Some(record) = self.current.take()
            && !record.is_empty()
        {
            if let Some(raw) = record.year.as_deref()
                && record.publication_year().is_none()
            {
                self.warnings.push(format!(
                    "record {}: %D value {raw:?} has no four-digit year",
                    self.records.len() + 1
                ));
            }
            self.records.push(record);
        }
    }

    fn current(&mut self, line_no: usize) -> &mut ArticleRecord {
        if self.current.is_none() {
            self.warnings.push(format!(
                "line {line_no}: field before the first %0 marker, starting an implicit record"
            ));
        }
        self.current.get_or_insert_with(ArticleRecord::default)
    }

    fn tagged(&mut self, line_no: usize, tag: Tag, value: &str) {
        if tag == Tag::RecordStart {
            self.finalize();
            self.current = Some(ArticleRecord::default());
            return;
        }
        if let Tag::Other(c) = tag {
            log::debug!("Skipping unknown tag %{c} on line {line_no}");
            self.in_abstract = false;
            return;
        }

        let record = self.current(line_no);
        match tag {
            Tag::Author => record.authors.push(value.to_string()),
            Tag::Title => record.title = value.to_string(),
            Tag::Date => record.year = Some(value.to_string()),
            Tag::Reference => record.doi_or_url = Some(value.to_string()),
            Tag::Abstract => {
                if !record.abstract_text.is_empty() && !value.is_empty() {
                    record.abstract_text.push('\n');
                }
                record.abstract_text.push_str(value);
            }
            Tag::RecordStart | Tag::Other(_) => {}
        }
        self.in_abstract = tag == Tag::Abstract;
    }

    fn untagged(&mut self, line: &str) {
        if !self.in_abstract {
            return;
        }
        let segment = line.trim();
        if segment.is_empty() {
            return;
        }
        if let Some(record) = self.current.as_mut() {
            if !record.abstract_text.is_empty() {
                record.abstract_text.push('\n');
            }
            record.abstract_text.push_str(segment);
        }
    }
}

/// Parses tagged lines into records.
///
/// Returns [`ScreeningError::NoRecordsFound`] when nothing was finalized.
pub fn parse<I, S>(lines: I) -> ScreeningResult<ParsedExport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = RecordBuilder::default();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim_end();
        match split_tag(line) {
            Some((tag, value)) => builder.tagged(idx + 1, tag, value),
            None => builder.untagged(line),
        }
    }
    builder.finalize();

    if builder.records.is_empty() {
        return Err(ScreeningError::NoRecordsFound);
    }

    Ok(ParsedExport {
        records: builder.records,
        warnings: builder.warnings,
    })
}

/// Reads the source and parses it, keeping read failures and empty
/// exports distinguishable.
pub fn load_records<S>(source: &S) -> ScreeningResult<ParsedExport>
where
    S: TextSource + ?Sized,
{
    let lines = source.read_text_source()?;
    let parsed = parse(&lines)?;
    log::info!(
        "Parsed {} records ({} warnings)",
        parsed.records.len(),
        parsed.warnings.len()
    );
    for warning in &parsed.warnings {
        log::warn!("{warning}");
    }
    Ok(parsed)
}

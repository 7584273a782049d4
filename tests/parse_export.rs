use std::io::Write;

use sysreview_screener::errors::ScreeningError;
use sysreview_screener::parser::load_records;
use sysreview_screener::repository::{CsvRecordWriter, FileTextSource, RecordWriter};

#[test]
fn empty_export_is_no_records_not_read_failure() {
    let file = tempfile::NamedTempFile::new().expect("temp file");

    let result = load_records(&FileTextSource::new(file.path()));

    assert!(matches!(result, Err(ScreeningError::NoRecordsFound)));
}

#[test]
fn missing_export_is_read_failure() {
    let dir = tempfile::tempdir().expect("temp dir");

    let result = load_records(&FileTextSource::new(dir.path().join("exportlist.txt")));

    assert!(matches!(result, Err(ScreeningError::ReadFailure { .. })));
}

#[test]
fn export_round_trips_to_csv_in_source_order() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "%0 Journal Article\r\n%A Ng, Lee\r\n%T Alpha\r\n%X One\r\ntwo\r\n\
         %0 Journal Article\r\n%T Beta\r\n%9 Unknown tag\r\n\
         %0 Journal Article\r\n%T Gamma\r\n%D 2018 Mar\r\n"
    )
    .expect("write");

    let parsed = load_records(&FileTextSource::new(file.path())).expect("export parses");
    let titles: Vec<_> = parsed.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(parsed.records[0].abstract_text, "One\ntwo");
    assert_eq!(parsed.records[2].publication_year(), Some(2018));

    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("parsed.csv");
    CsvRecordWriter::new(&out)
        .write_rows(&parsed.records)
        .expect("csv written");

    let mut reader = csv::Reader::from_path(&out).expect("csv readable");
    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("rows readable");
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[2][1], "Gamma");
    assert_eq!(&rows[2][3], "2018 Mar");
    assert_eq!(&rows[0][5], "");
}

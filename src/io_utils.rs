//! I/O helpers for reading uploads and writing report output.
//!
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Reader construction**: uploads are always comma-separated and headerless.
//! - **Output**: reports go to a file or to stdout when no path (or `-`) is given.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const UPLOAD_DELIMITER: u8 = b',';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Builds a reader that treats every line, including the first, as data.
///
/// Rows must all have the same width; a ragged row surfaces as a
/// `csv::ErrorKind::UnequalLengths` error from the reader.
pub fn open_headerless_reader<R>(reader: R) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(UPLOAD_DELIMITER)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

/// Drops a leading byte order mark when it matches `encoding`. Only the start
/// of the upload may carry one.
pub fn strip_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, len)) if bom_encoding == encoding => &bytes[len..],
        _ => bytes,
    }
}

/// Decodes one field; `None` when the bytes are not valid in `encoding`.
pub fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading upload from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout().lock()),
    };
    writer
        .write_all(contents.as_bytes())
        .context("Writing report output")?;
    if !contents.ends_with('\n') {
        writer.write_all(b"\n").context("Writing report output")?;
    }
    writer.flush().context("Flushing report output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(
            resolve_encoding(Some("latin1")).unwrap().name(),
            "windows-1252"
        );
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn decode_field_flags_invalid_bytes() {
        assert_eq!(decode_field(b"Sales", UTF_8).as_deref(), Some("Sales"));
        assert_eq!(decode_field(&[0xff, 0xfe, 0x41], UTF_8), None);
    }

    #[test]
    fn decode_field_never_sniffs_a_bom() {
        assert_eq!(decode_field(b"\xff\xfeA\x00B\x00", UTF_8), None);
        assert_eq!(
            decode_field(b"\xef\xbb\xbfSales", UTF_8).as_deref(),
            Some("\u{feff}Sales")
        );
    }

    #[test]
    fn strip_bom_only_removes_a_matching_mark() {
        assert_eq!(strip_bom(b"\xef\xbb\xbf1,Sales", UTF_8), b"1,Sales");
        assert_eq!(strip_bom(b"\xff\xfe1,Sales", UTF_8), b"\xff\xfe1,Sales");
        assert_eq!(strip_bom(b"1,Sales", UTF_8), b"1,Sales");
    }

    #[test]
    fn headerless_reader_keeps_first_row_as_data() {
        let mut reader = open_headerless_reader("1,Sales\n2,Ops\n".as_bytes());
        let rows = reader.byte_records().count();
        assert_eq!(rows, 2);
    }
}

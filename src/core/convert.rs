//! Purpose: Turn a CSV metadata table into a `RecordMap` under a column profile.
//! Exports: `ConvertConfig`, `ConvertOutcome`, `DEFAULT_SKIP`, `convert`, `convert_path`.
//! Role: The conversion engine behind both executables; pure apart from reading its input.
//! Invariants: The first `skip` rows are discarded without being interpreted.
//! Invariants: Rows narrower than the profile are fatal; rows with an empty trimmed key are dropped.
//! Invariants: A blank line is a zero-field row; it counts toward `skip` and is fatal after it.
//! Invariants: Tag tokens are split on ',' with empty tokens removed and are never trimmed.
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::profile::{Column, Profile};
use crate::core::record::{Record, RecordMap};

pub const DEFAULT_SKIP: u64 = 1;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConvertConfig {
    pub profile: Profile,
    /// Leading rows to discard (headers).
    pub skip: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            skip: DEFAULT_SKIP,
        }
    }
}

/// Row accounting for one conversion run.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ConvertOutcome {
    pub rows_total: u64,
    pub skipped: u64,
    pub empty_keys: u64,
    pub overwritten: u64,
}

/// Named access to the fields of one data row.
struct Row<'a> {
    fields: &'a StringRecord,
    profile: Profile,
}

impl<'a> Row<'a> {
    fn field(&self, column: Column) -> Option<&'a str> {
        self.profile
            .index_of(column)
            .and_then(|index| self.fields.get(index))
    }

    fn trimmed(&self, column: Column) -> Option<String> {
        self.field(column).map(|value| trim_field(value).to_string())
    }
}

fn open_error(err: io::Error, path: &Path) -> Error {
    let kind = match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    };
    Error::new(kind)
        .with_message("failed to open csv")
        .with_path(path)
        .with_source(err)
}

fn read_error(err: csv::Error, row: u64) -> Error {
    if err.is_io_error() {
        return Error::new(ErrorKind::Io)
            .with_message("failed to read csv")
            .with_row(row)
            .with_source(err);
    }
    Error::new(ErrorKind::Parse)
        .with_message("malformed csv record")
        .with_row(row)
        .with_source(err)
}

fn shape_error(found: usize, profile: Profile, row: u64) -> Error {
    Error::new(ErrorKind::Shape)
        .with_message(format!(
            "row has {found} field(s), expected at least {} ({})",
            profile.width(),
            profile.column_list()
        ))
        .with_row(row)
}

/// Whitespace as stripped from fields: Unicode White_Space plus the
/// information separators U+001C..=U+001F.
fn is_field_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn trim_field(value: &str) -> &str {
    value.trim_matches(is_field_space)
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count the empty lines starting at `offset`, which must sit on a record boundary.
///
/// The csv reader discards these bytes silently; each of them is still a row.
/// `\r\n`, `\n` and `\r` each end one line. A `\n` that completes the `\r\n`
/// terminator of the previous record is not a line of its own.
fn blank_lines_at(data: &[u8], offset: usize) -> u64 {
    let mut pos = offset;
    if pos > 0 && data.get(pos - 1) == Some(&b'\r') && data.get(pos) == Some(&b'\n') {
        pos += 1;
    }
    let mut lines = 0u64;
    while let Some(&byte) = data.get(pos) {
        match byte {
            b'\r' if data.get(pos + 1) == Some(&b'\n') => pos += 2,
            b'\r' | b'\n' => pos += 1,
            _ => break,
        }
        lines += 1;
    }
    lines
}

/// Convert the file at `path`. Errors carry the path.
pub fn convert_path(
    path: &Path,
    config: ConvertConfig,
) -> Result<(RecordMap, ConvertOutcome), Error> {
    let file = File::open(path).map_err(|err| open_error(err, path))?;
    convert(file, config).map_err(|err| err.with_path(path))
}

pub fn convert<R: Read>(
    mut reader: R,
    config: ConvertConfig,
) -> Result<(RecordMap, ConvertOutcome), Error> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read csv")
            .with_source(err)
    })?;

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(data.as_slice());

    let width = config.profile.width();
    let mut records = RecordMap::new();
    let mut outcome = ConvertOutcome::default();
    let mut fields = StringRecord::new();
    let mut index = 0u64;

    loop {
        // Blank lines before the next record are zero-field rows.
        let boundary = usize::try_from(csv_reader.position().byte()).unwrap_or(data.len());
        for _ in 0..blank_lines_at(&data, boundary) {
            let row_index = index;
            index += 1;
            outcome.rows_total += 1;
            if row_index < config.skip {
                debug!(row = row_index, "skipping leading blank line");
                outcome.skipped += 1;
                continue;
            }
            return Err(shape_error(0, config.profile, row_index));
        }

        let more = csv_reader
            .read_record(&mut fields)
            .map_err(|err| read_error(err, index))?;
        if !more {
            break;
        }
        let row_index = index;
        index += 1;
        outcome.rows_total += 1;

        if row_index < config.skip {
            debug!(row = row_index, "skipping leading row");
            outcome.skipped += 1;
            continue;
        }

        if fields.len() < width {
            return Err(shape_error(fields.len(), config.profile, row_index));
        }

        let row = Row {
            fields: &fields,
            profile: config.profile,
        };
        let key = row.trimmed(Column::Key).unwrap_or_default();
        if key.is_empty() {
            debug!(row = row_index, "skipping row with empty key");
            outcome.empty_keys += 1;
            continue;
        }

        let record = Record {
            docs: row.trimmed(Column::Docs),
            info: row.trimmed(Column::Info).unwrap_or_default(),
            repo: row.trimmed(Column::Repo),
            tags: row.field(Column::Tags).map(split_tags).unwrap_or_default(),
        };
        if records.insert(key.as_str(), record).is_some() {
            debug!(row = row_index, key = %key, "overwriting duplicate key");
            outcome.overwritten += 1;
        }
    }

    Ok((records, outcome))
}

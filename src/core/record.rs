//! Purpose: Keyed metadata records and their canonical JSON form.
//! Exports: `Record`, `RecordMap`.
//! Role: Output model of the converter; also read back by tools that enrich names with metadata.
//! Invariants: JSON output is sorted at every level, indented by 4 spaces, non-ASCII kept literal.
//! Invariants: Rendering is a pure function of the map; equal maps render byte-identical.
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::core::error::{Error, ErrorKind};

const INDENT: &[u8] = b"    ";

/// Metadata for one key.
///
/// Fields are declared in alphabetical order so serialized records come out sorted.
/// `docs` and `repo` are present only for the wide profile.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    pub info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Key to record mapping, iterated and serialized in key order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordMap {
    records: BTreeMap<String, Record>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the record previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, record: Record) -> Option<Record> {
        self.records.insert(key.into(), record)
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Record> {
        self.records.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Find the record whose key is the longest prefix of `name`.
    pub fn best_match(&self, name: &str) -> Option<(&str, &Record)> {
        self.records
            .iter()
            .filter(|(key, _)| name.starts_with(key.as_str()))
            .min_by_key(|(key, _)| name.len() - key.len())
            .map(|(key, record)| (key.as_str(), record))
    }

    /// Render the canonical JSON document (no trailing newline).
    pub fn to_json_string(&self) -> Result<String, Error> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode records as json")
                .with_source(err)
        })?;
        String::from_utf8(buf).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("json encoder produced invalid utf-8")
                .with_source(err)
        })
    }

    /// Read one or more concatenated documents produced by `to_json_string`.
    ///
    /// Documents are merged in order; a key seen again replaces the earlier record.
    /// Empty input yields an empty map.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut merged = Self::new();
        let documents = serde_json::Deserializer::from_reader(reader).into_iter::<RecordMap>();
        for document in documents {
            let document = document.map_err(|err| {
                Error::new(ErrorKind::Parse)
                    .with_message("invalid metadata json")
                    .with_source(err)
            })?;
            merged.records.extend(document.records);
        }
        Ok(merged)
    }
}

impl<'a> IntoIterator for &'a RecordMap {
    type Item = (&'a String, &'a Record);
    type IntoIter = btree_map::Iter<'a, String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

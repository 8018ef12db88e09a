//! Purpose: Describe the supported column layouts of a metadata table.
//! Exports: `Profile`, `Column`.
//! Role: Fixed, named schema per profile; the converter reads fields through it.
//! Invariants: `key` is always the first column and `tags` always the last consumed one.
//! Invariants: Columns past `Profile::width` are never read.

/// A named column of the input table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Column {
    Key,
    Info,
    Docs,
    Repo,
    Tags,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Key => "key",
            Column::Info => "info",
            Column::Docs => "docs",
            Column::Repo => "repo",
            Column::Tags => "tags",
        }
    }
}

const NARROW_COLUMNS: &[Column] = &[Column::Key, Column::Info, Column::Tags];
const WIDE_COLUMNS: &[Column] = &[
    Column::Key,
    Column::Info,
    Column::Docs,
    Column::Repo,
    Column::Tags,
];

/// Column profile selecting which leading columns are consumed and the record shape.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Profile {
    /// `key, info, tags`
    #[default]
    Narrow,
    /// `key, info, docs, repo, tags`
    Wide,
}

impl Profile {
    pub fn columns(self) -> &'static [Column] {
        match self {
            Profile::Narrow => NARROW_COLUMNS,
            Profile::Wide => WIDE_COLUMNS,
        }
    }

    /// Minimum number of fields a data row must carry.
    pub fn width(self) -> usize {
        self.columns().len()
    }

    /// Position of `column` within a row, or `None` when the profile lacks it.
    pub fn index_of(self, column: Column) -> Option<usize> {
        self.columns().iter().position(|candidate| *candidate == column)
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::Narrow => "narrow",
            Profile::Wide => "wide",
        }
    }

    /// Comma-joined column names, as shown in help text and diagnostics.
    pub fn column_list(self) -> String {
        self.columns()
            .iter()
            .map(|column| column.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

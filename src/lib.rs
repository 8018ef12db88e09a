//! Purpose: Library crate behind the `csv2meta` and `csv2meta-wide` executables.
//! Exports: `core` (profiles, conversion, records, errors) and `cli` (shared front end).
//! Role: Converts CSV metadata tables into sorted, keyed JSON maps.
//! Invariants: Conversion is one routine parameterized by `core::profile::Profile`.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod cli;
pub mod core;

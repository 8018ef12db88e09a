//! Purpose: `csv2meta` entry point: convert `key, info, tags` tables.
//! Role: Binds the narrow profile and hands off to the shared CLI.
use csv2meta::cli;
use csv2meta::core::profile::Profile;

fn main() {
    cli::main(Profile::Narrow, "csv2meta");
}

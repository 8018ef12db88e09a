//! Purpose: `csv2meta-wide` entry point: convert `key, info, docs, repo, tags` tables.
//! Role: Binds the wide profile and hands off to the shared CLI.
use csv2meta::cli;
use csv2meta::core::profile::Profile;

fn main() {
    cli::main(Profile::Wide, "csv2meta-wide");
}

// Core modules implementing profiles, conversion, record output, and error modeling.
pub mod convert;
pub mod error;
pub mod profile;
pub mod record;

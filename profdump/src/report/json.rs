//! JSON rendering of a [`Report`]
//!
//! The document is the serde form of the report tree. Sections carry a
//! `"kind"` tag so consumers can tell rendered, skipped and failed units
//! apart without parsing text.

use std::io::{self, Write};

use super::Report;

/// Write `report` as one pretty-printed JSON document followed by a newline
///
/// # Errors
/// Returns an error if serialization or writing fails
pub fn write_json<W: Write>(report: &Report, mut writer: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()
}

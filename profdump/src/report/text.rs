//! Plain-text rendering of a [`Report`]
//!
//! Each resource, profile and sample is wrapped in begin/end delimiter lines
//! so a long dump can be scanned by eye:
//!
//! ```text
//! --------------- New Resource Profile --------------
//!   container.id: 3f2a
//! ------------------- New Profile -------------------
//!   ProfileID: 0102...
//!   SampleType: cpu
//! ------------------- New Sample --------------------
//!   Timestamp[0]: 1000 (1970-01-01 00:00:00.000001 UTC)
//! Instrumentation: go, Function: main, File: main.go, Line: 10, Column: 2
//! ------------------- End Sample --------------------
//! ------------------- End Profile -------------------
//! -------------- End Resource Profile ---------------
//! ```

use std::io::{self, Write};

use super::{Attribute, Frame, ProfileSection, RenderedProfile, Report, ResourceSection, SampleSection, SkipReason};
use crate::domain::{Duration, Timestamp};

const RESOURCE_BEGIN: &str = "--------------- New Resource Profile --------------";
const RESOURCE_END: &str = "-------------- End Resource Profile ---------------";
const PROFILE_BEGIN: &str = "------------------- New Profile -------------------";
const PROFILE_END: &str = "------------------- End Profile -------------------";
const SAMPLE_BEGIN: &str = "------------------- New Sample --------------------";
const SAMPLE_END: &str = "------------------- End Sample --------------------";
const PROFILE_ATTRIBUTES_RULE: &str = "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~";
const SAMPLE_ATTRIBUTES_RULE: &str = "---------------------------------------------------";
const STATUS_INDENT: &str = "              ";

/// Shown in place of a mapping filename for locations without a mapping
pub const UNKNOWN_MAPPING: &str = "<unknown>";

/// Write `report` as sectioned plain text
///
/// # Errors
/// Returns an error if writing to `writer` fails
pub fn write_text<W: Write>(report: &Report, mut writer: W) -> io::Result<()> {
    for resource in &report.resources {
        write_resource(&mut writer, resource)?;
    }
    writer.flush()
}

/// Render `report` to a string
pub fn to_text(report: &Report) -> String {
    let mut out = Vec::new();
    write_text(report, &mut out).map_or_else(
        |e| format!("<report could not be formatted: {e}>"),
        |()| String::from_utf8_lossy(&out).into_owned(),
    )
}

fn write_resource<W: Write>(w: &mut W, resource: &ResourceSection) -> io::Result<()> {
    writeln!(w, "{RESOURCE_BEGIN}")?;
    match resource {
        ResourceSection::Skipped { reason } => {
            let reason = match reason {
                SkipReason::NoContainerId => "no container.id",
            };
            writeln!(w, "{STATUS_INDENT}SKIPPED ({reason})")?;
        }
        ResourceSection::Rendered { attributes, scopes } => {
            if let Some(attributes) = attributes {
                write_attributes(w, attributes)?;
            }
            for scope in scopes {
                if !scope.name.is_empty() {
                    writeln!(w, "  Scope: {} {}", scope.name, scope.version)?;
                }
                for profile in &scope.profiles {
                    write_profile(w, profile)?;
                }
            }
        }
    }
    writeln!(w, "{RESOURCE_END}")?;
    writeln!(w)
}

fn write_profile<W: Write>(w: &mut W, profile: &ProfileSection) -> io::Result<()> {
    writeln!(w, "{PROFILE_BEGIN}")?;
    match profile {
        ProfileSection::Skipped { sample_type } => {
            writeln!(w, "{STATUS_INDENT}SKIPPED (sample type {sample_type:?})")?;
        }
        ProfileSection::Failed { error } => {
            writeln!(w, "{STATUS_INDENT}ERROR: {error}")?;
        }
        ProfileSection::Rendered(profile) => write_rendered_profile(w, profile)?,
    }
    writeln!(w, "{PROFILE_END}")
}

fn write_rendered_profile<W: Write>(w: &mut W, profile: &RenderedProfile) -> io::Result<()> {
    writeln!(w, "  ProfileID: {}", profile.profile_id)?;
    writeln!(w, "  Time: {}", Timestamp(profile.time_unix_nano))?;
    writeln!(w, "  Duration: {}", Duration(profile.duration_nano))?;
    writeln!(w, "  PeriodType: [{}, {}]", profile.period_type.value_type, profile.period_type.unit)?;
    writeln!(w, "  Period: {}", profile.period)?;
    writeln!(w, "  Dropped attributes count: {}", profile.dropped_attributes_count)?;
    writeln!(w, "  SampleType: {}", profile.sample_type.value_type)?;
    if !profile.original_payload_format.is_empty() {
        writeln!(w, "  OriginalPayloadFormat: {}", profile.original_payload_format)?;
    }

    if let Some(attributes) = profile.attributes.as_deref().filter(|a| !a.is_empty()) {
        write_attributes(w, attributes)?;
        writeln!(w, "{PROFILE_ATTRIBUTES_RULE}")?;
    }

    for sample in &profile.samples {
        write_sample(w, sample)?;
    }
    Ok(())
}

fn write_sample<W: Write>(w: &mut W, sample: &SampleSection) -> io::Result<()> {
    writeln!(w, "{SAMPLE_BEGIN}")?;

    for (i, &ts) in sample.timestamps_unix_nano.iter().enumerate() {
        writeln!(w, "  Timestamp[{i}]: {ts} ({})", Timestamp(ts))?;
    }

    if !sample.values.is_empty() {
        let values: Vec<String> = sample.values.iter().map(ToString::to_string).collect();
        writeln!(w, "  Values: [{}]", values.join(", "))?;
    }

    if let Some(link) = &sample.link {
        writeln!(w, "  Link: trace_id={}, span_id={}", link.trace_id, link.span_id)?;
    }

    if let Some(attributes) = &sample.attributes {
        write_attributes(w, attributes)?;
        writeln!(w, "{SAMPLE_ATTRIBUTES_RULE}")?;
    }

    for frame in sample.frames.iter().flatten() {
        write_frame(w, frame)?;
    }

    writeln!(w, "{SAMPLE_END}")
}

fn write_frame<W: Write>(w: &mut W, frame: &Frame) -> io::Result<()> {
    match frame {
        Frame::Symbolized { frame_type, function, file, line, column } => writeln!(
            w,
            "Instrumentation: {frame_type}, Function: {function}, File: {file}, Line: {line}, Column: {column}"
        ),
        Frame::Unsymbolized { frame_type, address, mapping } => writeln!(
            w,
            "Instrumentation: {frame_type}: Function: 0x{address:016x}, File: {}",
            mapping.as_deref().unwrap_or(UNKNOWN_MAPPING)
        ),
    }
}

fn write_attributes<W: Write>(w: &mut W, attributes: &[Attribute]) -> io::Result<()> {
    for Attribute { key, value } in attributes {
        writeln!(w, "  {key}: {value}")?;
    }
    Ok(())
}

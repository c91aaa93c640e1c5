//! Structured report model and its formatters
//!
//! The renderer produces a [`Report`]: a tree of sections mirroring the
//! request (resource → scope → profile → sample → frame), with every index
//! already resolved to text. Formatters consume the tree without any access
//! to the dictionary:
//!
//! - [`text`]: the human-oriented, delimiter-sectioned reference rendering
//! - [`json`]: the same tree as a JSON document
//!
//! Optional collections use `None` for "export disabled" and an empty vector
//! for "exported, but there was nothing".

pub mod json;
pub mod text;

use serde::Serialize;
use std::io::{self, Write};

/// Output format for a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Sectioned plain text
    #[default]
    Text,
    /// One pretty-printed JSON document per request
    Json,
}

/// Write a report in the given format
///
/// # Errors
/// Returns an error if writing to `writer` fails
pub fn write_report<W: Write>(report: &Report, format: OutputFormat, writer: W) -> io::Result<()> {
    match format {
        OutputFormat::Text => text::write_text(report, writer),
        OutputFormat::Json => json::write_json(report, writer),
    }
}

/// Rendered form of one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub resources: Vec<ResourceSection>,
}

impl Report {
    /// All profile sections, in report order
    pub fn profiles(&self) -> impl Iterator<Item = &ProfileSection> {
        self.resources
            .iter()
            .filter_map(|resource| match resource {
                ResourceSection::Rendered { scopes, .. } => Some(scopes),
                ResourceSection::Skipped { .. } => None,
            })
            .flatten()
            .flat_map(|scope| scope.profiles.iter())
    }

    /// All sample sections of all rendered profiles, in report order
    pub fn samples(&self) -> impl Iterator<Item = &SampleSection> {
        self.profiles()
            .filter_map(|profile| match profile {
                ProfileSection::Rendered(rendered) => Some(rendered.samples.iter()),
                _ => None,
            })
            .flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Container-id gate is on and the resource has no usable `container.id`
    NoContainerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSection {
    Rendered {
        #[serde(skip_serializing_if = "Option::is_none")]
        attributes: Option<Vec<Attribute>>,
        scopes: Vec<ScopeSection>,
    },
    Skipped {
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSection {
    pub name: String,
    pub version: String,
    pub profiles: Vec<ProfileSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileSection {
    Rendered(RenderedProfile),
    /// Sample type not admitted by the filter
    Skipped { sample_type: String },
    /// A table index did not resolve; nothing below this profile was rendered
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedProfile {
    /// 32 hex digits
    pub profile_id: String,
    pub time_unix_nano: u64,
    pub duration_nano: u64,
    pub sample_type: ValueTypeSection,
    pub period_type: ValueTypeSection,
    pub period: i64,
    pub dropped_attributes_count: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub original_payload_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
    pub samples: Vec<SampleSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueTypeSection {
    #[serde(rename = "type")]
    pub value_type: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSection {
    pub timestamps_unix_nano: Vec<u64>,
    pub values: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<Frame>>,
}

/// Trace context the sample was taken under, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSection {
    pub trace_id: String,
    pub span_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// One entry of a rendered stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// One line record of a symbolized location
    Symbolized { frame_type: String, function: String, file: String, line: i64, column: i64 },
    /// A location without line records
    Unsymbolized {
        frame_type: String,
        address: u64,
        /// Filename of the location's mapping; `None` when it has no mapping
        mapping: Option<String>,
    },
}

impl Frame {
    pub fn frame_type(&self) -> &str {
        match self {
            Frame::Symbolized { frame_type, .. } | Frame::Unsymbolized { frame_type, .. } => frame_type,
        }
    }
}

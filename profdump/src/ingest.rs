//! Ingestion boundary: wire bytes in, [`Report`] out.
//!
//! [`decode_request`] turns a submission body into an
//! [`ExportProfilesServiceRequest`]; [`render`] checks the request has the
//! tables every profile needs and hands it to the [`Renderer`]. Both are
//! synchronous and do no I/O beyond reading the given buffer.

use flate2::read::GzDecoder;
use log::debug;
use profdump_common::proto::{ExportProfilesServiceRequest, ProfilesDictionary};
use profdump_common::Resolver;
use prost::Message;
use std::io::Read;

use crate::config::RenderConfig;
use crate::domain::DecodeError;
use crate::renderer::Renderer;
use crate::report::Report;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Largest request accepted after gunzipping
pub const MAX_DECOMPRESSED_BYTES: u64 = 64 * 1024 * 1024;

/// Decode a submission body, gunzipping it first if it starts with the gzip magic.
///
/// A protobuf message can never start with `0x1f` (wire type 7 does not
/// exist), so the sniff is unambiguous.
///
/// # Errors
/// Returns [`DecodeError`] if decompression or protobuf decoding fails
pub fn decode_request(payload: &[u8]) -> Result<ExportProfilesServiceRequest, DecodeError> {
    decode_request_with_encoding(payload, payload.starts_with(&GZIP_MAGIC))
}

/// Decode a submission body whose compression is known up front.
///
/// # Errors
/// Returns [`DecodeError`] if decompression or protobuf decoding fails
pub fn decode_request_with_encoding(payload: &[u8], gzip: bool) -> Result<ExportProfilesServiceRequest, DecodeError> {
    if gzip {
        let decompressed = gunzip(payload, MAX_DECOMPRESSED_BYTES)?;
        debug!("Decompressed {} -> {} bytes", payload.len(), decompressed.len());
        return Ok(ExportProfilesServiceRequest::decode(decompressed.as_slice())?);
    }
    Ok(ExportProfilesServiceRequest::decode(payload)?)
}

/// Gunzip `payload`, refusing to produce more than `limit` bytes
fn gunzip(payload: &[u8], limit: u64) -> Result<Vec<u8>, DecodeError> {
    let mut decompressed = Vec::new();
    GzDecoder::new(payload)
        .take(limit.saturating_add(1))
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Gzip)?;

    if u64::try_from(decompressed.len()).unwrap_or(u64::MAX) > limit {
        return Err(DecodeError::DecompressedTooLarge { limit });
    }
    Ok(decompressed)
}

/// Render one decoded request.
///
/// The dictionary and its string table are mandatory as soon as any scope
/// carries a profile: without them no profile could resolve even its sample
/// type. Resources without profiles still render their attributes.
///
/// # Errors
/// Returns [`DecodeError::MissingDictionary`] or [`DecodeError::MissingStringTable`]
pub fn render(request: &ExportProfilesServiceRequest, config: &RenderConfig) -> Result<Report, DecodeError> {
    let empty = ProfilesDictionary::default();
    let dictionary = if carries_profiles(request) {
        let dictionary = request.dictionary.as_ref().ok_or(DecodeError::MissingDictionary)?;
        if dictionary.string_table.is_empty() {
            return Err(DecodeError::MissingStringTable);
        }
        dictionary
    } else {
        request.dictionary.as_ref().unwrap_or(&empty)
    };

    let renderer = Renderer::new(Resolver::new(dictionary), config);
    Ok(renderer.render(&request.resource_profiles))
}

fn carries_profiles(request: &ExportProfilesServiceRequest) -> bool {
    request
        .resource_profiles
        .iter()
        .flat_map(|rp| &rp.scope_profiles)
        .any(|sp| !sp.profiles.is_empty())
}

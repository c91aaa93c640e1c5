//! Structured error types for profdump
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! The three enums follow the blast radius of a failure:
//! - [`DecodeError`] rejects a whole request
//! - [`ProfileError`] aborts one profile; its siblings still render
//! - [`ServeError`] stops the HTTP receiver

use profdump_common::ResolveError;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed protobuf payload: {0}")]
    Protobuf(#[from] prost::DecodeError),

    #[error("Failed to decompress gzip payload: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("Decompressed payload exceeds {limit} bytes")]
    DecompressedTooLarge { limit: u64 },

    #[error("Request carries profiles but no dictionary")]
    MissingDictionary,

    #[error("Request carries profiles but the dictionary has no string table")]
    MissingStringTable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Profile id must be 16 bytes, got {len}")]
    InvalidProfileId { len: usize },
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: std::io::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

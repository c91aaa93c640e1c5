//! # profdump - OTLP Profile Renderer
//!
//! profdump turns OTLP profile submissions, a dictionary-encoded,
//! pprof-like representation of stack-sampled profiles, into reports a
//! person can audit line by line. Every sample is rendered with its
//! timestamps, attributes and fully resolved stack, subject to a few
//! operator-controlled filters.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        Profiler / Collector (OTLP profiles exporter)         │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ POST /v1development/profiles
//!                            ▼      (or a captured request file)
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     profdump (This Crate)                    │
//! │                                                              │
//! │  ┌────────────┐   ┌────────────┐   ┌────────────────────┐    │
//! │  │   ingest   │──▶│  renderer  │──▶│ report::{text,json} │   │
//! │  │  (decode)  │   │ (traverse) │   │    (formatters)     │   │
//! │  └────────────┘   └─────┬──────┘   └────────────────────┘    │
//! │                         │                                    │
//! │              ┌──────────┴──────────┐                         │
//! │              ▼                     ▼                         │
//! │     ┌────────────────┐    ┌────────────────┐                 │
//! │     │    Resolver    │    │     Filter     │                 │
//! │     │ (profdump-     │    │  (admission)   │                 │
//! │     │    common)     │    │                │                 │
//! │     └────────────────┘    └────────────────┘                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`ingest`]: decode a submission (protobuf, optionally gzip) and the
//!   [`render`](ingest::render) entry point
//! - [`renderer`]: depth-first walk Resource → Scope → Profile → Sample → Frame
//! - [`filter`]: resource, sample-type and frame-type admission
//! - [`report`]: the structured report tree and its text/JSON formatters
//! - [`server`]: OTLP/HTTP receiver with graceful shutdown
//! - [`config`]: [`RenderConfig`](config::RenderConfig)
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: newtypes (profile id, timestamp, duration) and errors
//!
//! ## Failure Scopes
//!
//! - A payload that cannot be decoded, or that lacks the dictionary, is
//!   rejected as a whole ([`domain::DecodeError`]).
//! - A table index that does not resolve aborts only the profile it occurs
//!   in; the report carries a failed section for it and moves on.
//! - Filter rejections are not errors; they show up as skipped sections.
//!
//! Rendering is a pure function of (request, config): the same inputs always
//! produce byte-identical output, and nothing is cached between requests.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Receive profiles and print every submission
//! profdump serve --listen 127.0.0.1:4137
//!
//! # Only native frames of "events" profiles from containers
//! profdump --sample-type events --frame-type native --require-container-id serve
//!
//! # Render a captured request as JSON
//! profdump --format json render request.pb
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod filter;
pub mod ingest;
pub mod renderer;
pub mod report;
pub mod server;

pub use config::RenderConfig;
pub use ingest::{decode_request, render};
pub use report::Report;

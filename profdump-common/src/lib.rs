//! # Shared Profile Dictionary Types
//!
//! The OTLP profiles wire model and the index resolver used to walk it.
//!
//! A profiles request is a graph of flat tables cross-referenced by integer
//! offsets:
//!
//! ```text
//! Sample ──stack_index──▶ Stack ──location_indices──▶ Location ──lines──▶ Line
//!                                                        │                  │
//!                                          mapping_index │    function_index │
//!                                                        ▼                  ▼
//!                                                     Mapping           Function
//!                                                        │                  │
//!                                                        └──▶ string_table ◀┘
//! ```
//!
//! The tables stay as they arrive (see [`proto::ProfilesDictionary`]); the
//! [`Resolver`] validates every offset on the way through.
//!
//! ## Key Types
//!
//! - [`proto`] - prost message definitions matching `profiles.proto`
//! - [`Resolver`] - bounds-checked lookups for strings, attributes, functions,
//!   mappings, locations, stacks and links
//! - [`ResolveError`] - the single failure mode of a lookup

pub mod proto;
pub mod resolver;
pub mod value;

pub use resolver::{ResolveError, Resolver, Table, FRAME_TYPE_KEY, UNKNOWN_FRAME_TYPE};
pub use value::display_value;

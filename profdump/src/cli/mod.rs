//! Command-line interface for profdump
//!
//! This module contains CLI argument parsing and the mapping onto
//! [`RenderConfig`](crate::config::RenderConfig)

pub mod args;

pub use args::{Args, Command, RenderArgs};

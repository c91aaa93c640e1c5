//! CLI argument definitions

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::RenderConfig;
use crate::report::OutputFormat;

/// Port the receiver listens on by default
pub const DEFAULT_PORT: u16 = 4137;

#[derive(Parser, Debug)]
#[command(
    name = "profdump",
    version,
    about = "Render OTLP profiles into human-readable reports",
    after_help = "\
EXAMPLES:
    profdump serve                                   Receive profiles on 127.0.0.1:4137
    profdump --sample-type events serve              Only report profiles sampling \"events\"
    profdump --require-container-id render req.pb    Render a captured request from disk
    profdump --format json render req.pb.gz          Emit the structured report as JSON"
)]
pub struct Args {
    #[command(flatten)]
    pub render: RenderArgs,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the OTLP/HTTP receiver and print a report per submission
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
        listen: SocketAddr,
    },
    /// Render serialized export requests (protobuf, optionally gzipped)
    Render {
        /// Request files, rendered in order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

/// Filtering and export switches shared by every subcommand
#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Include resource attributes
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub export_resource_attributes: bool,

    /// Include profile attributes
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub export_profile_attributes: bool,

    /// Include sample attributes
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub export_sample_attributes: bool,

    /// Include resolved stack frames (timestamps only when false)
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub export_stack_frames: bool,

    /// Only show frames of this type (repeatable; default: all)
    #[arg(long = "frame-type", value_name = "TYPE", value_delimiter = ',', global = true)]
    pub frame_types: Vec<String>,

    /// Only report profiles with this sample type (repeatable; default: all)
    #[arg(long = "sample-type", value_name = "TYPE", value_delimiter = ',', global = true)]
    pub sample_types: Vec<String>,

    /// Skip resources without a non-empty container.id attribute
    #[arg(long, global = true)]
    pub require_container_id: bool,
}

impl RenderArgs {
    pub fn to_config(&self) -> RenderConfig {
        RenderConfig {
            export_resource_attributes: self.export_resource_attributes,
            export_profile_attributes: self.export_profile_attributes,
            export_sample_attributes: self.export_sample_attributes,
            export_stack_frames: self.export_stack_frames,
            export_stack_frame_types: self.frame_types.clone(),
            ignore_profiles_without_container_id: self.require_container_id,
            filter_sample_types: self.sample_types.clone(),
        }
    }
}

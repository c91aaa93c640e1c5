//! Rendering configuration
//!
//! Every option is independent of the others. The defaults export
//! everything and filter nothing.

/// Options controlling what a report contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Include resource-level attributes
    pub export_resource_attributes: bool,
    /// Include profile-level attributes
    pub export_profile_attributes: bool,
    /// Include sample-level attributes
    pub export_sample_attributes: bool,
    /// Include resolved stack frames; when off, samples carry timestamps only
    pub export_stack_frames: bool,
    /// Frame types to keep (empty = all)
    pub export_stack_frame_types: Vec<String>,
    /// Skip resources without a non-empty `container.id` attribute
    pub ignore_profiles_without_container_id: bool,
    /// Sample types to keep (empty = all)
    pub filter_sample_types: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            export_resource_attributes: true,
            export_profile_attributes: true,
            export_sample_attributes: true,
            export_stack_frames: true,
            export_stack_frame_types: Vec::new(),
            ignore_profiles_without_container_id: false,
            filter_sample_types: Vec::new(),
        }
    }
}

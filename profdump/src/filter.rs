//! Admission predicates applied during rendering.
//!
//! Each predicate guards one level of the traversal and short-circuits the
//! work below it:
//!
//! | predicate | level | on rejection |
//! |---|---|---|
//! | [`Filter::admit_resource`] | resource | whole resource skipped |
//! | [`Filter::admit_sample_type`] | profile | whole profile skipped |
//! | [`Filter::admit_frame_type`] | location | that frame omitted, siblings kept |
//!
//! A rejection is not an error; the renderer reports it as a skipped section.

use profdump_common::display_value;
use profdump_common::proto::Resource;

use crate::config::RenderConfig;

/// Resource attribute that identifies the container a profile came from
pub const CONTAINER_ID_KEY: &str = "container.id";

/// Borrowed view of the filtering half of a [`RenderConfig`]
#[derive(Debug, Clone, Copy)]
pub struct Filter<'a> {
    config: &'a RenderConfig,
}

impl<'a> Filter<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Resource admission.
    ///
    /// Always true unless the container-id gate is on, in which case the
    /// resource must carry a `container.id` whose string form is non-empty.
    pub fn admit_resource(&self, resource: Option<&Resource>) -> bool {
        if !self.config.ignore_profiles_without_container_id {
            return true;
        }
        container_id(resource).is_some_and(|id| !id.is_empty())
    }

    /// Sample-type admission, evaluated once per profile.
    pub fn admit_sample_type(&self, sample_type: &str) -> bool {
        allowed(&self.config.filter_sample_types, sample_type)
    }

    /// Frame-type admission, evaluated once per location.
    pub fn admit_frame_type(&self, frame_type: &str) -> bool {
        allowed(&self.config.export_stack_frame_types, frame_type)
    }
}

/// Value of the first `container.id` attribute of a resource, if any
pub fn container_id(resource: Option<&Resource>) -> Option<String> {
    resource?
        .attributes
        .iter()
        .find(|kv| kv.key == CONTAINER_ID_KEY)
        .map(|kv| display_value(kv.value.as_ref()))
}

fn allowed(set: &[String], value: &str) -> bool {
    set.is_empty() || set.iter().any(|v| v == value)
}

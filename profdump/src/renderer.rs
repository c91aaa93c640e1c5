//! Traversal of one profiles request into a [`Report`]
//!
//! The walk is depth-first in request order:
//!
//! ```text
//! ResourceProfiles ─▶ ScopeProfiles ─▶ Profile ─▶ Sample ─▶ Stack ─▶ Location ─▶ Line
//!        │                                │                              │
//!  admit_resource                 admit_sample_type               admit_frame_type
//! ```
//!
//! Nothing is reordered, merged or deduplicated: two samples with the same
//! stack render the same frames twice.
//!
//! A [`ResolveError`] anywhere below a profile aborts that profile only; it is
//! reported as [`ProfileSection::Failed`] and the next profile renders
//! normally.

use log::{debug, warn};
use profdump_common::proto::{Location, Profile, ResourceProfiles, Sample, ScopeProfiles, ValueType};
use profdump_common::{display_value, ResolveError, Resolver};

use crate::config::RenderConfig;
use crate::domain::{ProfileError, ProfileId};
use crate::filter::Filter;
use crate::report::{
    Attribute, Frame, LinkSection, ProfileSection, RenderedProfile, Report, ResourceSection, SampleSection,
    ScopeSection, SkipReason, ValueTypeSection,
};

/// Renders the resource profiles of one request.
///
/// Holds only borrowed, read-only state; build one per request.
pub struct Renderer<'a> {
    resolver: Resolver<'a>,
    filter: Filter<'a>,
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    /// Create a renderer over one request's dictionary
    pub fn new(resolver: Resolver<'a>, config: &'a RenderConfig) -> Self {
        Self { resolver, filter: Filter::new(config), config }
    }

    /// Render every resource profile in order
    pub fn render(&self, resource_profiles: &[ResourceProfiles]) -> Report {
        Report { resources: resource_profiles.iter().map(|rp| self.render_resource(rp)).collect() }
    }

    fn render_resource(&self, resource_profiles: &ResourceProfiles) -> ResourceSection {
        let resource = resource_profiles.resource.as_ref();
        if !self.filter.admit_resource(resource) {
            debug!("Skipping resource without container.id");
            return ResourceSection::Skipped { reason: SkipReason::NoContainerId };
        }

        let attributes = self.config.export_resource_attributes.then(|| {
            resource
                .map(|r| {
                    r.attributes
                        .iter()
                        .map(|kv| Attribute::new(kv.key.clone(), display_value(kv.value.as_ref())))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        });

        ResourceSection::Rendered {
            attributes,
            scopes: resource_profiles.scope_profiles.iter().map(|sp| self.render_scope(sp)).collect(),
        }
    }

    fn render_scope(&self, scope_profiles: &ScopeProfiles) -> ScopeSection {
        let (name, version) = scope_profiles
            .scope
            .as_ref()
            .map(|s| (s.name.clone(), s.version.clone()))
            .unwrap_or_default();

        ScopeSection { name, version, profiles: scope_profiles.profiles.iter().map(|p| self.render_profile(p)).collect() }
    }

    /// Render one profile, turning a resolution failure into a failed section
    pub fn render_profile(&self, profile: &Profile) -> ProfileSection {
        match self.try_render_profile(profile) {
            Ok(section) => section,
            Err(e) => {
                warn!("Profile aborted: {e}");
                ProfileSection::Failed { error: e.to_string() }
            }
        }
    }

    fn try_render_profile(&self, profile: &Profile) -> Result<ProfileSection, ProfileError> {
        let sample_type = self.value_type(profile.sample_type)?;
        if !self.filter.admit_sample_type(&sample_type.value_type) {
            debug!("Skipping profile with sample type {:?}", sample_type.value_type);
            return Ok(ProfileSection::Skipped { sample_type: sample_type.value_type });
        }

        let profile_id = ProfileId::from_bytes(&profile.profile_id)?;
        let period_type = self.value_type(profile.period_type)?;

        let attributes = if self.config.export_profile_attributes {
            Some(self.attributes(&profile.attribute_indices)?)
        } else {
            None
        };

        let samples = profile
            .samples
            .iter()
            .map(|sample| self.render_sample(sample))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProfileSection::Rendered(RenderedProfile {
            profile_id: profile_id.to_string(),
            time_unix_nano: profile.time_unix_nano,
            duration_nano: profile.duration_nano,
            sample_type,
            period_type,
            period: profile.period,
            dropped_attributes_count: profile.dropped_attributes_count,
            original_payload_format: profile.original_payload_format.clone(),
            attributes,
            samples,
        }))
    }

    fn render_sample(&self, sample: &Sample) -> Result<SampleSection, ResolveError> {
        let link = match sample.link_index {
            0 => None,
            index => {
                let link = self.resolver.link(index)?;
                Some(LinkSection { trace_id: hex::encode(&link.trace_id), span_id: hex::encode(&link.span_id) })
            }
        };

        let attributes = if self.config.export_sample_attributes {
            Some(self.attributes(&sample.attribute_indices)?)
        } else {
            None
        };

        let frames = if self.config.export_stack_frames { Some(self.render_stack(sample.stack_index)?) } else { None };

        Ok(SampleSection {
            timestamps_unix_nano: sample.timestamps_unix_nano.clone(),
            values: sample.values.clone(),
            link,
            attributes,
            frames,
        })
    }

    /// Resolve a stack into frame entries, in stored location order
    ///
    /// # Errors
    /// Fails if the stack, any of its locations, or anything they reference does not resolve
    pub fn render_stack(&self, stack_index: i32) -> Result<Vec<Frame>, ResolveError> {
        let mut frames = Vec::new();
        for location in self.resolver.stack_frames(stack_index)? {
            self.render_location(location, &mut frames)?;
        }
        Ok(frames)
    }

    /// Append the frame entries of one location.
    ///
    /// A location without line records yields a single address/mapping
    /// entry; otherwise there is one entry per line record, in order.
    fn render_location(&self, location: &Location, frames: &mut Vec<Frame>) -> Result<(), ResolveError> {
        let frame_type = self.resolver.frame_type(location)?;
        if !self.filter.admit_frame_type(&frame_type) {
            return Ok(());
        }

        if location.lines.is_empty() {
            frames.push(Frame::Unsymbolized {
                mapping: self.resolver.location_mapping(location)?.map(str::to_string),
                address: location.address,
                frame_type,
            });
            return Ok(());
        }

        for line in &location.lines {
            let (function, file) = self.resolver.line_function(line)?;
            frames.push(Frame::Symbolized {
                frame_type: frame_type.clone(),
                function: function.to_string(),
                file: file.to_string(),
                line: line.line,
                column: line.column,
            });
        }
        Ok(())
    }

    fn value_type(&self, value_type: Option<ValueType>) -> Result<ValueTypeSection, ResolveError> {
        let value_type = value_type.unwrap_or_default();
        Ok(ValueTypeSection {
            value_type: self.resolver.string(value_type.type_strindex)?.to_string(),
            unit: self.resolver.string(value_type.unit_strindex)?.to_string(),
        })
    }

    fn attributes(&self, indices: &[i32]) -> Result<Vec<Attribute>, ResolveError> {
        Ok(self.resolver.attributes(indices)?.into_iter().map(|(key, value)| Attribute::new(key, value)).collect())
    }
}

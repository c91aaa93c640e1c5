//! Request fixtures shared by the integration tests
#![allow(dead_code)]

use profdump_common::proto::{
    AnyValue, ExportProfilesServiceRequest, Function, KeyValue, KeyValueAndUnit, Line, Location, Mapping, Profile,
    ProfilesDictionary, Resource, ResourceProfiles, Sample, ScopeProfiles, Stack, ValueType,
};
use profdump_common::FRAME_TYPE_KEY;

// String table offsets
pub const CPU: i32 = 1;
pub const EVENTS: i32 = 2;
pub const NANOSECONDS: i32 = 7;
pub const COUNT: i32 = 8;

// Stack table offsets
/// go frame with two inlined lines, then an unmapped and a mapped native frame
pub const STACK_MIXED: i32 = 1;
/// A single unmapped native frame at 0x1000
pub const STACK_NATIVE: i32 = 2;
/// A single symbolized frame without a frame type attribute
pub const STACK_UNTYPED: i32 = 3;
/// References a location that does not exist
pub const STACK_BROKEN: i32 = 4;

// Attribute table offsets
pub const ATTR_THREAD_NAME: i32 = 3;

pub fn dictionary() -> ProfilesDictionary {
    let strings = [
        "",
        "cpu",
        "events",
        "main.go",
        FRAME_TYPE_KEY,
        "main",
        "libc.so.6",
        "nanoseconds",
        "count",
        "thread.name",
    ];

    ProfilesDictionary {
        string_table: strings.iter().map(|s| (*s).to_string()).collect(),
        attribute_table: vec![
            KeyValueAndUnit::default(),
            KeyValueAndUnit { key_strindex: 4, value: Some(AnyValue::string("native")), unit_strindex: 0 },
            KeyValueAndUnit { key_strindex: 4, value: Some(AnyValue::string("go")), unit_strindex: 0 },
            KeyValueAndUnit { key_strindex: 9, value: Some(AnyValue::string("worker-1")), unit_strindex: 0 },
        ],
        function_table: vec![
            Function::default(),
            Function { name_strindex: 5, filename_strindex: 3, ..Default::default() },
        ],
        mapping_table: vec![Mapping::default(), Mapping { filename_strindex: 6, ..Default::default() }],
        location_table: vec![
            Location::default(),
            Location { mapping_index: 0, address: 0x1000, lines: vec![], attribute_indices: vec![1] },
            Location { mapping_index: 1, address: 0x2000, lines: vec![], attribute_indices: vec![1] },
            Location {
                mapping_index: 0,
                address: 0,
                lines: vec![
                    Line { function_index: 1, line: 10, column: 3 },
                    Line { function_index: 1, line: 42, column: 7 },
                ],
                attribute_indices: vec![2],
            },
            Location {
                mapping_index: 0,
                address: 0,
                lines: vec![Line { function_index: 1, line: 5, column: 1 }],
                attribute_indices: vec![],
            },
        ],
        stack_table: vec![
            Stack::default(),
            Stack { location_indices: vec![3, 1, 2] },
            Stack { location_indices: vec![1] },
            Stack { location_indices: vec![4] },
            Stack { location_indices: vec![99] },
        ],
        link_table: vec![],
    }
}

pub fn sample(stack_index: i32, timestamps: &[u64]) -> Sample {
    Sample {
        stack_index,
        timestamps_unix_nano: timestamps.to_vec(),
        attribute_indices: vec![ATTR_THREAD_NAME],
        ..Default::default()
    }
}

pub fn profile(sample_type: i32, samples: Vec<Sample>) -> Profile {
    Profile {
        sample_type: Some(ValueType { type_strindex: sample_type, unit_strindex: COUNT }),
        period_type: Some(ValueType { type_strindex: CPU, unit_strindex: NANOSECONDS }),
        period: 10_000_000,
        time_unix_nano: 1_700_000_000_000_000_000,
        duration_nano: 5_000_000_000,
        profile_id: (1..=16).collect(),
        samples,
        ..Default::default()
    }
}

pub fn resource(container_id: Option<&str>, profiles: Vec<Profile>) -> ResourceProfiles {
    let mut attributes = vec![KeyValue::new("service.name", AnyValue::string("checkout"))];
    if let Some(id) = container_id {
        attributes.push(KeyValue::new("container.id", AnyValue::string(id)));
    }

    ResourceProfiles {
        resource: Some(Resource { attributes, dropped_attributes_count: 0 }),
        scope_profiles: vec![ScopeProfiles { profiles, ..Default::default() }],
        ..Default::default()
    }
}

pub fn request(resource_profiles: Vec<ResourceProfiles>) -> ExportProfilesServiceRequest {
    ExportProfilesServiceRequest { resource_profiles, dictionary: Some(dictionary()) }
}

/// One container, one "events" profile, one sample over the mixed stack
pub fn single_sample_request() -> ExportProfilesServiceRequest {
    request(vec![resource(Some("3f2a"), vec![profile(EVENTS, vec![sample(STACK_MIXED, &[1000, 2000])])])])
}

//! Index resolution against a [`ProfilesDictionary`]
//!
//! Every cross-reference in a profiles request is an `int32` offset into one
//! of the dictionary tables. The resolver is the single place those offsets
//! are bounds-checked; callers get either the referenced entry or an
//! [`ResolveError::IndexOutOfRange`] naming the table and the bad index.

use std::fmt;
use thiserror::Error;

use crate::proto::{Line, Link, Location, ProfilesDictionary, Stack};
use crate::value::display_value;

/// Location attribute key carrying the frame's unwinder/runtime classification.
pub const FRAME_TYPE_KEY: &str = "profile.frame.type";

/// Frame type used when a location carries no [`FRAME_TYPE_KEY`] attribute.
pub const UNKNOWN_FRAME_TYPE: &str = "unknown";

/// Dictionary table an index points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    String,
    Attribute,
    Function,
    Mapping,
    Location,
    Stack,
    Link,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::String => "string",
            Table::Attribute => "attribute",
            Table::Function => "function",
            Table::Mapping => "mapping",
            Table::Location => "location",
            Table::Stack => "stack",
            Table::Link => "link",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{table} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange { table: Table, index: i64, len: usize },
}

/// Bounds-checked view over the tables of one request.
///
/// The resolver borrows the dictionary and holds no other state, so it is
/// cheap to copy into every level of a traversal and safe to share between
/// threads.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    dictionary: &'a ProfilesDictionary,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given dictionary
    pub fn new(dictionary: &'a ProfilesDictionary) -> Self {
        Self { dictionary }
    }

    /// Look up a string table entry, returned exactly as stored.
    ///
    /// # Errors
    /// Returns [`ResolveError::IndexOutOfRange`] if `index` is negative or past the end
    pub fn string(&self, index: i32) -> Result<&'a str, ResolveError> {
        lookup(Table::String, &self.dictionary.string_table, index).map(String::as_str)
    }

    /// Resolve an attribute table entry to its `(key, value)` text pair.
    ///
    /// # Errors
    /// Fails if the attribute index or its key strindex is out of range
    pub fn attribute(&self, index: i32) -> Result<(&'a str, String), ResolveError> {
        let attribute = lookup(Table::Attribute, &self.dictionary.attribute_table, index)?;
        let key = self.string(attribute.key_strindex)?;
        Ok((key, display_value(attribute.value.as_ref())))
    }

    /// Resolve a list of attribute indices, preserving their order.
    ///
    /// # Errors
    /// Fails on the first index that does not resolve
    pub fn attributes(&self, indices: &[i32]) -> Result<Vec<(&'a str, String)>, ResolveError> {
        indices.iter().map(|&i| self.attribute(i)).collect()
    }

    /// Find the value of the first attribute among `indices` whose key is `key`.
    ///
    /// Every index up to the match is resolved, so a malformed entry before
    /// the match is reported rather than skipped.
    ///
    /// # Errors
    /// Fails if an attribute index or key strindex before the match is out of range
    pub fn find_attribute(&self, indices: &[i32], key: &str) -> Result<Option<String>, ResolveError> {
        for &index in indices {
            let attribute = lookup(Table::Attribute, &self.dictionary.attribute_table, index)?;
            if self.string(attribute.key_strindex)? == key {
                return Ok(Some(display_value(attribute.value.as_ref())));
            }
        }
        Ok(None)
    }

    /// Resolve a function to its `(name, filename)` pair.
    ///
    /// # Errors
    /// Fails if the function index or either strindex is out of range
    pub fn function(&self, index: i32) -> Result<(&'a str, &'a str), ResolveError> {
        let function = lookup(Table::Function, &self.dictionary.function_table, index)?;
        Ok((self.string(function.name_strindex)?, self.string(function.filename_strindex)?))
    }

    /// Resolve a mapping to the filename of the binary it describes.
    ///
    /// # Errors
    /// Fails if the mapping index or its filename strindex is out of range
    pub fn mapping(&self, index: i32) -> Result<&'a str, ResolveError> {
        let mapping = lookup(Table::Mapping, &self.dictionary.mapping_table, index)?;
        self.string(mapping.filename_strindex)
    }

    /// Filename of a location's mapping, or `None` if the location has none.
    ///
    /// # Errors
    /// Fails if a non-zero mapping index does not resolve
    pub fn location_mapping(&self, location: &Location) -> Result<Option<&'a str>, ResolveError> {
        match location.mapping_index {
            0 => Ok(None),
            index => self.mapping(index).map(Some),
        }
    }

    /// Look up a location table entry.
    ///
    /// # Errors
    /// Returns [`ResolveError::IndexOutOfRange`] for a bad index
    pub fn location(&self, index: i32) -> Result<&'a Location, ResolveError> {
        lookup(Table::Location, &self.dictionary.location_table, index)
    }

    /// Look up a stack table entry.
    ///
    /// # Errors
    /// Returns [`ResolveError::IndexOutOfRange`] for a bad index
    pub fn stack(&self, index: i32) -> Result<&'a Stack, ResolveError> {
        lookup(Table::Stack, &self.dictionary.stack_table, index)
    }

    /// Resolve a stack to its locations in stored order.
    ///
    /// The order is whatever the producer wrote; it is never reversed or
    /// deduplicated.
    ///
    /// # Errors
    /// Fails if the stack index or any of its location indices is out of range
    pub fn stack_frames(&self, stack_index: i32) -> Result<Vec<&'a Location>, ResolveError> {
        self.stack(stack_index)?
            .location_indices
            .iter()
            .map(|&i| self.location(i))
            .collect()
    }

    /// Look up a link table entry.
    ///
    /// # Errors
    /// Returns [`ResolveError::IndexOutOfRange`] for a bad index
    pub fn link(&self, index: i32) -> Result<&'a Link, ResolveError> {
        lookup(Table::Link, &self.dictionary.link_table, index)
    }

    /// Frame type of a location, from its own [`FRAME_TYPE_KEY`] attribute.
    ///
    /// The first matching attribute wins; locations without one are
    /// [`UNKNOWN_FRAME_TYPE`].
    ///
    /// # Errors
    /// Fails if one of the location's attributes does not resolve
    pub fn frame_type(&self, location: &Location) -> Result<String, ResolveError> {
        Ok(self
            .find_attribute(&location.attribute_indices, FRAME_TYPE_KEY)?
            .unwrap_or_else(|| UNKNOWN_FRAME_TYPE.to_string()))
    }

    /// Resolve one line record of a location to `(function name, filename)`.
    ///
    /// # Errors
    /// Fails if the line's function does not resolve
    pub fn line_function(&self, line: &Line) -> Result<(&'a str, &'a str), ResolveError> {
        self.function(line.function_index)
    }
}

fn lookup<T>(table: Table, entries: &[T], index: i32) -> Result<&T, ResolveError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| entries.get(i))
        .ok_or(ResolveError::IndexOutOfRange { table, index: i64::from(index), len: entries.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{AnyValue, Function, KeyValueAndUnit, Line, Mapping};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn attr(key_strindex: i32, value: &str) -> KeyValueAndUnit {
        KeyValueAndUnit { key_strindex, value: Some(AnyValue::string(value)), unit_strindex: 0 }
    }

    fn sample_dictionary() -> ProfilesDictionary {
        ProfilesDictionary {
            // 0    1       2          3             4               5
            string_table: strings(&["", "main", "main.go", "libc.so.6", FRAME_TYPE_KEY, "thread.name"]),
            attribute_table: vec![KeyValueAndUnit::default(), attr(4, "native"), attr(5, "worker-1"), attr(4, "go")],
            function_table: vec![Function::default(), Function { name_strindex: 1, filename_strindex: 2, ..Default::default() }],
            mapping_table: vec![Mapping::default(), Mapping { filename_strindex: 3, ..Default::default() }],
            location_table: vec![
                Location::default(),
                Location { mapping_index: 1, address: 0x1000, lines: vec![], attribute_indices: vec![2, 1, 3] },
                Location {
                    mapping_index: 0,
                    address: 0,
                    lines: vec![Line { function_index: 1, line: 10, column: 2 }],
                    attribute_indices: vec![],
                },
            ],
            stack_table: vec![Stack::default(), Stack { location_indices: vec![2, 1, 2] }],
            link_table: vec![Link::default()],
        }
    }

    #[test]
    fn test_string_is_returned_verbatim() {
        let mut dict = sample_dictionary();
        dict.string_table.push("  padded  ".to_string());
        let resolver = Resolver::new(&dict);

        assert_eq!(resolver.string(0).unwrap(), "");
        assert_eq!(resolver.string(6).unwrap(), "  padded  ");
    }

    #[test]
    fn test_out_of_range_names_the_table() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        let err = resolver.string(6).unwrap_err();
        assert_eq!(err, ResolveError::IndexOutOfRange { table: Table::String, index: 6, len: 6 });
        assert_eq!(err.to_string(), "string index 6 out of range (table has 6 entries)");

        assert!(matches!(
            resolver.stack(-1),
            Err(ResolveError::IndexOutOfRange { table: Table::Stack, index: -1, .. })
        ));
    }

    #[test]
    fn test_attribute_resolves_key_and_value() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        assert_eq!(resolver.attribute(2).unwrap(), ("thread.name", "worker-1".to_string()));
        assert_eq!(resolver.attributes(&[3, 2]).unwrap(), vec![
            (FRAME_TYPE_KEY, "go".to_string()),
            ("thread.name", "worker-1".to_string()),
        ]);
    }

    #[test]
    fn test_attribute_with_bad_key_fails() {
        let mut dict = sample_dictionary();
        dict.attribute_table.push(attr(99, "x"));
        let resolver = Resolver::new(&dict);

        assert!(matches!(
            resolver.attribute(4),
            Err(ResolveError::IndexOutOfRange { table: Table::String, index: 99, .. })
        ));
    }

    #[test]
    fn test_function_and_mapping() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        assert_eq!(resolver.function(1).unwrap(), ("main", "main.go"));
        assert_eq!(resolver.mapping(1).unwrap(), "libc.so.6");
    }

    #[test]
    fn test_location_mapping_zero_means_none() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        assert_eq!(resolver.location_mapping(&dict.location_table[2]).unwrap(), None);
        assert_eq!(resolver.location_mapping(&dict.location_table[1]).unwrap(), Some("libc.so.6"));
    }

    #[test]
    fn test_stack_frames_preserve_stored_order() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        let frames = resolver.stack_frames(1).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], &dict.location_table[2]);
        assert_eq!(frames[1], &dict.location_table[1]);
        assert_eq!(frames[2], &dict.location_table[2]);
    }

    #[test]
    fn test_stack_frames_with_bad_location_fails() {
        let mut dict = sample_dictionary();
        dict.stack_table.push(Stack { location_indices: vec![1, 7] });
        let resolver = Resolver::new(&dict);

        assert!(matches!(
            resolver.stack_frames(2),
            Err(ResolveError::IndexOutOfRange { table: Table::Location, index: 7, .. })
        ));
    }

    #[test]
    fn test_frame_type_first_match_wins() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        // Location 1 carries thread.name, then native, then go.
        assert_eq!(resolver.frame_type(&dict.location_table[1]).unwrap(), "native");
    }

    #[test]
    fn test_frame_type_defaults_to_unknown() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);

        assert_eq!(resolver.frame_type(&dict.location_table[2]).unwrap(), UNKNOWN_FRAME_TYPE);
    }

    #[test]
    fn test_line_function() {
        let dict = sample_dictionary();
        let resolver = Resolver::new(&dict);
        let line = &dict.location_table[2].lines[0];

        assert_eq!(resolver.line_function(line).unwrap(), ("main", "main.go"));
    }
}

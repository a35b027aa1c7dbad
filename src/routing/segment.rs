//! Path segment parsing.
//!
//! # Responsibilities
//! - Split a path on `/`, dropping empty labels
//! - Classify a label as literal or `{name}` parameter
//!
//! # Design Decisions
//! - No regex: a parameter is a label wrapped in braces with a non-empty name
//! - `{}` stays a literal
//! - Request labels are percent-decoded before matching; registered labels
//!   are taken as written

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// A single classified path label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Matched by exact string equality.
    Literal(&'a str),
    /// Matches any value and binds it to the name.
    Param(&'a str),
}

impl<'a> Segment<'a> {
    /// Classify a raw label.
    pub fn parse(label: &'a str) -> Self {
        match param_name(label) {
            Some(name) => Segment::Param(name),
            None => Segment::Literal(label),
        }
    }
}

/// Iterate over the non-empty labels of a path.
///
/// Leading, trailing and doubled slashes produce no labels, so `""`, `"/"`
/// and `"///"` all yield nothing and resolve to the root.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|label| !label.is_empty())
}

/// Returns the brace-stripped name if `label` is a parameter label.
pub fn param_name(label: &str) -> Option<&str> {
    label
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

/// Percent-decode one request label.
///
/// A label that does not decode to UTF-8 is returned unchanged.
pub fn decode_label(label: &str) -> Cow<'_, str> {
    percent_decode_str(label)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_discards_empty_labels() {
        let labels: Vec<_> = split_path("//users///42/").collect();
        assert_eq!(labels, vec!["users", "42"]);

        assert_eq!(split_path("/").count(), 0);
        assert_eq!(split_path("").count(), 0);
        assert_eq!(split_path("///").count(), 0);
    }

    #[test]
    fn test_segment_classification() {
        assert_eq!(Segment::parse("users"), Segment::Literal("users"));
        assert_eq!(Segment::parse("{userId}"), Segment::Param("userId"));
        assert_eq!(Segment::parse("{}"), Segment::Literal("{}"));
        assert_eq!(Segment::parse("{open"), Segment::Literal("{open"));
        assert_eq!(Segment::parse("v-{id}"), Segment::Literal("v-{id}"));
    }

    #[test]
    fn test_decode_label() {
        assert_eq!(decode_label("john%20doe"), "john doe");
        assert_eq!(decode_label("caf%C3%A9"), "café");
        assert!(matches!(decode_label("plain"), Cow::Borrowed("plain")));
        assert_eq!(decode_label("bad%FF"), "bad%FF");
        assert_eq!(decode_label("100%"), "100%");
    }
}

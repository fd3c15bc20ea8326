//! Route marker lines inside documentation blocks.
//!
//! A marker line as written in source is `/// @route GET /users/123`: four
//! whitespace-separated fields (comment leader, tag, verb, path). Any other
//! field count after the tag is malformed.

/// Tag used when none is configured.
pub const DEFAULT_TAG: &str = "@route";

/// Leader of a line doc comment, counted as the first marker field.
pub const COMMENT_LEADER: &str = "///";

const MARKER_FIELDS: usize = 4;

/// Outcome of inspecting one documentation line that carries the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Route { verb: String, path: String },
    /// `raw` is the doc text as written, without its comment leader.
    Malformed { raw: String },
}

/// Inspect one line of a documentation block.
///
/// `line` is the doc text without its comment leader. Returns `None` when
/// the line is not a marker at all.
pub fn parse_marker(tag: &str, line: &str) -> Option<Marker> {
    let content = line.trim_start();
    // Continuation lines of `/** */` blocks.
    let content = content.strip_prefix('*').unwrap_or(content);

    if content.split_whitespace().next() != Some(tag) {
        return None;
    }

    let fields: Vec<&str> = std::iter::once(COMMENT_LEADER)
        .chain(content.split_whitespace())
        .collect();

    if fields.len() != MARKER_FIELDS {
        return Some(Marker::Malformed {
            raw: line.trim().to_string(),
        });
    }

    Some(Marker::Route {
        verb: fields[2].to_string(),
        path: fields[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_marker() {
        assert_eq!(
            parse_marker(DEFAULT_TAG, " @route GET /users/123"),
            Some(Marker::Route {
                verb: "GET".into(),
                path: "/users/123".into()
            })
        );
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        assert_eq!(
            parse_marker(DEFAULT_TAG, "   @route\tPOST    /users  "),
            Some(Marker::Route {
                verb: "POST".into(),
                path: "/users".into()
            })
        );
    }

    #[test]
    fn test_missing_path_is_malformed() {
        assert_eq!(
            parse_marker(DEFAULT_TAG, " @route GET"),
            Some(Marker::Malformed {
                raw: "@route GET".into()
            })
        );
    }

    #[test]
    fn test_extra_field_is_malformed() {
        assert!(matches!(
            parse_marker(DEFAULT_TAG, " @route GET /x trailing"),
            Some(Marker::Malformed { .. })
        ));
        assert!(matches!(
            parse_marker(DEFAULT_TAG, " @route"),
            Some(Marker::Malformed { .. })
        ));
    }

    #[test]
    fn test_non_marker_lines() {
        assert_eq!(parse_marker(DEFAULT_TAG, " SayHi API"), None);
        assert_eq!(parse_marker(DEFAULT_TAG, ""), None);
        assert_eq!(parse_marker(DEFAULT_TAG, " see @route GET /x"), None);
        assert_eq!(parse_marker(DEFAULT_TAG, " @routes GET /x"), None);
    }

    #[test]
    fn test_block_comment_continuation() {
        assert_eq!(
            parse_marker(DEFAULT_TAG, " * @route DELETE /users/1"),
            Some(Marker::Route {
                verb: "DELETE".into(),
                path: "/users/1".into()
            })
        );
    }

    #[test]
    fn test_malformed_keeps_block_continuation_text() {
        assert_eq!(
            parse_marker(DEFAULT_TAG, " * @route GET"),
            Some(Marker::Malformed {
                raw: "* @route GET".into()
            })
        );
    }

    #[test]
    fn test_custom_tag() {
        assert!(parse_marker("@Api", " @Api GET /say-hi").is_some());
        assert_eq!(parse_marker("@Api", " @route GET /say-hi"), None);
    }
}

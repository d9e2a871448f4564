//! Format-wide constants and defaults.

use crate::types::Encoding;

/// Extension appended to `input` targets that carry none.
pub const DEFAULT_EXTENSION: &str = "th";

/// Encoding assumed for a buffer with no `encoding` directive.
pub const DEFAULT_ENCODING: Encoding = Encoding::Utf8;

/// Separator placed before `#` on lines built without a parsed separator.
pub const DEFAULT_COMMENT_SEPARATOR: &str = " ";

/// Joins the comments of a wrapped logical line.
pub const COMMENT_JOINER: &str = " ";

/// Starts a comment.
pub const COMMENT_MARKER: char = '#';

/// Marks a physical line as continued on the next one.
pub const CONTINUATION_MARKER: char = '\\';

/// Separates a local id from its survey path in a reference.
pub const REFERENCE_SEPARATOR: char = '@';

/// Separates survey names inside a reference path.
pub const PATH_SEPARATOR: char = '.';

/// Binary name for the CLI.
pub const BIN_NAME: &str = "thc";

//! Physical-line splitting and logical-line reconstruction.
//!
//! A physical line is split into indent, data, and an optional `#comment`.
//! A trailing unescaped backslash continues the statement on the next
//! physical line; the fragments of one statement form a [`LogicalLine`].

use std::fmt;

use therion_common::config::ParseConfig;
use therion_common::constants::{
    COMMENT_JOINER, COMMENT_MARKER, CONTINUATION_MARKER, DEFAULT_COMMENT_SEPARATOR,
};
use therion_common::error::{Result, TherionError};
use therion_common::types::LineEnding;

use super::lexer::{self, Token, TokenKind};

/// One physical line's contribution to a logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    indent: String,
    data: String,
    separator: String,
    comment: Option<String>,
    continued: bool,
}

impl Fragment {
    /// Splits one physical line into indent, data, and comment.
    ///
    /// A single trailing line terminator is ignored. The whitespace directly
    /// before `#` becomes the comment separator.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the line contains an embedded line break.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_terminator(raw);
        if body.contains(['\n', '\r']) {
            return Err(TherionError::syntax(
                "physical line contains an embedded line break",
            ));
        }

        let rest = body.trim_start();
        let indent = &body[..body.len() - rest.len()];

        let (mut data, separator, mut comment) = match find_comment(rest) {
            Some(idx) => {
                let before = &rest[..idx];
                let data = before.trim_end();
                (
                    data.to_string(),
                    before[data.len()..].to_string(),
                    Some(rest[idx + COMMENT_MARKER.len_utf8()..].to_string()),
                )
            }
            None => (rest.to_string(), String::new(), None),
        };

        let mut continued = false;
        if let Some(text) = comment.as_mut() {
            continued |= strip_continuation(text);
        }
        continued |= strip_continuation(&mut data);

        Ok(Self {
            indent: indent.to_string(),
            data,
            separator,
            comment,
            continued,
        })
    }

    /// Leading whitespace of the physical line.
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Data portion, without the continuation marker.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Comment text after `#`, if a `#` was present.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whitespace found directly before `#`.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Whether the physical line ended with an unescaped backslash.
    #[must_use]
    pub const fn is_continued(&self) -> bool {
        self.continued
    }
}

/// One statement, possibly wrapped across several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    fragments: Vec<Fragment>,
    separator: String,
    line_number: Option<usize>,
}

impl LogicalLine {
    /// Parses a single physical line into a one-fragment logical line.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the line cannot be split.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self::from_fragment(Fragment::parse(raw)?))
    }

    /// Starts a logical line from its first fragment.
    #[must_use]
    pub fn from_fragment(fragment: Fragment) -> Self {
        let mut line = Self {
            separator: fragment.separator.clone(),
            fragments: vec![fragment],
            line_number: None,
        };
        line.settle_separator();
        line
    }

    /// Builds an uncommented, unwrapped line with the built-in separator.
    #[must_use]
    pub fn new(indent: impl Into<String>, data: impl Into<String>) -> Self {
        Self::with_separator(indent, data, DEFAULT_COMMENT_SEPARATOR)
    }

    /// Builds an uncommented, unwrapped line using `config`'s separator.
    #[must_use]
    pub fn new_in(
        config: &ParseConfig,
        indent: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self::with_separator(indent, data, config.comment_separator.as_str())
    }

    fn with_separator(
        indent: impl Into<String>,
        data: impl Into<String>,
        separator: &str,
    ) -> Self {
        Self {
            fragments: vec![Fragment {
                indent: indent.into(),
                data: data.into(),
                separator: String::new(),
                comment: None,
                continued: false,
            }],
            separator: separator.to_string(),
            line_number: None,
        }
    }

    /// Builds a line holding nothing but a comment.
    #[must_use]
    pub fn comment_only(indent: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment {
                indent: indent.into(),
                data: String::new(),
                separator: String::new(),
                comment: Some(comment.into()),
                continued: false,
            }],
            separator: String::new(),
            line_number: None,
        }
    }

    /// Attaches a comment to the last fragment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        if let Some(last) = self.fragments.last_mut() {
            last.comment = Some(comment.into());
        }
        self.settle_separator();
        self
    }

    /// Records the 1-based physical line where this statement starts.
    #[must_use]
    pub const fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Appends the next physical line's fragment.
    ///
    /// The fragment's indent is discarded; its data and comment are taken
    /// verbatim and its continuation flag becomes the line's.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if this line is not continued.
    pub fn append(&mut self, fragment: Fragment) -> Result<()> {
        if !self.is_continued() {
            return Err(TherionError::syntax_at(
                self.line_number,
                "cannot append a fragment to a line that is not continued",
            ));
        }
        if self.comment().is_none() && fragment.comment.is_some() {
            self.separator.clone_from(&fragment.separator);
        }
        self.fragments.push(fragment);
        self.settle_separator();
        Ok(())
    }

    /// Moves whitespace ending the data into the separator once a comment
    /// is attached, since a reparse always reads it as separator.
    fn settle_separator(&mut self) {
        if self.fragments.iter().all(|f| f.comment.is_none()) {
            return;
        }
        let mut moved = String::new();
        for fragment in self.fragments.iter_mut().rev() {
            let kept = fragment.data.trim_end().len();
            moved.insert_str(0, &fragment.data[kept..]);
            fragment.data.truncate(kept);
            if kept > 0 {
                break;
            }
        }
        self.separator.insert_str(0, &moved);
    }

    /// Indent of the first fragment.
    #[must_use]
    pub fn indent(&self) -> &str {
        self.fragments.first().map_or("", |f| f.indent.as_str())
    }

    /// Data of all fragments, concatenated.
    #[must_use]
    pub fn data(&self) -> String {
        self.fragments.iter().map(|f| f.data.as_str()).collect()
    }

    /// Comments of all fragments, joined; `None` if no fragment had one.
    #[must_use]
    pub fn comment(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .fragments
            .iter()
            .filter_map(|f| f.comment.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(COMMENT_JOINER))
        }
    }

    /// Continuation flag of the last fragment.
    #[must_use]
    pub fn is_continued(&self) -> bool {
        self.fragments.last().is_some_and(|f| f.continued)
    }

    /// Whitespace emitted between data and `#`.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Overrides the whitespace emitted between data and `#`.
    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = separator.into();
    }

    /// 1-based physical line number of the first fragment, when known.
    #[must_use]
    pub const fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    /// The physical fragments making up this line.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Whether the line carries neither data nor a comment.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.data().trim().is_empty() && self.comment().is_none()
    }

    /// Whether the line carries a comment and no data.
    #[must_use]
    pub fn is_comment_only(&self) -> bool {
        self.data().trim().is_empty() && self.comment().is_some()
    }

    /// Tokenizes the unwrapped data.
    ///
    /// # Errors
    ///
    /// Returns a syntax error, located at this line, on malformed quoting.
    pub fn tokens(&self) -> Result<Vec<Token>> {
        lexer::tokenize(&self.data()).map_err(|e| locate(e, self.line_number))
    }

    /// The first token, when it is a bare word.
    ///
    /// Commands and block keywords are always bare; a quoted first field
    /// never acts as a keyword.
    ///
    /// # Errors
    ///
    /// Returns a syntax error on malformed quoting.
    pub fn keyword(&self) -> Result<Option<String>> {
        Ok(self
            .tokens()?
            .into_iter()
            .next()
            .filter(|t| t.kind() == TokenKind::Bare)
            .map(Token::into_value))
    }

    /// Rewrites the data and comment of every fragment.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn map_text<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        for fragment in &mut self.fragments {
            fragment.data = f(&fragment.data)?;
            fragment.comment = fragment.comment.as_deref().map(&mut f).transpose()?;
        }
        self.settle_separator();
        Ok(())
    }

    /// Serialized form without indent and terminator.
    #[must_use]
    pub fn source_text(&self) -> String {
        let data = self.data();
        let mut out = String::with_capacity(data.len());
        out.push_str(&data);
        if let Some(comment) = self.comment() {
            if !data.is_empty() {
                out.push_str(&self.separator);
            }
            out.push(COMMENT_MARKER);
            out.push_str(&comment);
        }
        if self.is_continued() {
            out.push(CONTINUATION_MARKER);
        }
        out
    }

    /// Serialized form including the terminator.
    #[must_use]
    pub fn to_source(&self, ending: LineEnding) -> String {
        format!("{self}{}", ending.as_str())
    }
}

impl fmt::Display for LogicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.indent(), self.source_text())
    }
}

/// Reconstructs logical lines from a stream of physical lines.
///
/// A continued line at the end of the stream is kept as-is.
///
/// # Errors
///
/// Returns a syntax error, located at the offending physical line, if a
/// line cannot be split.
pub fn parse_lines<I, S>(physical: I) -> Result<Vec<LogicalLine>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines: Vec<LogicalLine> = Vec::new();
    for (idx, raw) in physical.into_iter().enumerate() {
        let number = idx + 1;
        let fragment = Fragment::parse(raw.as_ref()).map_err(|e| locate(e, Some(number)))?;
        match lines.last_mut() {
            Some(last) if last.is_continued() => last.append(fragment)?,
            _ => lines.push(LogicalLine::from_fragment(fragment).with_line_number(number)),
        }
    }
    Ok(lines)
}

/// Splits source text into physical lines and parses them.
///
/// # Errors
///
/// See [`parse_lines`].
pub fn parse_text(text: &str) -> Result<Vec<LogicalLine>> {
    parse_lines(text.strip_prefix('\u{feff}').unwrap_or(text).lines())
}

/// Serializes logical lines, one physical line each.
#[must_use]
pub fn serialize_lines(lines: &[LogicalLine], ending: LineEnding) -> String {
    lines.iter().map(|l| l.to_source(ending)).collect()
}

/// Prefixes a syntax error with a source line number.
pub(crate) fn locate(err: TherionError, line: Option<usize>) -> TherionError {
    match err {
        TherionError::Syntax { message } if line.is_some() => {
            TherionError::syntax_at(line, message)
        }
        other => other,
    }
}

fn strip_terminator(raw: &str) -> &str {
    raw.strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .or_else(|| raw.strip_suffix('\r'))
        .unwrap_or(raw)
}

/// Byte offset of the first `#` outside a double-quoted run.
fn find_comment(text: &str) -> Option<usize> {
    let mut quoted = false;
    for (idx, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            COMMENT_MARKER if !quoted => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Removes an unescaped trailing backslash, reporting whether one was found.
fn strip_continuation(text: &mut String) -> bool {
    let run = text
        .chars()
        .rev()
        .take_while(|&c| c == CONTINUATION_MARKER)
        .count();
    if run % 2 == 1 {
        let _ = text.pop();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_same_state(a: &LogicalLine, b: &LogicalLine) {
        assert_eq!(a.indent(), b.indent());
        assert_eq!(a.data(), b.data());
        assert_eq!(a.comment(), b.comment());
        assert_eq!(a.is_continued(), b.is_continued());
    }

    #[test]
    fn split_indent_data_comment() {
        let line = LogicalLine::parse("    0 1 200 -5 6.4   # first leg\n").expect("parse");
        assert_eq!(line.indent(), "    ");
        assert_eq!(line.data(), "0 1 200 -5 6.4");
        assert_eq!(line.separator(), "   ");
        assert_eq!(line.comment().as_deref(), Some(" first leg"));
        assert!(!line.is_continued());
    }

    #[test]
    fn comment_only_line_has_no_data() {
        let line = LogicalLine::parse("  # just a note").expect("parse");
        assert_eq!(line.indent(), "  ");
        assert_eq!(line.data(), "");
        assert!(line.is_comment_only());
        assert!(!line.is_blank());
    }

    #[test]
    fn bare_hash_is_an_empty_comment() {
        let line = LogicalLine::parse("#").expect("parse");
        assert_eq!(line.comment().as_deref(), Some(""));
        assert_eq!(line.to_string(), "#");
    }

    #[test]
    fn hash_inside_quotes_is_data() {
        let line = LogicalLine::parse(r#"survey a -title "Cave #2" # note"#).expect("parse");
        assert_eq!(line.data(), r#"survey a -title "Cave #2""#);
        assert_eq!(line.comment().as_deref(), Some(" note"));
    }

    #[test]
    fn trailing_backslash_continues_data() {
        let line = LogicalLine::parse("data normal from to \\").expect("parse");
        assert!(line.is_continued());
        assert_eq!(line.data(), "data normal from to ");
    }

    #[test]
    fn trailing_backslash_continues_comment() {
        let line = LogicalLine::parse("fix 1 0 0 0 # origin \\").expect("parse");
        assert!(line.is_continued());
        assert_eq!(line.comment().as_deref(), Some(" origin "));
    }

    #[test]
    fn escaped_backslash_does_not_continue() {
        let line = LogicalLine::parse("path C:\\\\").expect("parse");
        assert!(!line.is_continued());
        assert_eq!(line.data(), "path C:\\\\");
    }

    #[test]
    fn continuation_merge_concatenates_data() {
        let mut line = LogicalLine::parse("foo\\").expect("parse first");
        line.append(Fragment::parse("bar").expect("parse second"))
            .expect("append");
        assert_eq!(line.data(), "foobar");
        assert!(!line.is_continued());
        assert_eq!(line.fragments().len(), 2);
    }

    #[test]
    fn later_fragment_indent_is_discarded() {
        let mut line = LogicalLine::parse("  station 1 \\").expect("parse");
        line.append(Fragment::parse("      \"entrance\"").expect("fragment"))
            .expect("append");
        assert_eq!(line.indent(), "  ");
        assert_eq!(line.data(), "station 1 \"entrance\"");
    }

    #[test]
    fn comments_of_fragments_are_joined() {
        let mut line = LogicalLine::parse("a #one\\").expect("parse");
        line.append(Fragment::parse("b #two").expect("fragment"))
            .expect("append");
        assert_eq!(line.data(), "ab");
        assert_eq!(line.comment().as_deref(), Some("one two"));
    }

    #[test]
    fn append_to_closed_line_fails() {
        let mut line = LogicalLine::parse("endsurvey").expect("parse");
        let err = line
            .append(Fragment::parse("more").expect("fragment"))
            .unwrap_err();
        assert!(matches!(err, TherionError::Syntax { .. }));
    }

    #[test]
    fn embedded_line_break_fails() {
        let err = Fragment::parse("survey a\nendsurvey").unwrap_err();
        assert!(err.to_string().contains("embedded line break"), "got: {err}");
    }

    #[test]
    fn crlf_terminator_is_stripped() {
        let line = LogicalLine::parse("endsurvey\r\n").expect("parse");
        assert_eq!(line.data(), "endsurvey");
        assert_eq!(line.to_source(LineEnding::Crlf), "endsurvey\r\n");
    }

    #[test]
    fn parse_lines_merges_continuations_and_numbers_lines() {
        let lines = parse_lines(["survey a \\", "  -title \"A\"", "endsurvey"]).expect("parse");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].data(), "survey a -title \"A\"");
        assert_eq!(lines[0].line_number(), Some(1));
        assert_eq!(lines[1].line_number(), Some(3));
    }

    #[test]
    fn parse_lines_keeps_trailing_continuation() {
        let lines = parse_lines(["equate 1 \\"]).expect("parse");
        assert!(lines[0].is_continued());
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let lines = parse_lines(["survey a", "  station 1 \"unterminated"]).expect("parse");
        let err = lines[1].tokens().unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn round_trip_preserves_line_state() {
        let samples = [
            "survey test -title \"Test cave\"",
            "    0 1 200 -5 6.4",
            "  # comment only",
            "centreline  #   spaced comment",
            "data normal from to compass clino tape \\",
            "fix 1 0 0 0 # origin \\",
            "",
            "\t\tendcentreline",
            "#",
            "foo \\ # c",
        ];
        for sample in samples {
            let line = LogicalLine::parse(sample).expect("parse");
            let again =
                LogicalLine::parse(&line.to_source(LineEnding::Lf)).expect("reparse");
            assert_same_state(&line, &again);
            assert_eq!(line.separator(), again.separator(), "sample: {sample:?}");
        }
    }

    #[test]
    fn round_trip_of_data_wrapped_into_comment_line() {
        let lines = parse_lines(["data normal from to \\", "  # note"]).expect("parse");
        let line = &lines[0];
        assert_eq!(line.data(), "data normal from to");
        assert_eq!(line.separator(), " ");
        let again = LogicalLine::parse(&line.to_string()).expect("reparse");
        assert_same_state(line, &again);
        assert_eq!(line.separator(), again.separator());
    }

    #[test]
    fn continued_data_before_comment_keeps_spacing() {
        let line = LogicalLine::parse("foo \\ # c").expect("parse");
        assert_eq!(line.data(), "foo");
        assert_eq!(line.separator(), "  ");
        assert!(line.is_continued());
        assert_eq!(line.to_string(), "foo  # c\\");
    }

    #[test]
    fn round_trip_of_wrapped_line() {
        let lines = parse_lines(["a \\", "  b # one \\", "c # two"]).expect("parse");
        let line = &lines[0];
        let again = LogicalLine::parse(&line.to_string()).expect("reparse");
        assert_same_state(line, &again);
    }

    #[test]
    fn built_lines_serialize_with_default_separator() {
        let line = LogicalLine::new("  ", "station 1").with_comment("entrance");
        assert_eq!(line.to_string(), "  station 1 #entrance");
        let note = LogicalLine::comment_only("  ", "input a.th");
        assert_eq!(note.to_string(), "  #input a.th");
    }

    #[test]
    fn built_lines_honor_configured_separator() {
        let config = ParseConfig {
            comment_separator: "\t\t".to_string(),
            ..ParseConfig::default()
        };
        let line = LogicalLine::new_in(&config, "", "fix 1 0 0 0").with_comment(" origin");
        assert_eq!(line.to_string(), "fix 1 0 0 0\t\t# origin");
    }

    #[test]
    fn separator_is_configurable() {
        let mut line = LogicalLine::parse("station 1 # e").expect("parse");
        line.set_separator("\t");
        assert_eq!(line.to_string(), "station 1\t# e");
    }

    #[test]
    fn map_text_rewrites_data_and_comment() {
        let mut line = LogicalLine::parse("abc # def").expect("parse");
        line.map_text(|s| Ok(s.to_uppercase())).expect("map");
        assert_eq!(line.data(), "ABC");
        assert_eq!(line.comment().as_deref(), Some(" DEF"));
    }

    #[test]
    fn serialize_lines_uses_terminator() {
        let lines = parse_text("survey a\nendsurvey\n").expect("parse");
        assert_eq!(serialize_lines(&lines, LineEnding::Lf), "survey a\nendsurvey\n");
    }

    #[test]
    fn parse_text_strips_byte_order_mark() {
        let lines = parse_text("\u{feff}encoding utf-8\n").expect("parse");
        assert_eq!(lines[0].data(), "encoding utf-8");
    }
}

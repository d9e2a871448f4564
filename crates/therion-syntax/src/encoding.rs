//! Declared encodings and the transcoding seam.
//!
//! Source text is held as UTF-8 in memory. An `encoding` directive only
//! records which character set the file claims; moving lines between files
//! goes through a [`Transcoder`].

use therion_common::config::ParseConfig;
use therion_common::error::{Result, TherionError};
use therion_common::types::Encoding;

use crate::parser::{Directive, LogicalLine};

/// Converts text between declared encodings.
pub trait Transcoder {
    /// Re-encodes `text` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the text cannot be represented in `to`.
    fn transcode(&self, text: &str, from: Encoding, to: Encoding) -> Result<String>;
}

/// Passes text through unchanged after checking it fits the target set.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckedTranscoder;

impl Transcoder for CheckedTranscoder {
    fn transcode(&self, text: &str, from: Encoding, to: Encoding) -> Result<String> {
        if from == to {
            return Ok(text.to_string());
        }
        match text.chars().find(|&c| to.can_represent(c) == Some(false)) {
            Some(c) => Err(TherionError::encoding(format!(
                "character {c:?} from {from} text cannot be written as {to}"
            ))),
            None => Ok(text.to_string()),
        }
    }
}

/// Position and value of a buffer's first `encoding` directive.
///
/// # Errors
///
/// Returns a syntax error if the directive has no name, and an encoding
/// error if the name is unknown or unsupported by `config`.
pub fn find_encoding(
    lines: &[LogicalLine],
    config: &ParseConfig,
) -> Result<Option<(usize, Encoding)>> {
    for (idx, line) in lines.iter().enumerate() {
        let Some(keyword) = line.keyword()? else {
            continue;
        };
        if !Directive::Encoding.matches(&keyword) {
            continue;
        }
        let tokens = line.tokens()?;
        let name = tokens.get(1).ok_or_else(|| {
            TherionError::syntax_at(line.line_number(), "encoding directive without a name")
        })?;
        return Ok(Some((idx, config.supported_encoding(name.value())?)));
    }
    Ok(None)
}

/// The encoding a buffer declares, or the configured default.
///
/// # Errors
///
/// See [`find_encoding`].
pub fn declared_encoding(lines: &[LogicalLine], config: &ParseConfig) -> Result<Encoding> {
    Ok(find_encoding(lines, config)?.map_or(config.default_encoding, |(_, enc)| enc))
}

/// Re-encodes the data and comment of every line in place.
///
/// # Errors
///
/// Propagates the first transcoding failure.
pub fn transcode_lines<T: Transcoder + ?Sized>(
    transcoder: &T,
    lines: &mut [LogicalLine],
    from: Encoding,
    to: Encoding,
) -> Result<()> {
    if from == to {
        return Ok(());
    }
    for line in lines {
        line.map_text(|text| transcoder.transcode(text, from, to))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_text;

    #[test]
    fn first_directive_wins() {
        let lines = parse_text("# header\nencoding iso8859-2\nencoding utf-8\n").expect("parse");
        let config = ParseConfig::default();
        assert_eq!(
            find_encoding(&lines, &config).expect("find"),
            Some((1, Encoding::Iso8859_2))
        );
        assert_eq!(
            declared_encoding(&lines, &config).expect("declared"),
            Encoding::Iso8859_2
        );
    }

    #[test]
    fn quoted_keyword_is_not_a_directive() {
        let lines = parse_text("\"encoding\" cp1250\nencoding ascii\n").expect("parse");
        assert_eq!(
            find_encoding(&lines, &ParseConfig::default()).expect("find"),
            Some((1, Encoding::Ascii))
        );
    }

    #[test]
    fn missing_directive_uses_default() {
        let lines = parse_text("survey a\nendsurvey\n").expect("parse");
        assert_eq!(
            declared_encoding(&lines, &ParseConfig::default()).expect("declared"),
            Encoding::Utf8
        );
    }

    #[test]
    fn bad_names_are_rejected() {
        let config = ParseConfig::default();
        let unknown = parse_text("encoding klingon\n").expect("parse");
        assert!(matches!(
            declared_encoding(&unknown, &config),
            Err(TherionError::Encoding { .. })
        ));

        let nameless = parse_text("encoding\n").expect("parse");
        assert!(matches!(
            declared_encoding(&nameless, &config),
            Err(TherionError::Syntax { .. })
        ));
    }

    #[test]
    fn unsupported_by_config_is_rejected() {
        let config = ParseConfig {
            supported_encodings: vec![Encoding::Utf8],
            ..ParseConfig::default()
        };
        let lines = parse_text("encoding cp1250\n").expect("parse");
        assert!(declared_encoding(&lines, &config).is_err());
    }

    #[test]
    fn checked_transcoder_rejects_unrepresentable() {
        let t = CheckedTranscoder;
        assert_eq!(
            t.transcode("Jaskinia", Encoding::Utf8, Encoding::Ascii)
                .expect("ascii fits"),
            "Jaskinia"
        );
        assert!(t.transcode("Žleb", Encoding::Utf8, Encoding::Ascii).is_err());
        assert!(t.transcode("Žleb", Encoding::Utf8, Encoding::Utf8).is_ok());
    }

    #[test]
    fn transcode_lines_touches_data_and_comment() {
        let mut lines = parse_text("title \"Žleb\"\n").expect("parse");
        let err = transcode_lines(&CheckedTranscoder, &mut lines, Encoding::Utf8, Encoding::Ascii);
        assert!(matches!(err, Err(TherionError::Encoding { .. })));

        let mut commented = parse_text("title x # Žleb\n").expect("parse");
        assert!(
            transcode_lines(
                &CheckedTranscoder,
                &mut commented,
                Encoding::Utf8,
                Encoding::Iso8859_1
            )
            .is_err()
        );
    }
}

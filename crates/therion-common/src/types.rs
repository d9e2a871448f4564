//! Domain primitive types used across the Therion workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TherionError};

/// A character set that may be declared by an `encoding` directive.
///
/// Only the names are tracked here; the byte-level transcoding tables live
/// outside the text core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Encoding {
    /// 7-bit US-ASCII.
    #[serde(rename = "ASCII")]
    Ascii,
    /// Windows Central European.
    #[serde(rename = "CP1250")]
    Cp1250,
    /// Windows Cyrillic.
    #[serde(rename = "CP1251")]
    Cp1251,
    /// Windows Western European.
    #[serde(rename = "CP1252")]
    Cp1252,
    /// Windows Greek.
    #[serde(rename = "CP1253")]
    Cp1253,
    /// Latin-1.
    #[serde(rename = "ISO8859-1")]
    Iso8859_1,
    /// Latin-2.
    #[serde(rename = "ISO8859-2")]
    Iso8859_2,
    /// Latin/Cyrillic.
    #[serde(rename = "ISO8859-5")]
    Iso8859_5,
    /// Latin/Greek.
    #[serde(rename = "ISO8859-7")]
    Iso8859_7,
    /// Unicode, UTF-8 encoded.
    #[serde(rename = "UTF-8")]
    Utf8,
}

impl Encoding {
    /// Every encoding name the core knows about.
    pub const ALL: [Self; 10] = [
        Self::Ascii,
        Self::Cp1250,
        Self::Cp1251,
        Self::Cp1252,
        Self::Cp1253,
        Self::Iso8859_1,
        Self::Iso8859_2,
        Self::Iso8859_5,
        Self::Iso8859_7,
        Self::Utf8,
    ];

    /// Returns the canonical spelling used in `encoding` directives.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Cp1250 => "CP1250",
            Self::Cp1251 => "CP1251",
            Self::Cp1252 => "CP1252",
            Self::Cp1253 => "CP1253",
            Self::Iso8859_1 => "ISO8859-1",
            Self::Iso8859_2 => "ISO8859-2",
            Self::Iso8859_5 => "ISO8859-5",
            Self::Iso8859_7 => "ISO8859-7",
            Self::Utf8 => "UTF-8",
        }
    }

    /// Reports whether `c` is representable in this character set.
    ///
    /// Returns `None` for single-byte code pages whose tables are not
    /// carried by the core.
    #[must_use]
    pub fn can_represent(self, c: char) -> Option<bool> {
        match self {
            Self::Ascii => Some(c.is_ascii()),
            Self::Iso8859_1 => Some(u32::from(c) <= 0xFF),
            Self::Utf8 => Some(true),
            _ if c.is_ascii() => Some(true),
            _ => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = TherionError;

    /// Parses an encoding name case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TherionError::encoding(format!("unknown encoding name: {s}")))
    }
}

/// Physical line terminator used when serializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Returns the terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => write!(f, "lf"),
            Self::Crlf => write!(f, "crlf"),
        }
    }
}

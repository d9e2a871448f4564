//! Keyword table for block tags and the directives the core interprets.
//!
//! Matching is case-insensitive. `centreline` also accepts the
//! `centerline` spelling for both its start and end keywords.

use std::fmt;

use serde::Serialize;

/// A block type delimited by a start keyword and its `end` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextTag {
    /// `survey` / `endsurvey`
    Survey,
    /// `centreline` / `endcentreline`
    Centreline,
    /// `map` / `endmap`
    Map,
    /// `surface` / `endsurface`
    Surface,
    /// `scrap` / `endscrap`
    Scrap,
    /// `line` / `endline`
    Line,
    /// `area` / `endarea`
    Area,
}

/// Table rows are indexed by the tag's discriminant.
struct KeywordEntry {
    tag: ContextTag,
    starts: &'static [&'static str],
    ends: &'static [&'static str],
}

static KEYWORDS: [KeywordEntry; 7] = [
    KeywordEntry {
        tag: ContextTag::Survey,
        starts: &["survey"],
        ends: &["endsurvey"],
    },
    KeywordEntry {
        tag: ContextTag::Centreline,
        starts: &["centreline", "centerline"],
        ends: &["endcentreline", "endcenterline"],
    },
    KeywordEntry {
        tag: ContextTag::Map,
        starts: &["map"],
        ends: &["endmap"],
    },
    KeywordEntry {
        tag: ContextTag::Surface,
        starts: &["surface"],
        ends: &["endsurface"],
    },
    KeywordEntry {
        tag: ContextTag::Scrap,
        starts: &["scrap"],
        ends: &["endscrap"],
    },
    KeywordEntry {
        tag: ContextTag::Line,
        starts: &["line"],
        ends: &["endline"],
    },
    KeywordEntry {
        tag: ContextTag::Area,
        starts: &["area"],
        ends: &["endarea"],
    },
];

fn matches_any(spellings: &[&str], word: &str) -> bool {
    spellings.iter().any(|s| s.eq_ignore_ascii_case(word))
}

impl ContextTag {
    /// All block tags.
    pub const ALL: [Self; 7] = [
        Self::Survey,
        Self::Centreline,
        Self::Map,
        Self::Surface,
        Self::Scrap,
        Self::Line,
        Self::Area,
    ];

    fn entry(self) -> &'static KeywordEntry {
        &KEYWORDS[self as usize]
    }

    /// Canonical start keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        self.entry().starts[0]
    }

    /// Canonical end keyword.
    #[must_use]
    pub fn end_keyword(self) -> &'static str {
        self.entry().ends[0]
    }

    /// Whether `word` opens a block of this tag.
    #[must_use]
    pub fn matches_start(self, word: &str) -> bool {
        matches_any(self.entry().starts, word)
    }

    /// Whether `word` closes a block of this tag.
    #[must_use]
    pub fn matches_end(self, word: &str) -> bool {
        matches_any(self.entry().ends, word)
    }

    /// The tag opened by `word`, if any.
    #[must_use]
    pub fn from_start(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|e| matches_any(e.starts, word))
            .map(|e| e.tag)
    }

    /// The tag closed by `word`, if any.
    #[must_use]
    pub fn from_end(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|e| matches_any(e.ends, word))
            .map(|e| e.tag)
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A directive interpreted by the core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `encoding <name>`
    Encoding,
    /// `input <path>`
    Input,
}

impl Directive {
    /// Canonical keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Encoding => "encoding",
            Self::Input => "input",
        }
    }

    /// Whether `word` is this directive.
    #[must_use]
    pub fn matches(self, word: &str) -> bool {
        self.keyword().eq_ignore_ascii_case(word)
    }
}

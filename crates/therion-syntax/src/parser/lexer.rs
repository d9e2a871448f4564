//! Tokenization of logical-line data using `nom`.
//!
//! Produces a stream of [`Token`]s from the unwrapped data of one logical
//! line. Fields are separated by whitespace and come in four shapes:
//! `[bracketed values]`, `"quoted ""strings"""`, bare words, and the empty
//! markers `""` / `[]`.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
};
use serde::Serialize;
use therion_common::error::{Result, TherionError};

/// How a token was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// An unquoted word.
    Bare,
    /// A `"..."` string with `""` standing for one `"`.
    Quoted,
    /// A `[...]` value, typically a number with units.
    Bracketed,
    /// `""` or `[]`.
    Empty,
}

/// One atomic data field, already unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    kind: TokenKind,
    value: String,
}

impl Token {
    /// Creates a token from its kind and unescaped value.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// How the token was written.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The unescaped value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the token, returning its unescaped value.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }

    /// Escaped source form of the value.
    #[must_use]
    pub fn to_source(&self) -> String {
        escape(&self.value)
    }
}

/// Characters that may appear in a bare word.
fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '[' | ']' | '#')
}

/// Parses a `[...]` value; `[]` yields an empty token.
fn bracketed(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('[')(input)?;
    match input.find(']') {
        Some(0) => Ok((&input[1..], Token::new(TokenKind::Empty, ""))),
        Some(end) => Ok((
            &input[end + 1..],
            Token::new(TokenKind::Bracketed, &input[..end]),
        )),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

/// Parses a `"..."` string where `""` stands for one literal quote.
fn quoted(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('"')(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices().peekable();
    loop {
        match chars.next() {
            Some((idx, '"')) => {
                if let Some(&(_, '"')) = chars.peek() {
                    let _ = chars.next();
                    result.push('"');
                    continue;
                }
                let remaining = &input[idx + 1..];
                let kind = if result.is_empty() {
                    TokenKind::Empty
                } else {
                    TokenKind::Quoted
                };
                return Ok((remaining, Token::new(kind, result)));
            }
            Some((_, c)) => result.push(c),
            None => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )));
            }
        }
    }
}

/// Parses a bare word.
fn bare(input: &str) -> IResult<&str, Token> {
    map(take_while1(is_bare_char), |word: &str| {
        Token::new(TokenKind::Bare, word)
    })
    .parse(input)
}

/// Parses a single token, in priority order.
fn single_token(input: &str) -> IResult<&str, Token> {
    alt((bracketed, quoted, bare)).parse(input)
}

/// Tokenizes the unwrapped data of a logical line.
///
/// # Errors
///
/// Returns a syntax error on an unterminated `"` or `[`, a stray `]`, or a
/// token glued to the next one without whitespace.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let (mut remaining, _) = skip_whitespace(input)?;

    while !remaining.is_empty() {
        let (rest, token) = single_token(remaining).map_err(|e| {
            TherionError::syntax(format!(
                "malformed quoting at \"{}\" ({e})",
                preview(remaining)
            ))
        })?;
        if rest.starts_with(|c: char| !c.is_whitespace()) {
            return Err(TherionError::syntax(format!(
                "missing whitespace after token at \"{}\"",
                preview(rest)
            )));
        }
        tokens.push(token);
        let (rest, _) = skip_whitespace(rest)?;
        remaining = rest;
    }

    Ok(tokens)
}

fn skip_whitespace(input: &str) -> Result<(&str, &str)> {
    multispace0::<&str, nom::error::Error<&str>>
        .parse(input)
        .map_err(|e| TherionError::syntax(format!("lexer error skipping whitespace: {e}")))
}

fn preview(input: &str) -> &str {
    let end = input
        .char_indices()
        .nth(20)
        .map_or(input.len(), |(idx, _)| idx);
    &input[..end]
}

/// Whether a whitespace-containing value reads as a number with extras.
fn looks_numeric(value: &str) -> bool {
    value.split_whitespace().next().is_some_and(|word| {
        word.parse::<f64>().is_ok() && word.chars().any(|c| c.is_ascii_digit())
    })
}

/// Escapes a value so that it tokenizes back to exactly one token.
///
/// The empty string becomes `""`; bare-safe words stay unquoted;
/// whitespace-containing numeric values use brackets; everything else is
/// double-quoted with inner quotes doubled.
#[must_use]
pub fn escape(value: &str) -> String {
    if value.is_empty() {
        return "\"\"".to_string();
    }
    if value.chars().all(is_bare_char) && !value.ends_with('\\') {
        return value.to_string();
    }
    if value.contains(char::is_whitespace)
        && looks_numeric(value)
        && !value.contains(['[', ']', '#', '"'])
    {
        return format!("[{value}]");
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Unescapes one token's source text.
///
/// # Errors
///
/// Returns a syntax error if the text is not exactly one token.
pub fn unescape(source: &str) -> Result<String> {
    let (rest, token) = single_token(source).map_err(|e| {
        TherionError::syntax(format!(
            "malformed quoting at \"{}\" ({e})",
            preview(source)
        ))
    })?;
    if rest.is_empty() {
        Ok(token.into_value())
    } else {
        Err(TherionError::syntax(format!(
            "trailing text after token: \"{}\"",
            preview(rest)
        )))
    }
}

/// Escapes and joins values into one line of data.
#[must_use]
pub fn join_fields<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| escape(v.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<String> {
        tokenize(input)
            .expect("should tokenize")
            .into_iter()
            .map(Token::into_value)
            .collect()
    }

    #[test]
    fn tokenize_bare_words() {
        assert_eq!(
            values("data normal from to compass clino tape"),
            vec!["data", "normal", "from", "to", "compass", "clino", "tape"]
        );
    }

    #[test]
    fn tokenize_numbers_and_references() {
        assert_eq!(
            values("  0 1 200 -5 6.4  "),
            vec!["0", "1", "200", "-5", "6.4"]
        );
        assert_eq!(values("equate 1@a.b 2@c"), vec!["equate", "1@a.b", "2@c"]);
    }

    #[test]
    fn tokenize_quoted_with_doubled_quotes() {
        let tokens = tokenize(r#"-title "The ""Big"" Cave""#).expect("should tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind(), TokenKind::Quoted);
        assert_eq!(tokens[1].value(), r#"The "Big" Cave"#);
    }

    #[test]
    fn tokenize_bracketed_value() {
        let tokens = tokenize("declination [2.5 degrees]").expect("should tokenize");
        assert_eq!(tokens[1], Token::new(TokenKind::Bracketed, "2.5 degrees"));
    }

    #[test]
    fn tokenize_empty_markers() {
        let tokens = tokenize(r#"a "" [] b"#).expect("should tokenize");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], Token::new(TokenKind::Empty, ""));
        assert_eq!(tokens[2], Token::new(TokenKind::Empty, ""));
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(tokenize("").expect("should tokenize").is_empty());
        assert!(tokenize("   \t ").expect("should tokenize").is_empty());
    }

    #[test]
    fn tokenize_error_on_unterminated_quote() {
        let err = tokenize(r#"survey "open"#).unwrap_err();
        assert!(err.to_string().contains("malformed quoting"), "got: {err}");
    }

    #[test]
    fn tokenize_error_on_unterminated_bracket() {
        assert!(tokenize("declination [2.5").is_err());
    }

    #[test]
    fn tokenize_error_on_stray_bracket() {
        assert!(tokenize("a ] b").is_err());
    }

    #[test]
    fn tokenize_error_on_glued_tokens() {
        let err = tokenize(r#""abc"def"#).unwrap_err();
        assert!(err.to_string().contains("missing whitespace"), "got: {err}");
        assert!(tokenize("word\"quoted\"").is_err());
    }

    #[test]
    fn escape_chooses_representation() {
        assert_eq!(escape(""), "\"\"");
        assert_eq!(escape("1@a.b"), "1@a.b");
        assert_eq!(escape("2.5 degrees"), "[2.5 degrees]");
        assert_eq!(escape("Big Cave"), "\"Big Cave\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("a#b"), "\"a#b\"");
        assert_eq!(escape("dir\\"), "\"dir\\\"");
    }

    #[test]
    fn escape_unescape_round_trip() {
        let samples = [
            "",
            "plain",
            "-5",
            "1@a.b",
            "two words",
            "10 m",
            "-3.5e2 deg",
            "\"",
            "\"\"",
            "quote \" inside",
            "[bracketed]",
            "1 [x]",
            "tab\tseparated",
            "a#b",
            "trailing\\",
            "  padded  ",
            "ünïcödé text",
        ];
        for s in samples {
            let escaped = escape(s);
            assert_eq!(unescape(&escaped).expect("unescape"), s, "escaped: {escaped}");
            let tokens = tokenize(&escaped).expect("tokenize");
            assert_eq!(tokens.len(), 1, "escaped: {escaped}");
        }
    }

    #[test]
    fn unescape_rejects_two_tokens() {
        assert!(unescape("a b").is_err());
    }

    #[test]
    fn join_fields_tokenizes_back() {
        let fields = ["survey", "main", "-title", "Main Cave", ""];
        let joined = join_fields(&fields);
        assert_eq!(values(&joined), fields.to_vec());
    }
}

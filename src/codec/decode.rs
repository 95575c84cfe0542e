//! Decoding of management CLI response text.
//!
//! CLI responses arrive as nested records in a Lisp-like syntax:
//!
//! ```text
//! {
//!     "outcome" => "success",
//!     "result" => {
//!         "min-pool-size" => 5,
//!         "statistics" => undefined,
//!         "connection-properties" => [("URL" => "jdbc:h2:mem"), ("User" => "sa")],
//!         "bytes-read" => 1024L
//!     }
//! }
//! ```
//!
//! Decoding is a single pass through a string-literal-aware tokenizer and a
//! recursive-descent parser, so multi-line string values (failure
//! descriptions in particular) and nested tuple groups need no textual
//! pre-rewriting. Long-integer `L` suffixes are dropped, `undefined` maps
//! to null, and `(...)` tuple records parse like `{...}` records.

use crate::error::{CodecError, Result, WildsyncError};
use crate::model::{AttributeMap, CliValue};

/// Outcome of a decoded CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliResult {
    /// The operation succeeded; carries the `result` payload.
    Success(CliValue),
    /// The operation failed; carries the server-supplied diagnostic.
    Failure(String),
}

impl CliResult {
    /// Returns the success payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&CliValue> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }
}

/// Decodes raw CLI response text into a classified result.
///
/// # Errors
///
/// Returns a [`CodecError::Parse`] if the text is not a well-formed
/// response record.
pub fn decode(raw: &str) -> Result<CliResult> {
    let mut parser = Parser::new(raw);
    let value = parser.parse_value()?;
    parser.expect_end()?;

    let Some(map) = value.as_map() else {
        return Err(parse_err(0, "expected a response record at top level"));
    };

    if map.get("outcome").and_then(CliValue::as_str) == Some("failed") {
        let description = map
            .get("failure-description")
            .map_or_else(|| String::from("unknown failure"), render_diagnostic);
        return Ok(CliResult::Failure(description));
    }

    let payload = map.get("result").cloned().unwrap_or(CliValue::Null);
    Ok(CliResult::Success(normalize(payload)))
}

/// Renders a failure-description value as plain text.
///
/// Descriptions are usually strings but can be records or lists of
/// sub-operation diagnostics.
fn render_diagnostic(value: &CliValue) -> String {
    match value {
        CliValue::Str(s) => s.clone(),
        CliValue::Null => String::from("undefined"),
        CliValue::Bool(b) => b.to_string(),
        CliValue::Int(i) => i.to_string(),
        CliValue::List(items) => items
            .iter()
            .map(render_diagnostic)
            .collect::<Vec<_>>()
            .join("; "),
        CliValue::Record(map) | CliValue::Tree(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_diagnostic(v)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// Normalizes a decoded payload: boolean-like string tokens become real
/// booleans, recursively.
fn normalize(value: CliValue) -> CliValue {
    match value {
        CliValue::Str(s) if s == "true" => CliValue::Bool(true),
        CliValue::Str(s) if s == "false" => CliValue::Bool(false),
        CliValue::List(items) => CliValue::List(items.into_iter().map(normalize).collect()),
        CliValue::Record(map) | CliValue::Tree(map) => CliValue::Tree(
            map.iter()
                .map(|(k, v)| (k.to_string(), normalize(v.clone())))
                .collect::<AttributeMap>(),
        ),
        other => other,
    }
}

fn parse_err(offset: usize, message: impl Into<String>) -> WildsyncError {
    WildsyncError::Codec(CodecError::parse(offset, message))
}

/// Recursive-descent parser over the response byte stream.
struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            input: raw.as_bytes(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.pos).copied()
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(parse_err(
                self.pos,
                format!("expected '{}', found '{}'", expected as char, b as char),
            )),
            None => Err(parse_err(
                self.pos,
                format!("expected '{}', found end of input", expected as char),
            )),
        }
    }

    /// Consumes the `=>` association arrow.
    fn expect_arrow(&mut self) -> Result<()> {
        self.expect_byte(b'=')?;
        if self.input.get(self.pos) == Some(&b'>') {
            self.pos += 1;
            Ok(())
        } else {
            Err(parse_err(self.pos, "expected '=>'"))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        if self.peek().is_some() {
            return Err(parse_err(self.pos, "trailing content after response record"));
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<CliValue> {
        match self.peek() {
            Some(b'"') => Ok(CliValue::Str(self.parse_string()?)),
            Some(b'{') => self.parse_record(b'{', b'}'),
            Some(b'(') => self.parse_record(b'(', b')'),
            Some(b'[') => self.parse_list(),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.parse_int(),
            Some(b) if b.is_ascii_alphabetic() => self.parse_keyword(),
            Some(b) => Err(parse_err(
                self.pos,
                format!("unexpected character '{}'", b as char),
            )),
            None => Err(parse_err(self.pos, "unexpected end of input")),
        }
    }

    /// Parses a quoted string. Escapes and embedded physical newlines are
    /// both accepted; the CLI emits multi-line failure descriptions as one
    /// string literal spanning several lines.
    fn parse_string(&mut self) -> Result<String> {
        self.expect_byte(b'"')?;
        let mut out = Vec::new();
        loop {
            match self.input.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    return String::from_utf8(out)
                        .map_err(|_| parse_err(self.pos, "invalid UTF-8 in string literal"));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escaped = self
                        .input
                        .get(self.pos)
                        .ok_or_else(|| parse_err(self.pos, "unterminated escape"))?;
                    out.push(match escaped {
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b't' => b'\t',
                        other => *other,
                    });
                    self.pos += 1;
                }
                Some(b) => {
                    out.push(*b);
                    self.pos += 1;
                }
                None => return Err(parse_err(self.pos, "unterminated string literal")),
            }
        }
    }

    /// Parses an integer, dropping a long-integer `L` suffix if present.
    fn parse_int(&mut self) -> Result<CliValue> {
        let start = self.pos;
        if self.input.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        while self
            .input
            .get(self.pos)
            .is_some_and(u8::is_ascii_digit)
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| parse_err(start, "invalid integer"))?;
        let value: i64 = text
            .parse()
            .map_err(|_| parse_err(start, format!("invalid integer '{text}'")))?;
        if self.input.get(self.pos) == Some(&b'L') {
            self.pos += 1;
        }
        Ok(CliValue::Int(value))
    }

    /// Parses `undefined`, `true` or `false`.
    fn parse_keyword(&mut self) -> Result<CliValue> {
        let start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(u8::is_ascii_alphabetic)
        {
            self.pos += 1;
        }
        match &self.input[start..self.pos] {
            b"undefined" => Ok(CliValue::Null),
            b"true" => Ok(CliValue::Bool(true)),
            b"false" => Ok(CliValue::Bool(false)),
            other => Err(parse_err(
                start,
                format!(
                    "unknown token '{}'",
                    String::from_utf8_lossy(other)
                ),
            )),
        }
    }

    /// Parses a record delimited by `{}` or `()`: tuple groups inside
    /// arrays use parentheses but carry the same key/value structure.
    fn parse_record(&mut self, open: u8, close: u8) -> Result<CliValue> {
        self.expect_byte(open)?;
        let mut map = AttributeMap::new();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(CliValue::Tree(map));
        }
        loop {
            let key = self.parse_string()?;
            self.expect_arrow()?;
            let value = self.parse_value()?;
            map.insert(key, value);
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(CliValue::Tree(map));
                }
                _ => return Err(parse_err(self.pos, "expected ',' or record close")),
            }
        }
    }

    fn parse_list(&mut self) -> Result<CliValue> {
        self.expect_byte(b'[')?;
        let mut items = Vec::new();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(CliValue::List(items));
        }
        loop {
            items.push(self.parse_value()?);
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(CliValue::List(items));
                }
                _ => return Err(parse_err(self.pos, "expected ',' or ']'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;

    #[test]
    fn test_decode_success_payload() {
        let raw = r#"{
            "outcome" => "success",
            "result" => {
                "jndi-name" => "java:/OracleDS",
                "min-pool-size" => 5,
                "statistics" => undefined
            }
        }"#;

        let result = decode(raw).unwrap();
        let CliResult::Success(payload) = result else {
            panic!("expected success");
        };
        let map = payload.as_map().unwrap();
        assert_eq!(map.get("jndi-name"), Some(&CliValue::from("java:/OracleDS")));
        assert_eq!(map.get("min-pool-size"), Some(&CliValue::Int(5)));
        assert_eq!(map.get("statistics"), Some(&CliValue::Null));
    }

    #[test]
    fn test_decode_failure_classification() {
        let raw = r#"{
            "outcome" => "failed",
            "failure-description" => "X",
            "rolled-back" => true
        }"#;

        assert_eq!(decode(raw).unwrap(), CliResult::Failure(String::from("X")));
    }

    #[test]
    fn test_decode_multi_line_failure_description() {
        let raw = "{\n    \"outcome\" => \"failed\",\n    \"failure-description\" => \"JBAS014807: Management resource\nnot found\",\n    \"rolled-back\" => true\n}";

        let result = decode(raw).unwrap();
        assert_eq!(
            result,
            CliResult::Failure(String::from(
                "JBAS014807: Management resource\nnot found"
            ))
        );
    }

    #[test]
    fn test_decode_tuple_array_as_records() {
        let raw = r#"{
            "outcome" => "success",
            "result" => [("a" => 1, "b" => 2), ("a" => 3, "b" => 4)]
        }"#;

        let result = decode(raw).unwrap();
        let CliResult::Success(CliValue::List(items)) = result else {
            panic!("expected a list payload");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_map().unwrap().get("a"), Some(&CliValue::Int(1)));
        assert_eq!(items[1].as_map().unwrap().get("b"), Some(&CliValue::Int(4)));
    }

    #[test]
    fn test_decode_nested_tuple_groups() {
        let raw = r#"{
            "outcome" => "success",
            "result" => [("outer" => [("inner" => 1)])]
        }"#;

        let result = decode(raw).unwrap();
        let CliResult::Success(CliValue::List(items)) = result else {
            panic!("expected a list payload");
        };
        let CliValue::List(inner) = items[0].as_map().unwrap().get("outer").unwrap() else {
            panic!("expected nested list");
        };
        assert_eq!(
            inner[0].as_map().unwrap().get("inner"),
            Some(&CliValue::Int(1))
        );
    }

    #[test]
    fn test_decode_long_suffix() {
        let raw = r#"{"outcome" => "success", "result" => {"bytes" => 1024L}}"#;
        let result = decode(raw).unwrap();
        let CliResult::Success(payload) = result else {
            panic!("expected success");
        };
        assert_eq!(
            payload.as_map().unwrap().get("bytes"),
            Some(&CliValue::Int(1024))
        );
    }

    #[test]
    fn test_decode_normalizes_boolean_strings() {
        let raw = r#"{"outcome" => "success", "result" => {"enabled" => "true", "jta" => false}}"#;
        let CliResult::Success(payload) = decode(raw).unwrap() else {
            panic!("expected success");
        };
        let map = payload.as_map().unwrap();
        assert_eq!(map.get("enabled"), Some(&CliValue::Bool(true)));
        assert_eq!(map.get("jta"), Some(&CliValue::Bool(false)));
    }

    #[test]
    fn test_decode_missing_result_is_null() {
        let raw = r#"{"outcome" => "success"}"#;
        assert_eq!(decode(raw).unwrap(), CliResult::Success(CliValue::Null));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not a record").is_err());
        assert!(decode(r#"{"outcome" => }"#).is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn test_round_trip_flat_record_subset() {
        let value = CliValue::record([
            ("name", CliValue::from("h2")),
            ("size", CliValue::Int(20)),
            ("enabled", CliValue::Bool(true)),
            ("slot", CliValue::Null),
            ("tags", CliValue::from(vec!["a", "b"])),
        ]);

        let wrapped = format!(
            "{{\"outcome\" => \"success\", \"result\" => {}}}",
            encode(&value).unwrap().replace("=>", " => ")
        );
        let CliResult::Success(decoded) = decode(&wrapped).unwrap() else {
            panic!("expected success");
        };
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_failure_description_record_rendered() {
        let raw = r#"{
            "outcome" => "failed",
            "failure-description" => {"JBAS014671" => "Failed services"}
        }"#;
        let CliResult::Failure(text) = decode(raw).unwrap() else {
            panic!("expected failure");
        };
        assert!(text.contains("JBAS014671"));
        assert!(text.contains("Failed services"));
    }
}

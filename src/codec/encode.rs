//! Encoding of typed values into CLI literal syntax.

use crate::error::{CodecError, Result, WildsyncError};
use crate::model::CliValue;

/// Encodes a value into the management CLI's literal syntax.
///
/// | Value       | Encoding                          |
/// |-------------|-----------------------------------|
/// | Null        | `undefined`                       |
/// | Bool        | `true` / `false`                  |
/// | Int         | decimal digits, no quoting        |
/// | Str         | wrapped in double quotes          |
/// | List        | `[v1,v2,...]`                     |
/// | Record      | `{"key"=>value,...}`              |
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedValueShape`] for expandable attribute
/// trees: those are reserved for recursive child-resource traversal and
/// must never be inlined.
pub fn encode(value: &CliValue) -> Result<String> {
    match value {
        CliValue::Null => Ok(String::from("undefined")),
        CliValue::Bool(b) => Ok(b.to_string()),
        CliValue::Int(i) => Ok(i.to_string()),
        CliValue::Str(s) => Ok(format!("\"{}\"", escape(s))),
        CliValue::List(items) => {
            let encoded: Result<Vec<String>> = items.iter().map(encode).collect();
            Ok(format!("[{}]", encoded?.join(",")))
        }
        CliValue::Record(map) => {
            let mut parts = Vec::with_capacity(map.len());
            for (key, val) in map.iter() {
                parts.push(format!("\"{}\"=>{}", escape(key), encode(val)?));
            }
            Ok(format!("{{{}}}", parts.join(",")))
        }
        CliValue::Tree(_) => Err(WildsyncError::Codec(CodecError::UnsupportedValueShape)),
    }
}

/// Escapes backslashes and double quotes for embedding in a quoted literal.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeMap;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&CliValue::Null).unwrap(), "undefined");
        assert_eq!(encode(&CliValue::Bool(true)).unwrap(), "true");
        assert_eq!(encode(&CliValue::Bool(false)).unwrap(), "false");
        assert_eq!(encode(&CliValue::Int(42)).unwrap(), "42");
        assert_eq!(encode(&CliValue::Int(-7)).unwrap(), "-7");
        assert_eq!(
            encode(&CliValue::from("java:/OracleDS")).unwrap(),
            "\"java:/OracleDS\""
        );
    }

    #[test]
    fn test_encode_list() {
        let value = CliValue::from(vec!["FILE", "CONSOLE"]);
        assert_eq!(encode(&value).unwrap(), "[\"FILE\",\"CONSOLE\"]");
    }

    #[test]
    fn test_encode_nested_list() {
        let value = CliValue::List(vec![
            CliValue::Int(1),
            CliValue::List(vec![CliValue::Int(2), CliValue::Null]),
        ]);
        assert_eq!(encode(&value).unwrap(), "[1,[2,undefined]]");
    }

    #[test]
    fn test_encode_flat_record() {
        let value = CliValue::record([
            ("relative-to", CliValue::from("jboss.server.log.dir")),
            ("path", CliValue::from("server.log")),
        ]);
        assert_eq!(
            encode(&value).unwrap(),
            "{\"relative-to\"=>\"jboss.server.log.dir\",\"path\"=>\"server.log\"}"
        );
    }

    #[test]
    fn test_encode_rejects_attribute_tree() {
        let value = CliValue::Tree(AttributeMap::new());
        let err = encode(&value).unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Codec(CodecError::UnsupportedValueShape)
        ));
    }

    #[test]
    fn test_encode_escapes_quotes() {
        let value = CliValue::from("say \"hi\"");
        assert_eq!(encode(&value).unwrap(), "\"say \\\"hi\\\"\"");
    }
}

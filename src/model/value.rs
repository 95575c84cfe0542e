//! Typed attribute values and attribute maps.
//!
//! `CliValue` is the tagged union of every value shape a management resource
//! attribute can hold. The distinction between [`CliValue::Record`] and
//! [`CliValue::Tree`] is resolved at construction time: a `Record` is a flat
//! record meant to be inlined into CLI literal syntax, while a `Tree` is an
//! expandable attribute tree that the reconciler walks recursively into
//! child resource addresses. The codec refuses to inline-encode a `Tree`.

/// A typed management attribute value.
#[derive(Debug, Clone)]
pub enum CliValue {
    /// The undefined value (`undefined` in CLI syntax).
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Vec<CliValue>),
    /// A flat record, inlined into CLI syntax as `{"k"=>v,...}`.
    Record(AttributeMap),
    /// An expandable attribute tree, traversed as child resources.
    Tree(AttributeMap),
}

impl CliValue {
    /// Builds a flat record from key/value pairs.
    pub fn record<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CliValue)>,
    {
        Self::Record(pairs.into_iter().collect())
    }

    /// Builds an expandable attribute tree from key/value pairs.
    pub fn tree<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CliValue)>,
    {
        Self::Tree(pairs.into_iter().collect())
    }

    /// Returns true if the value is `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is an expandable attribute tree.
    #[must_use]
    pub const fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    /// Returns the contained map for `Record` and `Tree` values.
    #[must_use]
    pub const fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            Self::Record(map) | Self::Tree(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the contained string, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

// Record and Tree compare by contents: a value read back from the server
// must compare equal to the flat record that produced it.
impl PartialEq for CliValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (
                Self::Record(a) | Self::Tree(a),
                Self::Record(b) | Self::Tree(b),
            ) => a == b,
            _ => false,
        }
    }
}

impl Eq for CliValue {}

impl From<bool> for CliValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for CliValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for CliValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for CliValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for CliValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<CliValue>> From<Vec<T>> for CliValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<CliValue>> From<Option<T>> for CliValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// An insertion-ordered map from attribute name to value.
///
/// Iteration order is insertion order, which determines the order of the
/// commands a reconciliation emits (and therefore the reproducibility of
/// dry-run output).
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: Vec<(String, CliValue)>,
}

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts a value, replacing any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CliValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Returns the value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CliValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if the key is present (even if its value is `Null`).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CliValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Key order is not significant for equality: the server returns attributes
// in its own order.
impl PartialEq for AttributeMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for AttributeMap {}

impl<K: Into<String>> FromIterator<(K, CliValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, CliValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a str, &'a CliValue);
    type IntoIter = std::vec::IntoIter<(&'a str, &'a CliValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut map = AttributeMap::new();
        map.insert("b", 1i64);
        map.insert("a", 2i64);
        map.insert("c", 3i64);

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = AttributeMap::new();
        map.insert("a", 1i64);
        map.insert("b", 2i64);
        map.insert("a", 3i64);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&CliValue::Int(3)));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_map_equality_ignores_key_order() {
        let a: AttributeMap = [("x", CliValue::Int(1)), ("y", CliValue::Int(2))]
            .into_iter()
            .collect();
        let b: AttributeMap = [("y", CliValue::Int(2)), ("x", CliValue::Int(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_and_tree_compare_by_contents() {
        let record = CliValue::record([("path", CliValue::from("server.log"))]);
        let tree = CliValue::tree([("path", CliValue::from("server.log"))]);
        assert_eq!(record, tree);
    }

    #[test]
    fn test_null_not_equal_to_absent_value() {
        let map: AttributeMap = [("a", CliValue::Null)].into_iter().collect();
        assert!(map.contains_key("a"));
        assert!(!map.contains_key("b"));
        assert_eq!(map.get("a"), Some(&CliValue::Null));
    }

    #[test]
    fn test_list_equality_is_order_sensitive() {
        let a = CliValue::from(vec!["FILE", "CONSOLE"]);
        let b = CliValue::from(vec!["CONSOLE", "FILE"]);
        assert_ne!(a, b);
    }
}

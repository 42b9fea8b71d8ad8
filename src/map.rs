//! Ordered containers for RSN values.
//!
//! [`List`] holds the elements of a list or tuple. [`Map`] holds key-value
//! entries in source order. Keys may be any [`Value`], and a key may appear
//! more than once: the parser keeps every entry so that nothing in the source
//! is lost, and lookups return the last entry for a key.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::{Map, Value};
//!
//! let mut map = Map::new();
//! map.push(Value::identifier("name"), Value::from("Alice"));
//! map.push(Value::identifier("name"), Value::from("Bob"));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get_by_name("name").and_then(Value::as_str), Some("Bob"));
//! ```

use crate::Value;
use std::ops::Index;
use std::slice;

/// The elements of a list or tuple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List<'a>(Vec<Value<'a>>);

impl<'a> List<'a> {
    #[must_use]
    pub fn new() -> Self {
        List(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        List(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, value: Value<'a>) {
        self.0.push(value);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value<'a>> {
        self.0.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Value<'a>> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value<'a>] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Value<'a>> {
        self.0
    }

    #[must_use]
    pub fn into_owned(self) -> List<'static> {
        List(self.0.into_iter().map(Value::into_owned).collect())
    }
}

impl<'a> From<Vec<Value<'a>>> for List<'a> {
    fn from(values: Vec<Value<'a>>) -> Self {
        List(values)
    }
}

impl<'a> FromIterator<Value<'a>> for List<'a> {
    fn from_iter<I: IntoIterator<Item = Value<'a>>>(iter: I) -> Self {
        List(iter.into_iter().collect())
    }
}

impl<'a> Index<usize> for List<'a> {
    type Output = Value<'a>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for List<'a> {
    type Item = Value<'a>;
    type IntoIter = std::vec::IntoIter<Value<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b List<'a> {
    type Item = &'b Value<'a>;
    type IntoIter = slice::Iter<'b, Value<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Key-value entries in source order. Duplicate keys are preserved.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{Map, Value};
///
/// let map: Map = [
///     (Value::from(1_u8), Value::from("one")),
///     (Value::from(2_u8), Value::from("two")),
/// ]
/// .into_iter()
/// .collect();
///
/// let keys: Vec<_> = map.keys().filter_map(Value::as_u64).collect();
/// assert_eq!(keys, vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map<'a>(Vec<(Value<'a>, Value<'a>)>);

impl<'a> Map<'a> {
    /// Creates an empty `Map`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::Map;
    ///
    /// let map = Map::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Map(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(Vec::with_capacity(capacity))
    }

    /// Appends an entry, keeping any earlier entry with the same key.
    pub fn push(&mut self, key: Value<'a>, value: Value<'a>) {
        self.0.push((key, value));
    }

    /// Returns the value of the last entry whose key equals `key`.
    #[must_use]
    pub fn get(&self, key: &Value<'_>) -> Option<&Value<'a>> {
        self.0
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    /// Returns the value of the last entry whose key is the identifier or
    /// string `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::Value;
    ///
    /// let value: Value = r#"{x: 1, "y": 2}"#.parse().unwrap();
    /// let map = value.as_map().unwrap();
    /// assert_eq!(map.get_by_name("x").and_then(Value::as_u64), Some(1));
    /// assert_eq!(map.get_by_name("y").and_then(Value::as_u64), Some(2));
    /// ```
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Value<'a>> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key.as_name() == Some(name))
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value<'_>) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any key appears more than once.
    #[must_use]
    pub fn has_duplicate_keys(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .any(|(index, (key, _))| self.0[..index].iter().any(|(earlier, _)| earlier == key))
    }

    pub fn iter(&self) -> slice::Iter<'_, (Value<'a>, Value<'a>)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value<'a>> {
        self.0.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value<'a>> {
        self.0.iter().map(|(_, value)| value)
    }

    #[must_use]
    pub fn into_owned(self) -> Map<'static> {
        Map(self
            .0
            .into_iter()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect())
    }
}

impl<'a> FromIterator<(Value<'a>, Value<'a>)> for Map<'a> {
    fn from_iter<I: IntoIterator<Item = (Value<'a>, Value<'a>)>>(iter: I) -> Self {
        Map(iter.into_iter().collect())
    }
}

impl<'a> Extend<(Value<'a>, Value<'a>)> for Map<'a> {
    fn extend<I: IntoIterator<Item = (Value<'a>, Value<'a>)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for Map<'a> {
    type Item = (Value<'a>, Value<'a>);
    type IntoIter = std::vec::IntoIter<(Value<'a>, Value<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Map<'a> {
    type Item = &'b (Value<'a>, Value<'a>);
    type IntoIter = slice::Iter<'b, (Value<'a>, Value<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let mut map = Map::new();
        map.push(Value::identifier("a"), Value::from(1_u8));
        map.push(Value::identifier("b"), Value::from(2_u8));
        map.push(Value::identifier("a"), Value::from(3_u8));

        assert_eq!(map.len(), 3);
        assert!(map.has_duplicate_keys());
        assert_eq!(map.get_by_name("a"), Some(&Value::from(3_u8)));
        let order: Vec<_> = map.keys().filter_map(Value::as_name).collect();
        assert_eq!(order, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_get_by_value_key() {
        let map: Map = vec![(Value::from(1_u8), Value::Bool(true))]
            .into_iter()
            .collect();
        assert_eq!(map.get(&Value::from(1_i64)), Some(&Value::Bool(true)));
        assert!(!map.contains_key(&Value::from(2_i64)));
        assert!(!map.has_duplicate_keys());
    }

    #[test]
    fn test_list_access() {
        let list: List = (1_u8..=3).map(Value::from).collect();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1], Value::from(2_u8));
        assert_eq!(list.get(3), None);
        assert_eq!(list.iter().count(), 3);
    }
}

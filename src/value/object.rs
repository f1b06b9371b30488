//! An insertion-ordered response map (spec §4.2).
//!
//! Mirrors `juniper`'s `value::object::Object`, built on `indexmap::IndexMap`,
//! plus the capacity/index-assignment operations the executor needs to fill
//! in sibling fields as they resolve out of order while keeping the
//! query-order key sequence.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::Value;

/// An ordered `String -> Value` map, used for every GraphQL response object.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Object {
    key_value_list: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Object {
            key_value_list: IndexMap::new(),
        }
    }

    /// Pre-sizes the map for `size` entries without reserving any keys yet.
    /// Used when the grouped field set's shape is known before any resolver
    /// has completed, so `add_field` never needs to reallocate the map while
    /// siblings resolve concurrently.
    pub fn with_capacity(size: usize) -> Self {
        Object {
            key_value_list: IndexMap::with_capacity(size),
        }
    }

    /// Inserts a field, merging into an existing `Object` value at the same
    /// key rather than overwriting it (needed when two fragments contribute
    /// to the same response key and both complete to sub-objects).
    pub fn add_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.key_value_list.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => {
                if let (Value::Object(existing), Value::Object(incoming)) =
                    (entry.get_mut(), value)
                {
                    for (k, v) in incoming.key_value_list {
                        existing.add_field(k, v);
                    }
                } else {
                    entry.insert(value);
                }
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    pub fn contains_field(&self, key: &str) -> bool {
        self.key_value_list.contains_key(key)
    }

    pub fn get_field_value(&self, key: &str) -> Option<&Value> {
        self.key_value_list.get(key)
    }

    pub fn field_count(&self) -> usize {
        self.key_value_list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.key_value_list.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.key_value_list.iter_mut()
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.key_value_list.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.key_value_list.iter()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut obj = Object::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            obj.add_field(k, v);
        }
        obj
    }
}

impl Serialize for Object {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.key_value_list.len()))?;
        for (k, v) in &self.key_value_list {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut obj = Object::new();
        obj.add_field("b", Value::scalar(2i64));
        obj.add_field("a", Value::scalar(1i64));
        let keys: Vec<_> = obj.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn merges_nested_objects_on_repeated_key() {
        let mut obj = Object::new();
        let mut first = Object::new();
        first.add_field("x", Value::scalar(1i64));
        obj.add_field("child", Value::Object(first));

        let mut second = Object::new();
        second.add_field("y", Value::scalar(2i64));
        obj.add_field("child", Value::Object(second));

        let merged = obj.get_field_value("child").unwrap().as_object().unwrap();
        assert_eq!(merged.field_count(), 2);
    }

    #[test]
    fn serializes_as_compact_json_object() {
        let mut obj = Object::new();
        obj.add_field("a", Value::scalar(1i64));
        obj.add_field("b", Value::Null);
        let json = serde_json::to_string(&obj).unwrap();
        assert_eq!(json, r#"{"a":1,"b":null}"#);
    }
}

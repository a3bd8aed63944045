//! PropertyMap: the key-value store on nodes and relationships.

use std::collections::HashMap;
use super::Value;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Build a PropertyMap from (key, value) pairs.
pub fn property_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Keys of a PropertyMap in sorted order, for deterministic rendering.
pub fn sorted_keys(props: &PropertyMap) -> Vec<&String> {
    let mut keys: Vec<&String> = props.keys().collect();
    keys.sort();
    keys
}

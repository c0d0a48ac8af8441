//! Key folding and path expansion.
//!
//! Key folding is an encode-time transform that collapses single-key object
//! chains into dotted keys (`{"a": {"b": {"c": 42}}}` emits as `a.b.c: 42`),
//! trading structure lines for one compound key. Path expansion is the
//! decode-time inverse: keys shaped like `a.b.c` unfold back into nested
//! objects.
//!
//! Both transforms only touch keys made of safe identifiers
//! (`[A-Za-z_][A-Za-z0-9_]*` segments), so a folded key never needs quoting
//! and an expanded key is never ambiguous. Keys that contain a literal dot
//! outside that shape pass through untouched.

use crate::error::Warning;
use crate::quote::{is_dotted_path, is_safe_identifier};
use crate::{Error, Map, Result, Value};

/// Collapses single-key chains throughout `value` into dotted keys.
///
/// `flatten_depth` caps the number of segments a folded key may contain;
/// `None` is unlimited. Values below 2 leave every key untouched.
pub(crate) fn fold_keys(value: Value, flatten_depth: Option<usize>) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = Map::with_capacity(map.len());
            for (key, entry) in map {
                let (key, entry) = fold_entry(key, entry, flatten_depth);
                folded.insert(key, fold_keys(entry, flatten_depth));
            }
            Value::Object(folded)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| fold_keys(item, flatten_depth))
                .collect(),
        ),
        other => other,
    }
}

/// Extends `key` along the chain of single-entry objects hanging off
/// `value`, stopping at the first non-single-entry value, unsafe segment,
/// or the segment cap.
fn fold_entry(mut key: String, mut value: Value, flatten_depth: Option<usize>) -> (String, Value) {
    if !is_safe_identifier(&key) {
        return (key, value);
    }
    let mut segments = 1usize;
    loop {
        match value {
            Value::Object(map) if map.len() == 1 => {
                let at_cap = flatten_depth.is_some_and(|cap| segments + 1 > cap);
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((inner_key, inner_value))
                        if !at_cap && is_safe_identifier(&inner_key) =>
                    {
                        key.push('.');
                        key.push_str(&inner_key);
                        value = inner_value;
                        segments += 1;
                    }
                    Some((inner_key, inner_value)) => {
                        let mut map = Map::with_capacity(1);
                        map.insert(inner_key, inner_value);
                        return (key, Value::Object(map));
                    }
                    None => return (key, Value::Object(Map::new())),
                }
            }
            other => return (key, other),
        }
    }
}

/// Expands dotted keys throughout `value` into nested object chains.
///
/// A conflict (the same prefix used both as a scalar and as an object) is
/// an error in strict mode; in lenient mode the dotted key is kept literally
/// and a warning is recorded.
pub(crate) fn expand_paths(
    value: Value,
    strict: bool,
    warnings: &mut Vec<Warning>,
) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut expanded = Map::with_capacity(map.len());
            for (key, entry) in map {
                let entry = expand_paths(entry, strict, warnings)?;
                if is_dotted_path(&key) {
                    let segments: Vec<&str> = key.split('.').collect();
                    if path_is_free(&expanded, &segments) {
                        insert_path(&mut expanded, &segments, entry);
                    } else if strict {
                        return Err(Error::PathConflict { key });
                    } else {
                        warnings.push(Warning::new(
                            0,
                            format!("path conflict on {:?}; keeping the dotted key", key),
                        ));
                        expanded.insert(key, entry);
                    }
                } else if expanded.contains_key(&key) {
                    // An earlier dotted key already claimed this name
                    if strict {
                        return Err(Error::PathConflict { key });
                    }
                    warnings.push(Warning::new(
                        0,
                        format!("path conflict on {:?}; keeping the later value", key),
                    ));
                    expanded.insert(key, entry);
                } else {
                    expanded.insert(key, entry);
                }
            }
            Ok(Value::Object(expanded))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(expand_paths(item, strict, warnings)?);
            }
            Ok(Value::Array(out))
        }
        other => Ok(other),
    }
}

/// Checks that `segments` can be inserted into `map` without colliding with
/// an existing scalar or leaf. Sub-objects along the way are fine (sibling
/// dotted keys merge).
fn path_is_free(map: &Map, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    match map.get(first) {
        None => true,
        Some(Value::Object(inner)) if !rest.is_empty() => path_is_free(inner, rest),
        Some(_) => false,
    }
}

/// Inserts `value` at the nested position named by `segments`, creating
/// intermediate objects as needed. Callers check [`path_is_free`] first.
fn insert_path(map: &mut Map, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert((*first).to_string(), value);
        return;
    }
    if !map.contains_key(*first) {
        map.insert((*first).to_string(), Value::Object(Map::new()));
    }
    if let Some(Value::Object(inner)) = map.get_mut(*first) {
        insert_path(inner, rest, value);
    }
}

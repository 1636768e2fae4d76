//! # Manifest Deep Merge
//!
//! Recursive "deep merge with override" over raw YAML documents, used to
//! combine multiple partial dependency manifests into one document before
//! schema validation.
//!
//! ## Semantics
//!
//! - **Mappings** merge key by key, recursing into keys present on both
//!   sides; keys only present in the overlay are inserted.
//! - **Sequences and scalars** are replaced wholesale by the overlay value.
//!   There is no concatenation or element-wise merging.
//!
//! The caller controls merge order; when two documents declare the same key
//! with conflicting values, the overlay (later document) wins at every
//! nesting depth.

use serde_yaml::Value;

/// Merge `overlay` into `base` with override-wins semantics.
///
/// Mappings merge recursively; any non-mapping value in `overlay` replaces
/// the corresponding `base` value entirely.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

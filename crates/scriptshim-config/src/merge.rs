/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deep merge of configuration layers.
 */

use crate::Document;
use serde_json::Map;

/// Overlay `layer` onto `target`, updating `target` in place.
///
/// - Objects merge recursively: keys are added or overwritten and nested
///   objects are overlaid. An object replaces a non-object target.
/// - Arrays and scalars (`null` included) replace the target wholesale.
///
/// Keys already present in `target` keep their position; new keys are
/// appended in `layer` order.
///
/// # Example
///
/// ```rust
/// use scriptshim_config::merge_documents;
/// use serde_json::json;
///
/// let mut project = json!({"title": "Site", "paths": {"site": "_site", "views": ["_views"]}});
/// merge_documents(&mut project, json!({"paths": {"views": ["local"]}, "port": 4000}));
/// assert_eq!(
///     project,
///     json!({"title": "Site", "paths": {"site": "_site", "views": ["local"]}, "port": 4000})
/// );
/// ```
pub fn merge_documents(target: &mut Document, layer: Document) {
    match layer {
        Document::Object(map) => merge_object(target, map),
        _ => *target = layer,
    }
}

fn merge_object(target: &mut Document, map: Map<String, Document>) {
    if !target.is_object() {
        *target = Document::Object(Map::new());
    }

    let Some(target_map) = target.as_object_mut() else {
        return;
    };

    for (key, value) in map {
        match target_map.get_mut(&key) {
            Some(existing) => merge_documents(existing, value),
            None => {
                target_map.insert(key, value);
            }
        }
    }
}

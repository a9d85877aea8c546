//! Input-schema flattening.
//!
//! Several MCP clients reject tool schemas that use `oneOf`/`anyOf`/`allOf`
//! combinators. Before tools are listed, every input schema is rewritten into
//! a plain object schema: `allOf` merges its subschemas into the parent,
//! `oneOf`/`anyOf` merge the union of their variants' properties (variant
//! `required` lists are dropped since only one variant needs to hold). The
//! pass recurses into nested `properties`, `items` and `additionalProperties`.

use serde_json::{Map, Value};

const COMBINATORS: [&str; 3] = ["allOf", "oneOf", "anyOf"];

pub fn flatten_schema(schema: &mut Map<String, Value>) {
    // allOf contributes required fields; oneOf/anyOf do not.
    if let Some(Value::Array(subs)) = schema.remove("allOf") {
        for sub in subs {
            if let Value::Object(sub) = sub {
                merge_subschema(schema, sub, true);
            }
        }
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(Value::Array(variants)) = schema.remove(key) {
            for variant in variants {
                if let Value::Object(variant) = variant {
                    merge_subschema(schema, variant, false);
                }
            }
        }
    }

    if let Some(Value::Object(props)) = schema.get_mut("properties") {
        for (_, prop) in props.iter_mut() {
            if let Value::Object(prop) = prop {
                flatten_schema(prop);
            }
        }
    }
    for key in ["items", "additionalProperties"] {
        if let Some(Value::Object(nested)) = schema.get_mut(key) {
            flatten_schema(nested);
        }
    }
}

fn merge_subschema(parent: &mut Map<String, Value>, mut sub: Map<String, Value>, keep_required: bool) {
    // flatten the subschema first so nested combinators cannot survive the merge
    flatten_schema(&mut sub);

    if let Some(Value::Object(sub_props)) = sub.remove("properties") {
        let parent_props = parent
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(parent_props) = parent_props {
            for (name, prop) in sub_props {
                parent_props.entry(name).or_insert(prop);
            }
        }
    }

    if keep_required {
        if let Some(Value::Array(sub_req)) = sub.remove("required") {
            let parent_req = parent
                .entry("required")
                .or_insert_with(|| Value::Array(vec![]));
            if let Value::Array(parent_req) = parent_req {
                for item in sub_req {
                    if !parent_req.contains(&item) {
                        parent_req.push(item);
                    }
                }
            }
        }
    } else {
        sub.remove("required");
    }

    // remaining keys (type, description, ...) fill gaps without overriding
    for (key, value) in sub {
        parent.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flatten(v: Value) -> Value {
        let mut map = v.as_object().cloned().expect("object schema");
        flatten_schema(&mut map);
        Value::Object(map)
    }

    fn contains_combinator(v: &Value) -> bool {
        match v {
            Value::Object(map) => {
                map.keys().any(|k| COMBINATORS.contains(&k.as_str()))
                    || map.values().any(contains_combinator)
            }
            Value::Array(items) => items.iter().any(contains_combinator),
            _ => false,
        }
    }

    #[test]
    fn all_of_merges_properties_and_required() {
        let out = flatten(json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"],
            "allOf": [
                { "properties": { "b": { "type": "number" } }, "required": ["b"] },
                { "properties": { "c": { "type": "boolean" } } }
            ]
        }));
        assert!(!contains_combinator(&out));
        assert_eq!(out["type"], "object");
        assert_eq!(out["properties"]["a"]["type"], "string");
        assert_eq!(out["properties"]["b"]["type"], "number");
        assert_eq!(out["properties"]["c"]["type"], "boolean");
        let required = out["required"].as_array().unwrap();
        assert!(required.contains(&json!("a")));
        assert!(required.contains(&json!("b")));
    }

    #[test]
    fn one_of_unions_properties_without_required() {
        let out = flatten(json!({
            "type": "object",
            "oneOf": [
                { "properties": { "uuid": { "type": "string" } }, "required": ["uuid"] },
                { "properties": { "path": { "type": "string" } }, "required": ["path"] }
            ]
        }));
        assert!(!contains_combinator(&out));
        assert_eq!(out["properties"]["uuid"]["type"], "string");
        assert_eq!(out["properties"]["path"]["type"], "string");
        assert!(out.get("required").is_none());
    }

    #[test]
    fn nested_combinators_are_removed() {
        let out = flatten(json!({
            "type": "object",
            "properties": {
                "value": {
                    "anyOf": [
                        { "type": "string" },
                        { "type": "number" }
                    ]
                },
                "items": {
                    "type": "array",
                    "items": {
                        "oneOf": [{ "type": "string" }]
                    }
                }
            }
        }));
        assert!(!contains_combinator(&out));
        assert_eq!(out["properties"]["value"]["type"], "string");
        assert_eq!(out["properties"]["items"]["items"]["type"], "string");
    }

    #[test]
    fn plain_schemas_pass_through_unchanged() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string", "description": "node name" } },
            "required": ["name"]
        });
        assert_eq!(flatten(schema.clone()), schema);
    }
}

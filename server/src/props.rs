//! Property pipeline for `set_component_property`.
//!
//! The editor describes component properties with introspected dumps
//! (`{ value, type, extends, isArray, enumList, readonly }`). This module
//! resolves a dump plus an optional caller-declared kind into a
//! [`PropertyKind`], coerces loosely-typed JSON input into the engine-native
//! wire value for that kind, and compares a re-read dump against the written
//! value to confirm the write took effect.
//!
//! Referenced component/asset types are never guessed from property names;
//! callers that need a concrete asset type supply it explicitly.

use serde_json::{json, Map, Value};
use thiserror::Error;

const NUMERIC_EPS: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property type `{0}` is not supported")]
    Unsupported(String),
    #[error("unknown property kind `{0}`")]
    UnknownKind(String),
    #[error("expected {expected} for a {kind} value, got {got}")]
    Shape {
        kind: &'static str,
        expected: &'static str,
        got: String,
    },
    #[error("enum value `{0}` is not in the property's enum list")]
    UnknownEnumValue(String),
    #[error("property is read-only")]
    ReadOnly,
    #[error("malformed property dump: {0}")]
    MalformedDump(&'static str),
}

/// Engine-native shapes a component property can take on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Number,
    Integer,
    Boolean,
    Enum,
    Color,
    Vec2,
    Vec3,
    Size,
    NodeRef,
    ComponentRef,
    AssetRef,
    Array(Box<PropertyKind>),
}

impl PropertyKind {
    /// Caller-declared kind names accepted by `set_component_property`.
    pub fn parse(s: &str) -> Result<Self, PropertyError> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "number" | "float" => Self::Number,
            "integer" | "int" => Self::Integer,
            "boolean" | "bool" => Self::Boolean,
            "enum" => Self::Enum,
            "color" => Self::Color,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "size" => Self::Size,
            "node" => Self::NodeRef,
            "component" => Self::ComponentRef,
            "asset" => Self::AssetRef,
            other => return Err(PropertyError::UnknownKind(other.to_string())),
        };
        Ok(kind)
    }

    /// Resolve from the dump's own type metadata.
    fn from_type_metadata(type_name: &str, extends: &[String]) -> Option<Self> {
        match type_name {
            "String" => return Some(Self::String),
            "Number" | "Float" => return Some(Self::Number),
            "Integer" => return Some(Self::Integer),
            "Boolean" => return Some(Self::Boolean),
            "Enum" => return Some(Self::Enum),
            "cc.Color" => return Some(Self::Color),
            "cc.Vec2" => return Some(Self::Vec2),
            "cc.Vec3" => return Some(Self::Vec3),
            "cc.Size" => return Some(Self::Size),
            "cc.Node" => return Some(Self::NodeRef),
            "cc.Component" => return Some(Self::ComponentRef),
            "cc.Asset" => return Some(Self::AssetRef),
            _ => {}
        }
        if extends.iter().any(|e| e == "cc.Asset") {
            Some(Self::AssetRef)
        } else if extends.iter().any(|e| e == "cc.Component") {
            Some(Self::ComponentRef)
        } else if extends.iter().any(|e| e == "cc.Node") {
            Some(Self::NodeRef)
        } else {
            None
        }
    }

    /// Dump `type` string written back to the editor.
    pub fn wire_type(&self, descriptor: &PropertyDescriptor) -> String {
        match self {
            Self::String => "String".into(),
            Self::Number => "Number".into(),
            Self::Integer => "Integer".into(),
            Self::Boolean => "Boolean".into(),
            Self::Enum => "Enum".into(),
            Self::Color => "cc.Color".into(),
            Self::Vec2 => "cc.Vec2".into(),
            Self::Vec3 => "cc.Vec3".into(),
            Self::Size => "cc.Size".into(),
            Self::NodeRef => "cc.Node".into(),
            // Concrete component/asset classes come from the descriptor
            // (e.g. cc.Label, cc.SpriteFrame), not from the kind.
            Self::ComponentRef | Self::AssetRef => descriptor.type_name.clone(),
            Self::Array(inner) => inner.wire_type(descriptor),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub name: String,
    pub value: i64,
}

/// Parsed form of the editor's property dump.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub type_name: String,
    pub extends: Vec<String>,
    pub is_array: bool,
    pub enum_list: Vec<EnumEntry>,
    pub readonly: bool,
    pub current: Value,
}

impl PropertyDescriptor {
    pub fn from_dump(dump: &Value) -> Result<Self, PropertyError> {
        let obj = dump
            .as_object()
            .ok_or(PropertyError::MalformedDump("dump is not an object"))?;
        let type_name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(PropertyError::MalformedDump("missing `type`"))?
            .to_string();
        let extends = obj
            .get("extends")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let enum_list = obj
            .get("enumList")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|e| {
                        let name = e.get("name").and_then(Value::as_str)?.to_string();
                        let value = e.get("value").and_then(Value::as_i64)?;
                        Some(EnumEntry { name, value })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            type_name,
            extends,
            is_array: obj.get("isArray").and_then(Value::as_bool).unwrap_or(false),
            enum_list,
            readonly: obj
                .get("readonly")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            current: obj.get("value").cloned().unwrap_or(Value::Null),
        })
    }
}

/// Resolve the property kind from the descriptor and an optional
/// caller-declared kind. The declared kind names the element type; array-ness
/// always comes from the descriptor.
pub fn analyze(
    descriptor: &PropertyDescriptor,
    declared: Option<&str>,
) -> Result<PropertyKind, PropertyError> {
    if descriptor.readonly {
        return Err(PropertyError::ReadOnly);
    }
    let base = match declared {
        Some(name) => PropertyKind::parse(name)?,
        None => PropertyKind::from_type_metadata(&descriptor.type_name, &descriptor.extends)
            .ok_or_else(|| PropertyError::Unsupported(descriptor.type_name.clone()))?,
    };
    if descriptor.is_array {
        Ok(PropertyKind::Array(Box::new(base)))
    } else {
        Ok(base)
    }
}

/// Convert loosely-typed input into the engine-native wire value for `kind`.
///
/// `asset_type` overrides the concrete asset class recorded in an asset
/// reference; when absent the descriptor's own type is used.
pub fn coerce(
    kind: &PropertyKind,
    raw: &Value,
    descriptor: &PropertyDescriptor,
    asset_type: Option<&str>,
) -> Result<Value, PropertyError> {
    match kind {
        PropertyKind::String => coerce_string(raw),
        PropertyKind::Number => coerce_number(raw).map(json_f64),
        PropertyKind::Integer => coerce_integer(raw).map(Value::from),
        PropertyKind::Boolean => coerce_boolean(raw).map(Value::from),
        PropertyKind::Enum => coerce_enum(raw, descriptor).map(Value::from),
        PropertyKind::Color => coerce_color(raw),
        PropertyKind::Vec2 => coerce_vector(raw, &["x", "y"]),
        PropertyKind::Vec3 => coerce_vector(raw, &["x", "y", "z"]),
        PropertyKind::Size => coerce_vector(raw, &["width", "height"]),
        PropertyKind::NodeRef | PropertyKind::ComponentRef => coerce_ref(raw, kind_name(kind)),
        PropertyKind::AssetRef => coerce_asset_ref(raw, descriptor, asset_type),
        PropertyKind::Array(inner) => {
            let items = raw.as_array().ok_or_else(|| shape("array", "an array", raw))?;
            let coerced: Result<Vec<Value>, PropertyError> = items
                .iter()
                .map(|item| coerce(inner, item, descriptor, asset_type))
                .collect();
            Ok(Value::Array(coerced?))
        }
    }
}

fn kind_name(kind: &PropertyKind) -> &'static str {
    match kind {
        PropertyKind::String => "string",
        PropertyKind::Number => "number",
        PropertyKind::Integer => "integer",
        PropertyKind::Boolean => "boolean",
        PropertyKind::Enum => "enum",
        PropertyKind::Color => "color",
        PropertyKind::Vec2 => "vec2",
        PropertyKind::Vec3 => "vec3",
        PropertyKind::Size => "size",
        PropertyKind::NodeRef => "node",
        PropertyKind::ComponentRef => "component",
        PropertyKind::AssetRef => "asset",
        PropertyKind::Array(_) => "array",
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Array(inner) => write!(f, "array of {inner}"),
            other => f.write_str(kind_name(other)),
        }
    }
}

fn shape(kind: &'static str, expected: &'static str, got: &Value) -> PropertyError {
    let got = match got {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(s) => format!("the string {s:?}"),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    };
    PropertyError::Shape {
        kind,
        expected,
        got,
    }
}

fn json_f64(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn coerce_string(raw: &Value) -> Result<Value, PropertyError> {
    match raw {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(shape("string", "a string", other)),
    }
}

fn coerce_number(raw: &Value) -> Result<f64, PropertyError> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| shape("number", "a finite number", raw)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| shape("number", "a number", raw)),
        other => Err(shape("number", "a number", other)),
    }
}

fn coerce_integer(raw: &Value) -> Result<i64, PropertyError> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                n.as_f64()
                    .map(|f| f.round() as i64)
                    .ok_or_else(|| shape("integer", "an integer", raw))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| shape("integer", "an integer", raw)),
        other => Err(shape("integer", "an integer", other)),
    }
}

fn coerce_boolean(raw: &Value) -> Result<bool, PropertyError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(shape("boolean", "a boolean", raw)),
        },
        other => Err(shape("boolean", "a boolean", other)),
    }
}

fn coerce_enum(raw: &Value, descriptor: &PropertyDescriptor) -> Result<i64, PropertyError> {
    match raw {
        Value::Number(_) => {
            let v = coerce_integer(raw)?;
            if descriptor.enum_list.is_empty()
                || descriptor.enum_list.iter().any(|e| e.value == v)
            {
                Ok(v)
            } else {
                Err(PropertyError::UnknownEnumValue(v.to_string()))
            }
        }
        Value::String(s) => descriptor
            .enum_list
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(s.trim()))
            .map(|e| e.value)
            .ok_or_else(|| PropertyError::UnknownEnumValue(s.clone())),
        other => Err(shape("enum", "an index or enum name", other)),
    }
}

fn clamp_channel(raw: f64) -> u8 {
    raw.round().clamp(0.0, 255.0) as u8
}

fn coerce_color(raw: &Value) -> Result<Value, PropertyError> {
    let (r, g, b, a) = match raw {
        Value::Object(map) => {
            let channel = |key: &str| -> Result<f64, PropertyError> {
                match map.get(key) {
                    None => Ok(0.0),
                    Some(v) => coerce_number(v),
                }
            };
            let a = match map.get("a") {
                None => 255.0,
                Some(v) => coerce_number(v)?,
            };
            (channel("r")?, channel("g")?, channel("b")?, a)
        }
        Value::Array(items) if items.len() == 3 || items.len() == 4 => {
            let mut ch = items.iter().map(coerce_number);
            let r = ch.next().unwrap()?;
            let g = ch.next().unwrap()?;
            let b = ch.next().unwrap()?;
            let a = ch.next().transpose()?.unwrap_or(255.0);
            (r, g, b, a)
        }
        Value::String(s) => return parse_hex_color(s),
        other => {
            return Err(shape(
                "color",
                "an {r,g,b,a} object, [r,g,b,a] array or #rrggbb string",
                other,
            ))
        }
    };
    Ok(json!({
        "r": clamp_channel(r),
        "g": clamp_channel(g),
        "b": clamp_channel(b),
        "a": clamp_channel(a),
    }))
}

fn parse_hex_color(s: &str) -> Result<Value, PropertyError> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || PropertyError::Shape {
        kind: "color",
        expected: "#rrggbb or #rrggbbaa",
        got: format!("the string {s:?}"),
    };
    if hex.len() != 6 && hex.len() != 8 {
        return Err(bad());
    }
    let byte = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(bad)
    };
    let r = byte(0)?;
    let g = byte(2)?;
    let b = byte(4)?;
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok(json!({ "r": r, "g": g, "b": b, "a": a }))
}

fn coerce_vector(raw: &Value, fields: &[&str]) -> Result<Value, PropertyError> {
    let kind = if fields.first() == Some(&"width") {
        "size"
    } else if fields.len() == 3 {
        "vec3"
    } else {
        "vec2"
    };
    let mut out = Map::new();
    match raw {
        Value::Object(map) => {
            for field in fields {
                let v = match map.get(*field) {
                    None => 0.0,
                    Some(v) => coerce_number(v).map_err(|_| PropertyError::Shape {
                        kind: if kind == "size" { "size" } else { "vector" },
                        expected: "numeric components",
                        got: format!("a non-numeric `{field}`"),
                    })?,
                };
                out.insert((*field).to_string(), json_f64(v));
            }
        }
        Value::Array(items) if items.len() == fields.len() => {
            for (field, item) in fields.iter().zip(items) {
                out.insert((*field).to_string(), json_f64(coerce_number(item)?));
            }
        }
        other => {
            return Err(shape(
                if kind == "size" { "size" } else { "vector" },
                "an object with named components or a matching array",
                other,
            ))
        }
    }
    Ok(Value::Object(out))
}

fn coerce_ref(raw: &Value, kind: &'static str) -> Result<Value, PropertyError> {
    let uuid = match raw {
        // null clears the reference
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(PropertyError::Shape {
                kind: "reference",
                expected: "an object with a `uuid` field",
                got: "an object without `uuid`".to_string(),
            })?,
        other => {
            return Err(shape(
                match kind {
                    "node" => "node",
                    _ => "component",
                },
                "a uuid string, {uuid} object or null",
                other,
            ))
        }
    };
    Ok(json!({ "uuid": uuid }))
}

fn coerce_asset_ref(
    raw: &Value,
    descriptor: &PropertyDescriptor,
    asset_type: Option<&str>,
) -> Result<Value, PropertyError> {
    let base = coerce_ref(raw, "asset")?;
    let uuid = base["uuid"].as_str().unwrap_or_default().to_string();
    if uuid.is_empty() {
        return Ok(json!({ "uuid": "" }));
    }
    let explicit = raw
        .as_object()
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str);
    let ty = explicit
        .or(asset_type)
        .map(str::to_string)
        .unwrap_or_else(|| descriptor.type_name.clone());
    Ok(json!({ "uuid": uuid, "type": ty }))
}

/// Tolerant comparison between the value we wrote and the value re-read from
/// the editor. Numbers compare within an epsilon, references by uuid only.
pub fn values_match(kind: &PropertyKind, expected: &Value, observed: &Value) -> bool {
    match kind {
        PropertyKind::String => expected == observed,
        PropertyKind::Boolean => expected == observed,
        PropertyKind::Number | PropertyKind::Integer | PropertyKind::Enum => {
            match (expected.as_f64(), observed.as_f64()) {
                (Some(a), Some(b)) => (a - b).abs() < NUMERIC_EPS,
                _ => expected == observed,
            }
        }
        PropertyKind::Color => ["r", "g", "b", "a"].iter().all(|ch| {
            let a = expected.get(ch).and_then(Value::as_f64);
            let b = observed.get(ch).and_then(Value::as_f64);
            match (a, b) {
                (Some(a), Some(b)) => (a - b).abs() < 0.5,
                _ => false,
            }
        }),
        PropertyKind::Vec2 => fields_match(expected, observed, &["x", "y"]),
        PropertyKind::Vec3 => fields_match(expected, observed, &["x", "y", "z"]),
        PropertyKind::Size => fields_match(expected, observed, &["width", "height"]),
        PropertyKind::NodeRef | PropertyKind::ComponentRef | PropertyKind::AssetRef => {
            let uuid = |v: &Value| -> String {
                match v {
                    Value::String(s) => s.clone(),
                    other => other
                        .get("uuid")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                }
            };
            uuid(expected) == uuid(observed)
        }
        PropertyKind::Array(inner) => match (expected.as_array(), observed.as_array()) {
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        // element dumps may wrap values
                        values_match(inner, x, unwrap_dump(y))
                    })
            }
            _ => false,
        },
    }
}

fn fields_match(expected: &Value, observed: &Value, fields: &[&str]) -> bool {
    fields.iter().all(|f| {
        match (
            expected.get(f).and_then(Value::as_f64),
            observed.get(f).and_then(Value::as_f64),
        ) {
            (Some(a), Some(b)) => (a - b).abs() < NUMERIC_EPS,
            // a component we defaulted to 0 may be omitted in the re-read
            (Some(a), None) => a.abs() < NUMERIC_EPS,
            _ => false,
        }
    })
}

/// Property dumps nest the payload under `value`; plain values pass through.
pub fn unwrap_dump(v: &Value) -> &Value {
    match v.get("value") {
        Some(inner) if v.get("type").is_some() => inner,
        _ => v,
    }
}

/// Locate a component dump by type inside a `query-node` result. Returns the
/// index into `__comps__` together with the dump.
pub fn find_component<'a>(node_dump: &'a Value, component_type: &str) -> Option<(usize, &'a Value)> {
    let comps = node_dump.get("__comps__")?.as_array()?;
    comps.iter().enumerate().find(|(_, comp)| {
        comp.get("type")
            .or_else(|| comp.get("__type__"))
            .and_then(Value::as_str)
            == Some(component_type)
    })
}

/// Pull one property dump out of a component dump.
pub fn property_dump<'a>(comp: &'a Value, property: &str) -> Option<&'a Value> {
    comp.get("value")?.get(property)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(type_name: &str) -> PropertyDescriptor {
        PropertyDescriptor {
            type_name: type_name.to_string(),
            extends: vec![],
            is_array: false,
            enum_list: vec![],
            readonly: false,
            current: Value::Null,
        }
    }

    #[test]
    fn descriptor_parses_full_dump() {
        let dump = json!({
            "value": { "r": 255, "g": 0, "b": 0, "a": 255 },
            "type": "cc.Color",
            "extends": ["cc.ValueType"],
            "readonly": false,
        });
        let d = PropertyDescriptor::from_dump(&dump).unwrap();
        assert_eq!(d.type_name, "cc.Color");
        assert_eq!(d.extends, vec!["cc.ValueType".to_string()]);
        assert!(!d.is_array);
        assert_eq!(d.current["r"], 255);
    }

    #[test]
    fn analyze_resolves_from_type_metadata() {
        assert_eq!(analyze(&desc("String"), None).unwrap(), PropertyKind::String);
        assert_eq!(
            analyze(&desc("cc.Vec3"), None).unwrap(),
            PropertyKind::Vec3
        );
        assert_eq!(
            analyze(&desc("cc.Node"), None).unwrap(),
            PropertyKind::NodeRef
        );

        let mut sprite = desc("cc.SpriteFrame");
        sprite.extends = vec!["cc.Asset".into(), "cc.Object".into()];
        assert_eq!(analyze(&sprite, None).unwrap(), PropertyKind::AssetRef);

        let mut label = desc("cc.Label");
        label.extends = vec!["cc.Component".into(), "cc.Object".into()];
        assert_eq!(analyze(&label, None).unwrap(), PropertyKind::ComponentRef);
    }

    #[test]
    fn analyze_prefers_declared_kind() {
        let d = desc("cc.CurveRange"); // a type the metadata table does not know
        assert!(matches!(
            analyze(&d, None),
            Err(PropertyError::Unsupported(_))
        ));
        assert_eq!(analyze(&d, Some("number")).unwrap(), PropertyKind::Number);
    }

    #[test]
    fn analyze_wraps_arrays_and_rejects_readonly() {
        let mut d = desc("cc.Node");
        d.is_array = true;
        assert_eq!(
            analyze(&d, None).unwrap(),
            PropertyKind::Array(Box::new(PropertyKind::NodeRef))
        );

        let mut ro = desc("String");
        ro.readonly = true;
        assert!(matches!(analyze(&ro, None), Err(PropertyError::ReadOnly)));
    }

    #[test]
    fn color_coercion_clamps_and_defaults_alpha() {
        let d = desc("cc.Color");
        let wire = coerce(
            &PropertyKind::Color,
            &json!({ "r": 300, "g": -20, "b": 128.6 }),
            &d,
            None,
        )
        .unwrap();
        assert_eq!(wire, json!({ "r": 255, "g": 0, "b": 129, "a": 255 }));

        let from_array = coerce(&PropertyKind::Color, &json!([10, 20, 30, 40]), &d, None).unwrap();
        assert_eq!(from_array, json!({ "r": 10, "g": 20, "b": 30, "a": 40 }));
    }

    #[test]
    fn color_coercion_parses_hex() {
        let d = desc("cc.Color");
        let wire = coerce(&PropertyKind::Color, &json!("#ff8000"), &d, None).unwrap();
        assert_eq!(wire, json!({ "r": 255, "g": 128, "b": 0, "a": 255 }));

        let with_alpha = coerce(&PropertyKind::Color, &json!("#00000080"), &d, None).unwrap();
        assert_eq!(with_alpha["a"], 128);

        assert!(coerce(&PropertyKind::Color, &json!("#xyz"), &d, None).is_err());
    }

    #[test]
    fn vector_coercion_accepts_object_and_array() {
        let d = desc("cc.Vec3");
        let from_obj = coerce(&PropertyKind::Vec3, &json!({ "x": 1, "y": 2 }), &d, None).unwrap();
        assert_eq!(from_obj, json!({ "x": 1.0, "y": 2.0, "z": 0.0 }));

        let from_arr = coerce(&PropertyKind::Vec3, &json!([1, 2, 3]), &d, None).unwrap();
        assert_eq!(from_arr["z"], 3.0);

        let size = coerce(
            &PropertyKind::Size,
            &json!({ "width": 640, "height": 480 }),
            &desc("cc.Size"),
            None,
        )
        .unwrap();
        assert_eq!(size, json!({ "width": 640.0, "height": 480.0 }));
    }

    #[test]
    fn vector_coercion_rejects_wrong_arity() {
        let d = desc("cc.Vec2");
        assert!(coerce(&PropertyKind::Vec2, &json!([1, 2, 3]), &d, None).is_err());
    }

    #[test]
    fn node_ref_accepts_string_object_and_null() {
        let d = desc("cc.Node");
        let from_str = coerce(&PropertyKind::NodeRef, &json!("uuid-1"), &d, None).unwrap();
        assert_eq!(from_str, json!({ "uuid": "uuid-1" }));

        let from_obj =
            coerce(&PropertyKind::NodeRef, &json!({ "uuid": "uuid-2" }), &d, None).unwrap();
        assert_eq!(from_obj, json!({ "uuid": "uuid-2" }));

        let cleared = coerce(&PropertyKind::NodeRef, &Value::Null, &d, None).unwrap();
        assert_eq!(cleared, json!({ "uuid": "" }));
    }

    #[test]
    fn asset_ref_takes_type_from_descriptor_or_caller() {
        let mut d = desc("cc.SpriteFrame");
        d.extends = vec!["cc.Asset".into()];

        let wire = coerce(&PropertyKind::AssetRef, &json!("sf-uuid"), &d, None).unwrap();
        assert_eq!(wire, json!({ "uuid": "sf-uuid", "type": "cc.SpriteFrame" }));

        let overridden =
            coerce(&PropertyKind::AssetRef, &json!("sf-uuid"), &d, Some("cc.Texture2D")).unwrap();
        assert_eq!(overridden["type"], "cc.Texture2D");

        let cleared = coerce(&PropertyKind::AssetRef, &Value::Null, &d, None).unwrap();
        assert_eq!(cleared, json!({ "uuid": "" }));
    }

    #[test]
    fn enum_coercion_maps_names_and_validates_indices() {
        let mut d = desc("Enum");
        d.enum_list = vec![
            EnumEntry {
                name: "LEFT".into(),
                value: 0,
            },
            EnumEntry {
                name: "CENTER".into(),
                value: 1,
            },
        ];
        assert_eq!(
            coerce(&PropertyKind::Enum, &json!("center"), &d, None).unwrap(),
            json!(1)
        );
        assert_eq!(
            coerce(&PropertyKind::Enum, &json!(0), &d, None).unwrap(),
            json!(0)
        );
        assert!(coerce(&PropertyKind::Enum, &json!(7), &d, None).is_err());
        assert!(coerce(&PropertyKind::Enum, &json!("TOP"), &d, None).is_err());
    }

    #[test]
    fn array_coercion_is_element_wise() {
        let mut d = desc("cc.Node");
        d.is_array = true;
        let kind = PropertyKind::Array(Box::new(PropertyKind::NodeRef));
        let wire = coerce(&kind, &json!(["a", { "uuid": "b" }]), &d, None).unwrap();
        assert_eq!(wire, json!([{ "uuid": "a" }, { "uuid": "b" }]));

        assert!(coerce(&kind, &json!("not-an-array"), &d, None).is_err());
    }

    #[test]
    fn loose_scalars_coerce() {
        let d = desc("Number");
        assert_eq!(
            coerce(&PropertyKind::Number, &json!("3.5"), &d, None).unwrap(),
            json!(3.5)
        );
        assert_eq!(
            coerce(&PropertyKind::Integer, &json!(2.6), &d, None).unwrap(),
            json!(3)
        );
        assert_eq!(
            coerce(&PropertyKind::Boolean, &json!("true"), &d, None).unwrap(),
            json!(true)
        );
        assert_eq!(
            coerce(&PropertyKind::String, &json!(42), &d, None).unwrap(),
            json!("42")
        );
        assert!(coerce(&PropertyKind::Number, &json!({}), &d, None).is_err());
    }

    #[test]
    fn values_match_is_tolerant() {
        assert!(values_match(
            &PropertyKind::Number,
            &json!(1.0),
            &json!(1.0000000001)
        ));
        assert!(values_match(
            &PropertyKind::Vec3,
            &json!({ "x": 1.0, "y": 0.0, "z": 0.0 }),
            &json!({ "x": 1.0, "y": 0.0, "z": 0.0 })
        ));
        assert!(values_match(
            &PropertyKind::AssetRef,
            &json!({ "uuid": "u1", "type": "cc.SpriteFrame" }),
            &json!({ "uuid": "u1" })
        ));
        assert!(!values_match(
            &PropertyKind::NodeRef,
            &json!({ "uuid": "u1" }),
            &json!({ "uuid": "u2" })
        ));
        assert!(values_match(
            &PropertyKind::Color,
            &json!({ "r": 255, "g": 128, "b": 0, "a": 255 }),
            &json!({ "r": 255.0, "g": 128.0, "b": 0.0, "a": 255.0 })
        ));
    }

    #[test]
    fn find_component_and_property_dump_navigate_node_dumps() {
        let node = json!({
            "uuid": { "value": "n1" },
            "__comps__": [
                { "type": "cc.UITransform", "value": {} },
                {
                    "type": "cc.Label",
                    "value": {
                        "string": { "value": "hi", "type": "String" }
                    }
                }
            ]
        });
        let (idx, comp) = find_component(&node, "cc.Label").unwrap();
        assert_eq!(idx, 1);
        let prop = property_dump(comp, "string").unwrap();
        assert_eq!(unwrap_dump(prop), &json!("hi"));

        assert!(find_component(&node, "cc.Sprite").is_none());
    }
}

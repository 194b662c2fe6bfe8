//! Tagged output schemas and generic normalization.
//!
//! Every AI task declares its expected output as a flat `&[FieldSpec]`.
//! Normalization is one fold over that schema: pull the value if present and
//! type-correct, substitute the documented default otherwise, clip lists and
//! strings to their declared caps, and discard anything the schema does not
//! name. The result always contains exactly the declared fields.

use serde_json::{Map, Value};

/// Declared type, default, and cap for one output field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// String, truncated to `max_len` characters. Default: empty string.
    Str { max_len: usize },
    /// Integer clamped to `[min, max]`. Wrong type or absent → `default`.
    Int { default: i64, min: i64, max: i64 },
    /// List of strings, capped at `max_items` entries of `max_item_len`
    /// characters each. Non-string items are dropped. Default: empty list.
    StrList {
        max_items: usize,
        max_item_len: usize,
    },
    /// Arbitrary JSON object. Default: empty object.
    Object,
    /// List of JSON objects, capped at `max_items`. Non-object items are
    /// dropped. Default: empty list.
    ObjectList { max_items: usize },
}

/// One declared output field of a task schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn str(name: &'static str, max_len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Str { max_len },
        }
    }

    pub const fn int(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Int { default, min, max },
        }
    }

    pub const fn str_list(name: &'static str, max_items: usize, max_item_len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::StrList {
                max_items,
                max_item_len,
            },
        }
    }

    pub const fn object(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Object,
        }
    }

    pub const fn object_list(name: &'static str, max_items: usize) -> Self {
        Self {
            name,
            kind: FieldKind::ObjectList { max_items },
        }
    }

    /// The documented default for this field's kind.
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Str { .. } => Value::String(String::new()),
            FieldKind::Int { default, .. } => Value::from(default),
            FieldKind::StrList { .. } | FieldKind::ObjectList { .. } => Value::Array(vec![]),
            FieldKind::Object => Value::Object(Map::new()),
        }
    }
}

/// Coerces a loosely-typed parsed response into the declared schema.
///
/// Never fails: a non-object input yields a map of pure defaults.
pub fn normalize(schema: &[FieldSpec], raw: Value) -> Map<String, Value> {
    let mut source = match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut out = Map::new();
    for field in schema {
        let value = source
            .remove(field.name)
            .map(|v| coerce(field, v))
            .unwrap_or_else(|| field.default_value());
        out.insert(field.name.to_string(), value);
    }
    out
}

fn coerce(field: &FieldSpec, value: Value) -> Value {
    match field.kind {
        FieldKind::Str { max_len } => match value {
            Value::String(s) => Value::String(truncate_chars(&s, max_len)),
            _ => field.default_value(),
        },
        FieldKind::Int { default, min, max } => {
            let n = match &value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f.round() as i64))
                    .unwrap_or(default),
                // Models sometimes quote numbers.
                Value::String(s) => s.trim().parse::<i64>().unwrap_or(default),
                _ => default,
            };
            Value::from(n.clamp(min, max))
        }
        FieldKind::StrList {
            max_items,
            max_item_len,
        } => match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(Value::String(truncate_chars(&s, max_item_len))),
                        _ => None,
                    })
                    .take(max_items)
                    .collect(),
            ),
            _ => field.default_value(),
        },
        FieldKind::Object => match value {
            Value::Object(_) => value,
            _ => field.default_value(),
        },
        FieldKind::ObjectList { max_items } => match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .filter(|item| item.is_object())
                    .take(max_items)
                    .collect(),
            ),
            _ => field.default_value(),
        },
    }
}

/// Truncates on a character boundary (byte-slicing panics on multibyte text).
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &[FieldSpec] = &[
        FieldSpec::int("score", 0, 0, 100),
        FieldSpec::str("reason", 20),
        FieldSpec::str_list("skills", 50, 100),
        FieldSpec::object("contact"),
        FieldSpec::object_list("experience", 2),
    ];

    #[test]
    fn test_every_declared_field_present_for_empty_input() {
        let out = normalize(SCHEMA, json!({}));
        assert_eq!(out.len(), SCHEMA.len());
        assert_eq!(out["score"], json!(0));
        assert_eq!(out["reason"], json!(""));
        assert_eq!(out["skills"], json!([]));
        assert_eq!(out["contact"], json!({}));
        assert_eq!(out["experience"], json!([]));
    }

    #[test]
    fn test_non_object_input_yields_all_defaults() {
        let out = normalize(SCHEMA, json!("not an object"));
        assert_eq!(out.len(), SCHEMA.len());
        assert_eq!(out["score"], json!(0));
    }

    #[test]
    fn test_valid_fields_pass_through_unchanged() {
        let out = normalize(
            SCHEMA,
            json!({
                "score": 82,
                "reason": "good match",
                "skills": ["rust", "sql"],
                "contact": {"email": "a@b.c"},
                "experience": [{"title": "dev"}]
            }),
        );
        assert_eq!(out["score"], json!(82));
        assert_eq!(out["reason"], json!("good match"));
        assert_eq!(out["skills"], json!(["rust", "sql"]));
        assert_eq!(out["contact"]["email"], json!("a@b.c"));
        assert_eq!(out["experience"][0]["title"], json!("dev"));
    }

    #[test]
    fn test_unknown_fields_are_discarded() {
        let out = normalize(SCHEMA, json!({"score": 10, "hallucinated": true}));
        assert!(!out.contains_key("hallucinated"));
    }

    #[test]
    fn test_list_cap_truncates_80_skills_to_50() {
        let skills: Vec<String> = (0..80).map(|i| format!("skill-{i}")).collect();
        let out = normalize(SCHEMA, json!({ "skills": skills }));
        assert_eq!(out["skills"].as_array().unwrap().len(), 50);
    }

    #[test]
    fn test_object_list_drops_non_objects_and_caps() {
        let out = normalize(
            SCHEMA,
            json!({"experience": ["junk", {"a": 1}, {"b": 2}, {"c": 3}]}),
        );
        let items = out["experience"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.is_object()));
    }

    #[test]
    fn test_int_clamped_to_declared_range() {
        let out = normalize(SCHEMA, json!({"score": 250}));
        assert_eq!(out["score"], json!(100));
        let out = normalize(SCHEMA, json!({"score": -4}));
        assert_eq!(out["score"], json!(0));
    }

    #[test]
    fn test_int_accepts_float_and_quoted_numbers() {
        let out = normalize(SCHEMA, json!({"score": 81.6}));
        assert_eq!(out["score"], json!(82));
        let out = normalize(SCHEMA, json!({"score": "73"}));
        assert_eq!(out["score"], json!(73));
    }

    #[test]
    fn test_wrong_typed_fields_get_defaults() {
        let out = normalize(
            SCHEMA,
            json!({"reason": 42, "skills": "rust", "contact": [], "experience": {}}),
        );
        assert_eq!(out["reason"], json!(""));
        assert_eq!(out["skills"], json!([]));
        assert_eq!(out["contact"], json!({}));
        assert_eq!(out["experience"], json!([]));
    }

    #[test]
    fn test_string_truncated_to_cap() {
        let long = "x".repeat(100);
        let out = normalize(SCHEMA, json!({ "reason": long }));
        assert_eq!(out["reason"].as_str().unwrap().len(), 20);
    }

    #[test]
    fn test_truncate_chars_is_multibyte_safe() {
        let s = "héllo wörld";
        let t = truncate_chars(s, 4);
        assert_eq!(t, "héll");
    }

    #[test]
    fn test_non_string_list_items_dropped() {
        let out = normalize(SCHEMA, json!({"skills": ["rust", 7, null, "sql"]}));
        assert_eq!(out["skills"], json!(["rust", "sql"]));
    }
}

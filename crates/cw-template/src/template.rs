//! Typed, path-addressed view over a template tree.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{TemplateError, TemplateResult};

/// Segment matching any number of levels, including none.
const ANY_DEPTH: &str = "**";

/// A subtree of a loaded template together with the path it was reached by.
///
/// Lookups never fail on absence: a missing key (or an explicit `null`) is
/// `None`. They do fail when a value is present with the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    value: Value,
    path: String,
}

impl Template {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            path: String::new(),
        }
    }

    fn at(value: Value, path: String) -> Self {
        Self { value, path }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Path from the document root, `/`-separated (empty for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, rel: &str) -> String {
        if self.path.is_empty() {
            rel.to_string()
        } else {
            format!("{}/{}", self.path, rel)
        }
    }

    /// Look up a `/`-separated path. `**` matches at any depth; array
    /// elements are addressed by index.
    pub fn get(&self, path: &str) -> Option<Template> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let found = lookup(&self.value, &segments)?;
        if found.is_null() {
            return None;
        }
        Some(Template::at(found.clone(), self.child_path(path)))
    }

    /// True when `path` resolves to a non-null value.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn get_child_str(&self, path: &str) -> TemplateResult<Option<String>> {
        match self.get(path) {
            None => Ok(None),
            Some(t) => match t.value {
                Value::String(s) => Ok(Some(s)),
                other => Err(mismatch(t.path, "string", &other)),
            },
        }
    }

    /// Integers are accepted as numbers or as numeric strings.
    pub fn get_child_int(&self, path: &str) -> TemplateResult<Option<i64>> {
        match self.get(path) {
            None => Ok(None),
            Some(t) => {
                let parsed = match &t.value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                };
                parsed
                    .map(Some)
                    .ok_or_else(|| mismatch(t.path.clone(), "integer", &t.value))
            }
        }
    }

    pub fn get_child_bool(&self, path: &str) -> TemplateResult<Option<bool>> {
        match self.get(path) {
            None => Ok(None),
            Some(t) => match t.value {
                Value::Bool(b) => Ok(Some(b)),
                other => Err(mismatch(t.path, "bool", &other)),
            },
        }
    }

    pub fn require(&self, path: &str) -> TemplateResult<Template> {
        self.get(path).ok_or_else(|| TemplateError::MissingKey {
            path: self.child_path(path),
        })
    }

    pub fn require_str(&self, path: &str) -> TemplateResult<String> {
        self.get_child_str(path)?
            .ok_or_else(|| TemplateError::MissingKey {
                path: self.child_path(path),
            })
    }

    pub fn require_int(&self, path: &str) -> TemplateResult<i64> {
        self.get_child_int(path)?
            .ok_or_else(|| TemplateError::MissingKey {
                path: self.child_path(path),
            })
    }

    /// This node as an ordered property map.
    pub fn get_dict(&self) -> TemplateResult<Map<String, Value>> {
        match &self.value {
            Value::Object(map) => Ok(map.clone()),
            other => Err(mismatch(self.path.clone(), "map", other)),
        }
    }

    /// Children of a map node in document order.
    pub fn get_items(&self) -> TemplateResult<Vec<(String, Template)>> {
        match &self.value {
            Value::Object(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.clone(), Template::at(v.clone(), self.child_path(k))))
                .collect()),
            other => Err(mismatch(self.path.clone(), "map", other)),
        }
    }

    /// Decode this node into a typed structure.
    pub fn parse<T: DeserializeOwned>(&self) -> TemplateResult<T> {
        serde_json::from_value(self.value.clone()).map_err(|source| TemplateError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

impl From<Value> for Template {
    fn from(value: Value) -> Self {
        Template::new(value)
    }
}

fn lookup<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let Some((&head, rest)) = segments.split_first() else {
        return Some(value);
    };

    if head == ANY_DEPTH {
        // Zero levels first, then descend depth-first in document order.
        if let Some(found) = lookup(value, rest) {
            return Some(found);
        }
        return children(value).find_map(|child| lookup(child, segments));
    }

    let next = match value {
        Value::Object(map) => map.get(head),
        Value::Array(items) => head.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }?;
    lookup(next, rest)
}

fn children(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => Box::new(std::iter::empty()),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn mismatch(path: String, expected: &'static str, found: &Value) -> TemplateError {
    TemplateError::TypeMismatch {
        path,
        expected,
        found: kind_name(found),
    }
}

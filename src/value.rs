use std::collections::HashMap;

/// A node in the document tree that operators read from and write into.
///
/// Integers and floats are kept apart so that stringifying a number
/// renders it the way it was written (`3` stays `3`, `1.5` stays `1.5`).
///
/// # Examples
///
/// ```
/// use trellis::Value;
/// use std::collections::HashMap;
///
/// let list = Value::Array(vec![Value::String("web".into()), Value::Integer(1)]);
///
/// let mut obj = HashMap::new();
/// obj.insert("jobs".to_string(), list);
/// let doc = Value::Object(obj);
/// assert!(!doc.is_scalar());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// null / `~`
    Null,

    Boolean(bool),

    Float(f64),

    Integer(i64),

    String(String),

    /// Ordered list of values
    Array(Vec<Value>),

    /// Map with string keys
    Object(HashMap<String, Value>),
}

impl Value {
    /// True for everything except lists and maps.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Canonical textual form of a scalar.
    ///
    /// Containers have no canonical form; they fall back to their debug
    /// rendering so callers that forgot to reject them still get
    /// something readable in error messages.
    pub fn stringify(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            _ => format!("{:?}", self),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Returns a human-readable type name for a Value
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            // u64 beyond i64::MAX becomes a float rather than wrapping
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Integer(i),
                (None, Some(f)) => Value::Float(f),
                (None, None) => Value::Null,
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Map keys are emitted in sorted order so the same document always
/// serialises the same way. Non-finite floats become `null`.
impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                serde_json::Value::Object(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::from(v)))
                        .collect(),
                )
            }
        }
    }
}

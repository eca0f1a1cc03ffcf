use indexmap::IndexMap;
use serde::Serialize;

/// Substrings that mark a parameter as sensitive in logs.
pub const SENSITIVE_MARKERS: &[&str] = &["password", "secret", "token", "key", "card", "cvv"];

/// Placeholder written over sensitive values.
pub const REDACTED: &str = "[REDACTED]";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text rendering of a scalar. Numbers are formatted, lists and null
    /// yield `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(format_number(*f)),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::List(_) => None,
        }
    }

    /// Integer view. Text is parsed as base-10; floats only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Self::Int(n) => Some(*n != 0),
            _ => None,
        }
    }
}

/// Formats a float without a trailing `.0` when it is integral.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Self::Text).collect())
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            // Nested objects are kept as their JSON text.
            obj @ serde_json::Value::Object(_) => Self::Text(obj.to_string()),
        }
    }
}

/// Ordered mapping from parameter name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(IndexMap<String, ParamValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// True when the key exists with a non-null value.
    pub fn is_present(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Trimmed, non-empty text for the first of `names` that has one.
    pub fn text_any(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|n| {
            self.0
                .get(*n)
                .and_then(ParamValue::to_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.text_any(&[name])
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(ParamValue::as_i64)
    }

    pub fn number_any(&self, names: &[&str]) -> Option<f64> {
        names
            .iter()
            .find_map(|n| self.0.get(*n).and_then(ParamValue::as_f64))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.number_any(&[name])
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(ParamValue::as_bool)
    }

    /// List of text items. A scalar text value is treated as a
    /// single-item list.
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        match self.0.get(name)? {
            ParamValue::List(items) => Some(items.iter().filter_map(ParamValue::to_text).collect()),
            ParamValue::Null => None,
            other => other.to_text().map(|s| vec![s]),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with every sensitive value replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let inner = self
            .0
            .iter()
            .map(|(k, v)| {
                let lower = k.to_lowercase();
                if SENSITIVE_MARKERS.iter().any(|m| lower.contains(m)) {
                    (k.clone(), ParamValue::Text(REDACTED.to_string()))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect();
        Self(inner)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ParameterSet {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, ParamValue::from(v))).collect())
    }
}

impl FromIterator<(String, ParamValue)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_preserves_order_and_types() {
        let map = json!({"name": "חולצה", "price": 70, "ratio": 0.5, "tags": ["a", "b"], "x": null})
            .as_object()
            .cloned()
            .unwrap();
        let params = ParameterSet::from(map);
        let keys: Vec<_> = params.keys().cloned().collect();
        assert_eq!(keys, ["name", "price", "ratio", "tags", "x"]);
        assert_eq!(params.get("price"), Some(&ParamValue::Int(70)));
        assert_eq!(params.get("ratio"), Some(&ParamValue::Float(0.5)));
        assert!(params.contains_key("x"));
        assert!(!params.is_present("x"));
        assert!(params.is_present("name"));
    }

    #[test]
    fn nested_object_kept_as_text() {
        let v = ParamValue::from(json!({"a": 1}));
        assert_eq!(v, ParamValue::Text("{\"a\":1}".into()));
    }

    #[test]
    fn typed_accessors_coerce() {
        let params = ParameterSet::new()
            .with("order_id", "123")
            .with("amount", 49.5)
            .with("price", 70_i64)
            .with("flag", "true")
            .with("blank", "   ");
        assert_eq!(params.integer("order_id"), Some(123));
        assert_eq!(params.number("amount"), Some(49.5));
        assert_eq!(params.text("price").as_deref(), Some("70"));
        assert_eq!(params.flag("flag"), Some(true));
        assert_eq!(params.text("blank"), None);
    }

    #[test]
    fn malformed_numeric_is_none() {
        let params = ParameterSet::new().with("order_id", "12a").with("amount", "NaN");
        assert_eq!(params.integer("order_id"), None);
        assert_eq!(params.number("amount"), None);
    }

    #[test]
    fn text_any_uses_first_alias() {
        let params = ParameterSet::new().with("regular_price", "70");
        assert_eq!(
            params.text_any(&["price", "regular_price"]).as_deref(),
            Some("70")
        );
    }

    #[test]
    fn list_accepts_scalar() {
        let params = ParameterSet::new()
            .with("regions", vec!["IL".to_string(), "US".to_string()])
            .with("single", "IL");
        assert_eq!(params.list("regions").unwrap(), ["IL", "US"]);
        assert_eq!(params.list("single").unwrap(), ["IL"]);
    }

    #[test]
    fn redaction_masks_sensitive_keys() {
        let params = ParameterSet::new()
            .with("product_name", "חולצה")
            .with("api_key", "ck_123")
            .with("card_number", "4111");
        let redacted = params.redacted();
        assert_eq!(redacted.text("product_name").as_deref(), Some("חולצה"));
        assert_eq!(redacted.text("api_key").as_deref(), Some(REDACTED));
        assert_eq!(redacted.text("card_number").as_deref(), Some(REDACTED));
    }

    #[test]
    fn integral_float_formats_without_fraction() {
        assert_eq!(format_number(70.0), "70");
        assert_eq!(format_number(49.9), "49.9");
    }
}

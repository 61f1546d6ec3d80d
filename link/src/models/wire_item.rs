use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// One payload item of a result row as sent by the gateway.
///
/// Scalars arrive as strings, SQL NULL as JSON `null`, and every composite
/// value (ARRAY, MULTISET, MAP, ROW) as a JSON array of nested items.
///
/// Decoding never fails: numbers and booleans are kept as their textual
/// form and unexpected JSON objects as compact JSON text, so a single odd
/// value cannot reject a whole page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireItem {
    Null,
    Scalar(String),
    List(Vec<WireItem>),
}

impl WireItem {
    pub fn scalar(value: impl Into<String>) -> Self {
        WireItem::Scalar(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireItem::Null)
    }

    pub fn as_list(&self) -> Option<&[WireItem]> {
        match self {
            WireItem::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<JsonValue> for WireItem {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => WireItem::Null,
            JsonValue::String(s) => WireItem::Scalar(s),
            JsonValue::Bool(b) => WireItem::Scalar(b.to_string()),
            JsonValue::Number(n) => WireItem::Scalar(n.to_string()),
            JsonValue::Array(items) => {
                WireItem::List(items.into_iter().map(WireItem::from).collect())
            },
            JsonValue::Object(_) => WireItem::Scalar(value.to_string()),
        }
    }
}

impl From<&WireItem> for JsonValue {
    fn from(item: &WireItem) -> Self {
        match item {
            WireItem::Null => JsonValue::Null,
            WireItem::Scalar(s) => JsonValue::String(s.clone()),
            WireItem::List(items) => JsonValue::Array(items.iter().map(JsonValue::from).collect()),
        }
    }
}

impl Serialize for WireItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonValue::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(WireItem::from)
    }
}

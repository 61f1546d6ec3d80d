use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type tag of a column or nested field.
///
/// Parsed from the `type` string of a gateway type descriptor. Names the
/// client does not know are kept verbatim in [`FieldType::Other`] and are
/// handled as atomic values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Char,
    Varchar,
    Boolean,
    Binary,
    Varbinary,
    Decimal,
    Tinyint,
    Smallint,
    Integer,
    Bigint,
    Float,
    Double,
    Date,
    TimeWithoutTimeZone,
    TimestampWithoutTimeZone,
    TimestampWithTimeZone,
    TimestampWithLocalTimeZone,
    IntervalYearMonth,
    IntervalDayTime,
    Array,
    Multiset,
    Map,
    Row,
    Null,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Char => "CHAR",
            FieldType::Varchar => "VARCHAR",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Binary => "BINARY",
            FieldType::Varbinary => "VARBINARY",
            FieldType::Decimal => "DECIMAL",
            FieldType::Tinyint => "TINYINT",
            FieldType::Smallint => "SMALLINT",
            FieldType::Integer => "INTEGER",
            FieldType::Bigint => "BIGINT",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Date => "DATE",
            FieldType::TimeWithoutTimeZone => "TIME_WITHOUT_TIME_ZONE",
            FieldType::TimestampWithoutTimeZone => "TIMESTAMP_WITHOUT_TIME_ZONE",
            FieldType::TimestampWithTimeZone => "TIMESTAMP_WITH_TIME_ZONE",
            FieldType::TimestampWithLocalTimeZone => "TIMESTAMP_WITH_LOCAL_TIME_ZONE",
            FieldType::IntervalYearMonth => "INTERVAL_YEAR_MONTH",
            FieldType::IntervalDayTime => "INTERVAL_DAY_TIME",
            FieldType::Array => "ARRAY",
            FieldType::Multiset => "MULTISET",
            FieldType::Map => "MAP",
            FieldType::Row => "ROW",
            FieldType::Null => "NULL",
            FieldType::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CHAR" => FieldType::Char,
            "VARCHAR" => FieldType::Varchar,
            "BOOLEAN" => FieldType::Boolean,
            "BINARY" => FieldType::Binary,
            "VARBINARY" => FieldType::Varbinary,
            "DECIMAL" => FieldType::Decimal,
            "TINYINT" => FieldType::Tinyint,
            "SMALLINT" => FieldType::Smallint,
            "INTEGER" => FieldType::Integer,
            "BIGINT" => FieldType::Bigint,
            "FLOAT" => FieldType::Float,
            "DOUBLE" => FieldType::Double,
            "DATE" => FieldType::Date,
            "TIME_WITHOUT_TIME_ZONE" => FieldType::TimeWithoutTimeZone,
            "TIMESTAMP_WITHOUT_TIME_ZONE" => FieldType::TimestampWithoutTimeZone,
            "TIMESTAMP_WITH_TIME_ZONE" => FieldType::TimestampWithTimeZone,
            "TIMESTAMP_WITH_LOCAL_TIME_ZONE" => FieldType::TimestampWithLocalTimeZone,
            "INTERVAL_YEAR_MONTH" => FieldType::IntervalYearMonth,
            "INTERVAL_DAY_TIME" => FieldType::IntervalDayTime,
            "ARRAY" => FieldType::Array,
            "MULTISET" => FieldType::Multiset,
            "MAP" => FieldType::Map,
            "ROW" => FieldType::Row,
            "NULL" => FieldType::Null,
            _ => FieldType::Other(value),
        }
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        FieldType::from(value.to_string())
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a descriptor after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Atomic,
    Array,
    Multiset,
    Map,
    Row,
}

/// Nestable type descriptor of a result column
///
/// # Example JSON
///
/// ```json
/// {"type": "INTEGER", "nullable": false}
/// {"type": "ARRAY", "nullable": true, "element_type": {"type": "VARCHAR", "nullable": true, "length": 2147483647}}
/// {"type": "MAP", "nullable": true,
///  "key_type": {"type": "VARCHAR", "nullable": false},
///  "value_type": {"type": "BIGINT", "nullable": true}}
/// {"type": "ROW", "nullable": true, "fields": [
///   {"name": "id", "field_type": {"type": "INTEGER", "nullable": false}}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default = "default_nullable")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    /// Element descriptor for ARRAY and MULTISET
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<Box<DataType>>,

    /// Key descriptor for MAP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<Box<DataType>>,

    /// Value descriptor for MAP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<Box<DataType>>,

    /// Field descriptors for ROW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<RowFieldType>>,
}

fn default_nullable() -> bool {
    true
}

impl DataType {
    /// Nullable atomic descriptor of the given type.
    pub fn atomic(field_type: FieldType) -> Self {
        Self {
            field_type,
            nullable: true,
            length: None,
            precision: None,
            scale: None,
            element_type: None,
            key_type: None,
            value_type: None,
            fields: None,
        }
    }

    pub fn array(element: DataType) -> Self {
        Self {
            element_type: Some(Box::new(element)),
            ..Self::atomic(FieldType::Array)
        }
    }

    pub fn multiset(element: DataType) -> Self {
        Self {
            element_type: Some(Box::new(element)),
            ..Self::atomic(FieldType::Multiset)
        }
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        Self {
            key_type: Some(Box::new(key)),
            value_type: Some(Box::new(value)),
            ..Self::atomic(FieldType::Map)
        }
    }

    pub fn row(fields: Vec<RowFieldType>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::atomic(FieldType::Row)
        }
    }

    /// Classify the descriptor. Everything that is not a collection or a
    /// row, including unknown type names, is atomic.
    pub fn kind(&self) -> TypeKind {
        match self.field_type {
            FieldType::Array => TypeKind::Array,
            FieldType::Multiset => TypeKind::Multiset,
            FieldType::Map => TypeKind::Map,
            FieldType::Row => TypeKind::Row,
            _ => TypeKind::Atomic,
        }
    }

    /// SQL-ish rendering used by `\status` and column headers in verbose mode.
    pub fn type_string(&self) -> String {
        match self.kind() {
            TypeKind::Array | TypeKind::Multiset => match &self.element_type {
                Some(element) => format!("{}<{}>", self.field_type, element.type_string()),
                None => self.field_type.to_string(),
            },
            TypeKind::Map => match (&self.key_type, &self.value_type) {
                (Some(key), Some(value)) => {
                    format!("MAP<{}, {}>", key.type_string(), value.type_string())
                },
                _ => self.field_type.to_string(),
            },
            TypeKind::Row => match &self.fields {
                Some(fields) => {
                    let inner: Vec<String> = fields
                        .iter()
                        .map(|f| format!("{} {}", f.name, f.field_type.type_string()))
                        .collect();
                    format!("ROW<{}>", inner.join(", "))
                },
                None => self.field_type.to_string(),
            },
            TypeKind::Atomic => self.field_type.to_string(),
        }
    }
}

/// Named field inside a ROW descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFieldType {
    pub name: String,

    pub field_type: DataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RowFieldType {
    pub fn new(name: impl Into<String>, field_type: DataType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
        }
    }
}

/// Column of a statement's result schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDetails {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl ColumnDetails {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

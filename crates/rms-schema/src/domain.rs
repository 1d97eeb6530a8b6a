//! Field tables describing one accepted payload shape.
//!
//! A field's accepted values are the product of two independent axes:
//!
//! - [`Presence`]: may the key be absent?
//! - `nullable`: may the key be present with `null`?
//!
//! so "absent on legacy payloads", "null when never engaged" and "always
//! set" are each expressible without special cases in validation code.

use serde_json::{json, Map, Value};

/// Whether a key must appear in the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// The set of values a field accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// Anything, including nested structures.
    Any,
    String,
    Boolean,
    /// Any JSON number.
    Number,
    /// Integer within inclusive bounds. `None` leaves a side open.
    Integer { min: Option<i64>, max: Option<i64> },
    /// Integer `>= min`, or exactly `sentinel` meaning "never set".
    IntegerOrSentinel { min: i64, sentinel: i64 },
    /// Decimal digits in a string (millisecond timestamps, byte sizes).
    DigitString,
    /// One of a fixed set of strings; `allow_empty` adds `""` as "unset".
    OneOf { values: Vec<String>, allow_empty: bool },
    /// Array whose items all belong to the inner domain.
    ArrayOf(Box<Domain>),
    /// Object mapping arbitrary keys to strings.
    StringMap,
    /// Nested object with its own field table.
    Object(ObjectSchema),
}

impl Domain {
    /// Non-negative integer with no upper bound.
    pub fn unsigned() -> Self {
        Domain::Integer {
            min: Some(0),
            max: None,
        }
    }

    /// Exactly one integer value.
    pub fn exactly(value: i64) -> Self {
        Domain::Integer {
            min: Some(value),
            max: Some(value),
        }
    }

    /// Non-negative integer, or `-1` for "never set".
    pub fn unsigned_or_unset() -> Self {
        Domain::IntegerOrSentinel {
            min: 0,
            sentinel: -1,
        }
    }

    pub fn one_of(values: &[&str]) -> Self {
        Domain::OneOf {
            values: values.iter().map(|v| v.to_string()).collect(),
            allow_empty: false,
        }
    }

    /// Like [`Domain::one_of`], with `""` accepted as an unset member.
    pub fn one_of_or_empty(values: &[&str]) -> Self {
        Domain::OneOf {
            values: values.iter().map(|v| v.to_string()).collect(),
            allow_empty: true,
        }
    }

    pub fn array_of(item: Domain) -> Self {
        Domain::ArrayOf(Box::new(item))
    }

    /// JSON Schema fragment for this domain.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Domain::Any => json!({}),
            Domain::String => json!({"type": "string"}),
            Domain::Boolean => json!({"type": "boolean"}),
            Domain::Number => json!({"type": "number"}),
            Domain::Integer { min, max } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("integer"));
                if let Some(min) = min {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = max {
                    schema.insert("maximum".into(), json!(max));
                }
                Value::Object(schema)
            }
            Domain::IntegerOrSentinel { min, sentinel } => json!({
                "anyOf": [
                    {"type": "integer", "minimum": min},
                    {"const": sentinel},
                ]
            }),
            Domain::DigitString => json!({"type": "string", "pattern": "^[0-9]+$"}),
            Domain::OneOf {
                values,
                allow_empty,
            } => {
                let mut members: Vec<Value> = values.iter().map(|v| json!(v)).collect();
                if *allow_empty {
                    members.push(json!(""));
                }
                json!({"enum": members})
            }
            Domain::ArrayOf(item) => json!({"type": "array", "items": item.to_json_schema()}),
            Domain::StringMap => {
                json!({"type": "object", "additionalProperties": {"type": "string"}})
            }
            Domain::Object(schema) => schema.to_json_schema(),
        }
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Domain::Any => "any value".into(),
            Domain::String => "string".into(),
            Domain::Boolean => "boolean".into(),
            Domain::Number => "number".into(),
            Domain::Integer { min, max } => match (min, max) {
                (Some(lo), Some(hi)) if lo == hi => format!("integer {lo}"),
                (Some(lo), Some(hi)) => format!("integer in {lo}..={hi}"),
                (Some(lo), None) => format!("integer >= {lo}"),
                (None, Some(hi)) => format!("integer <= {hi}"),
                (None, None) => "integer".into(),
            },
            Domain::IntegerOrSentinel { min, sentinel } => {
                format!("integer >= {min}, or {sentinel} (unset)")
            }
            Domain::DigitString => "string of decimal digits".into(),
            Domain::OneOf {
                values,
                allow_empty,
            } => {
                let mut members: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
                if *allow_empty {
                    members.push("\"\" (unset)".into());
                }
                format!("one of [{}]", members.join(", "))
            }
            Domain::ArrayOf(item) => format!("array of {}", item.describe()),
            Domain::StringMap => "object of strings".into(),
            Domain::Object(_) => "object".into(),
        }
    }

    fn describe_at(&self, rest: &[&str]) -> Option<String> {
        let Some((head, tail)) = rest.split_first() else {
            return Some(self.describe());
        };
        match self {
            Domain::ArrayOf(item) if head.parse::<usize>().is_ok() => item.describe_at(tail),
            Domain::StringMap if tail.is_empty() => Some("string".into()),
            Domain::Object(schema) => schema.describe_path(rest),
            _ => None,
        }
    }
}

/// One row of a field table.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub domain: Domain,
    pub presence: Presence,
    pub nullable: bool,
}

impl FieldSpec {
    pub fn required(name: &str, domain: Domain) -> Self {
        Self {
            name: name.to_string(),
            domain,
            presence: Presence::Required,
            nullable: false,
        }
    }

    pub fn optional(name: &str, domain: Domain) -> Self {
        Self {
            name: name.to_string(),
            domain,
            presence: Presence::Optional,
            nullable: false,
        }
    }

    /// Also accept `null`. Independent of presence.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn to_json_schema(&self) -> Value {
        let inner = self.domain.to_json_schema();
        if self.nullable {
            json!({"anyOf": [inner, {"type": "null"}]})
        } else {
            inner
        }
    }

    /// Description of the accepted values, including nullability.
    pub fn describe(&self) -> String {
        if self.nullable {
            format!("{} or null", self.domain.describe())
        } else {
            self.domain.describe()
        }
    }
}

/// A field table for one JSON object shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSchema {
    pub fields: Vec<FieldSpec>,
    /// Accept keys not listed in `fields`.
    pub permissive: bool,
}

impl ObjectSchema {
    /// Unknown keys are rejected.
    pub fn strict(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            permissive: false,
        }
    }

    /// Unknown keys are accepted and left untouched.
    pub fn permissive(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            permissive: true,
        }
    }

    /// Replace or append a row, keeping table order for existing names.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of required fields, in table order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.presence == Presence::Required)
            .map(|f| f.name.as_str())
    }

    /// Compile the table into a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self.required_fields().collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": self.permissive,
        })
    }

    /// Describe the accepted values at a JSON pointer path below this object.
    pub fn describe_path(&self, segments: &[&str]) -> Option<String> {
        let (head, tail) = segments.split_first()?;
        let field = self.field(head)?;
        if tail.is_empty() {
            Some(field.describe())
        } else {
            field.domain.describe_at(tail)
        }
    }
}

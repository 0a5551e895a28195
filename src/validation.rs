//! Payload validation for workflow actions
//!
//! A [`DataValidator`] is bound to one payload. Validation hooks add
//! field rules (or reject outright) and the validator then runs the built-in
//! structural checks followed by every accumulated rule, reporting all
//! violations at once.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::config::ValidationConfig;
use crate::models::DataMap;

/// Field name used for violations that concern the payload as a whole
pub const PAYLOAD_FIELD: &str = "$payload";

/// Structural limits applied to every payload before field rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralLimits {
    pub max_payload_bytes: usize,
    pub max_depth: usize,
    pub max_keys: usize,
    pub max_string_length: usize,
}

impl Default for StructuralLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
            max_depth: 10,
            max_keys: 1000,
            max_string_length: 10000,
        }
    }
}

impl From<&ValidationConfig> for StructuralLimits {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
            max_depth: config.max_depth,
            max_keys: config.max_keys,
            max_string_length: config.max_string_length,
        }
    }
}

/// JSON value kinds a [`Rule::Type`] can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ValueKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// A field rule contributed by a validation hook
///
/// Every rule except `Required` passes when the field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "arg", rename_all = "snake_case")]
pub enum Rule {
    /// Present, not null, not an empty string or collection
    Required,
    Type(ValueKind),
    /// Numeric lower bound, or minimum length for strings and arrays
    Min(f64),
    /// Numeric upper bound, or maximum length for strings and arrays
    Max(f64),
    OneOf(Vec<Value>),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type(_) => "type",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::OneOf(_) => "one_of",
        }
    }

    fn check(&self, field: &str, value: Option<&Value>) -> Option<Violation> {
        let value = match (self, value) {
            (Self::Required, None) | (Self::Required, Some(Value::Null)) => {
                return Some(Violation::new(field, self.name(), format!("The {field} field is required.")));
            }
            (Self::Required, Some(v)) => {
                let empty = match v {
                    Value::String(s) => s.trim().is_empty(),
                    Value::Array(a) => a.is_empty(),
                    Value::Object(o) => o.is_empty(),
                    _ => false,
                };
                return empty.then(|| {
                    Violation::new(field, self.name(), format!("The {field} field is required."))
                });
            }
            (_, None) => return None,
            (_, Some(v)) => v,
        };

        match self {
            Self::Required => None,
            Self::Type(kind) => (!kind.matches(value)).then(|| {
                Violation::new(
                    field,
                    self.name(),
                    format!("The {field} field must be of type {}.", kind.as_str()),
                )
            }),
            Self::Min(min) => measure(value).and_then(|size| {
                (size < *min).then(|| {
                    Violation::new(field, self.name(), format!("The {field} field must be at least {min}."))
                })
            }),
            Self::Max(max) => measure(value).and_then(|size| {
                (size > *max).then(|| {
                    Violation::new(
                        field,
                        self.name(),
                        format!("The {field} field may not be greater than {max}."),
                    )
                })
            }),
            Self::OneOf(allowed) => (!allowed.contains(value)).then(|| {
                Violation::new(field, self.name(), format!("The selected {field} is invalid."))
            }),
        }
    }
}

/// Numeric size of a value for min/max rules
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(a) => Some(a.len() as f64),
        _ => None,
    }
}

/// Look up a dot-separated field path (`customer.address.city`)
fn lookup<'a>(data: &'a DataMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Payload rejected by a hook or a structural check
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation failed with {} violation(s): {}", .violations.len(), summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Single-violation error, convenient for hooks that reject directly
    pub fn single(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(field, rule, message)])
    }

    /// Violations for one field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }
}

/// Structural validator bound to one payload
#[derive(Debug)]
pub struct DataValidator<'a> {
    data: &'a DataMap,
    limits: &'a StructuralLimits,
    rules: Vec<(String, Rule)>,
    violations: Vec<Violation>,
}

impl<'a> DataValidator<'a> {
    pub fn new(data: &'a DataMap, limits: &'a StructuralLimits) -> Self {
        Self {
            data,
            limits,
            rules: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Payload under validation
    pub fn data(&self) -> &'a DataMap {
        self.data
    }

    /// Add a rule for `field` (dot paths reach into nested objects)
    pub fn rule(&mut self, field: impl Into<String>, rule: Rule) -> &mut Self {
        self.rules.push((field.into(), rule));
        self
    }

    /// Record a violation found by hook-specific logic
    pub fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.violations.push(Violation::new(field, "custom", message));
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run structural checks and every accumulated rule
    pub fn validate(self) -> Result<(), ValidationError> {
        let mut violations = self.violations;
        check_structure(self.data, self.limits, &mut violations);

        for (field, rule) in &self.rules {
            if let Some(violation) = rule.check(field, lookup(self.data, field)) {
                violations.push(violation);
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

/// Size and shape limits on the whole payload
fn check_structure(data: &DataMap, limits: &StructuralLimits, violations: &mut Vec<Violation>) {
    match serde_json::to_string(data) {
        Ok(serialized) if serialized.len() > limits.max_payload_bytes => {
            violations.push(Violation::new(
                PAYLOAD_FIELD,
                "max_payload_bytes",
                format!(
                    "Payload too large: {} bytes (max: {})",
                    serialized.len(),
                    limits.max_payload_bytes
                ),
            ));
            return;
        }
        Ok(_) => {}
        Err(e) => {
            violations.push(Violation::new(
                PAYLOAD_FIELD,
                "structure",
                format!("Invalid payload structure: {e}"),
            ));
            return;
        }
    }

    if data.len() > limits.max_keys {
        violations.push(Violation::new(
            PAYLOAD_FIELD,
            "max_keys",
            format!("Too many keys: {} (max: {})", data.len(), limits.max_keys),
        ));
    }
    for (key, value) in data {
        if key.len() > limits.max_string_length {
            violations.push(Violation::new(
                PAYLOAD_FIELD,
                "max_string_length",
                format!(
                    "Key too long: {} chars (max: {})",
                    key.len(),
                    limits.max_string_length
                ),
            ));
            continue;
        }
        check_value(key, value, 1, limits, violations);
    }
}

fn check_value(
    path: &str,
    value: &Value,
    depth: usize,
    limits: &StructuralLimits,
    violations: &mut Vec<Violation>,
) {
    if depth > limits.max_depth {
        violations.push(Violation::new(
            path,
            "max_depth",
            format!("Nesting too deep: {depth} (max: {})", limits.max_depth),
        ));
        return;
    }

    match value {
        Value::Object(map) => {
            if map.len() > limits.max_keys {
                violations.push(Violation::new(
                    path,
                    "max_keys",
                    format!("Too many keys: {} (max: {})", map.len(), limits.max_keys),
                ));
            }
            for (key, val) in map {
                if key.len() > limits.max_string_length {
                    violations.push(Violation::new(
                        path,
                        "max_string_length",
                        format!(
                            "Key too long: {} chars (max: {})",
                            key.len(),
                            limits.max_string_length
                        ),
                    ));
                    continue;
                }
                check_value(&format!("{path}.{key}"), val, depth + 1, limits, violations);
            }
        }
        Value::Array(items) => {
            if items.len() > limits.max_keys {
                violations.push(Violation::new(
                    path,
                    "max_keys",
                    format!("Array too large: {} items (max: {})", items.len(), limits.max_keys),
                ));
            }
            for (index, item) in items.iter().enumerate() {
                check_value(&format!("{path}.{index}"), item, depth + 1, limits, violations);
            }
        }
        Value::String(s) if s.len() > limits.max_string_length => {
            violations.push(Violation::new(
                path,
                "max_string_length",
                format!(
                    "String too long: {} chars (max: {})",
                    s.len(),
                    limits.max_string_length
                ),
            ));
        }
        _ => {}
    }
}

//! Type conversion registry
//!
//! Rules declare a source and destination type for their key. Converting
//! between two declared types goes through this registry; a pair nobody
//! registered is a configuration error, never a silent fallback.

use crate::errors::NetprintError;
use crate::value::{Value, ValueType};
use std::collections::BTreeMap;
use thiserror::Error;

/// A pure conversion function
pub type Converter = fn(&Value) -> Result<Value, String>;

/// Failure of a single conversion, before rule context is attached
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("no conversion registered from {from} to {to}")]
    Unregistered { from: ValueType, to: ValueType },

    #[error("cannot convert {value} from {from} to {to}: {reason}")]
    Failed {
        from: ValueType,
        to: ValueType,
        value: String,
        reason: String,
    },
}

impl ConversionError {
    /// Attach the index of the rule that requested the conversion
    pub fn at_rule(self, rule_index: usize) -> NetprintError {
        match self {
            ConversionError::Unregistered { from, to } => NetprintError::UnregisteredConversion {
                rule_index,
                from,
                to,
            },
            ConversionError::Failed {
                from,
                to,
                value,
                reason,
            } => NetprintError::ConversionFailed {
                from,
                to,
                value,
                reason,
            },
        }
    }
}

/// Registry of converters keyed by (source type, destination type)
#[derive(Debug, Clone, Default)]
pub struct ConversionRegistry {
    converters: BTreeMap<(ValueType, ValueType), Converter>,
}

impl ConversionRegistry {
    /// A registry with no converters; only identity conversions succeed
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with the scalar conversions device data usually needs
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ValueType::String, ValueType::Integer, string_to_integer);
        registry.register(ValueType::Integer, ValueType::String, to_string);
        registry.register(ValueType::String, ValueType::Float, string_to_float);
        registry.register(ValueType::Float, ValueType::String, to_string);
        registry.register(ValueType::String, ValueType::Bool, string_to_bool);
        registry.register(ValueType::Bool, ValueType::String, to_string);
        registry.register(ValueType::Integer, ValueType::Float, integer_to_float);
        registry.register(ValueType::Float, ValueType::Integer, float_to_integer);
        registry
    }

    /// Register (or replace) the converter for a pair
    pub fn register(&mut self, from: ValueType, to: ValueType, converter: Converter) -> &mut Self {
        self.converters.insert((from, to), converter);
        self
    }

    /// True when `convert(from, to, _)` can be attempted
    pub fn is_registered(&self, from: ValueType, to: ValueType) -> bool {
        from == to || self.converters.contains_key(&(from, to))
    }

    /// Convert `value` from `from` to `to`. Same-type conversion is identity.
    pub fn convert(
        &self,
        from: ValueType,
        to: ValueType,
        value: &Value,
    ) -> Result<Value, ConversionError> {
        if from == to {
            return Ok(value.clone());
        }
        let converter = self
            .converters
            .get(&(from, to))
            .ok_or(ConversionError::Unregistered { from, to })?;
        converter(value).map_err(|reason| ConversionError::Failed {
            from,
            to,
            value: value.to_string(),
            reason,
        })
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, found {}", value.type_name()))
}

fn string_to_integer(value: &Value) -> Result<Value, String> {
    expect_str(value)?
        .trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|e| e.to_string())
}

fn string_to_float(value: &Value) -> Result<Value, String> {
    expect_str(value)?
        .trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|e| e.to_string())
}

fn string_to_bool(value: &Value) -> Result<Value, String> {
    match expect_str(value)?.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "enabled" => Ok(Value::Bool(true)),
        "false" | "no" | "disabled" => Ok(Value::Bool(false)),
        other => Err(format!("not a boolean: {}", other)),
    }
}

fn to_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::Null => Err("null has no string form".to_string()),
        other => Ok(Value::Str(other.to_string())),
    }
}

fn integer_to_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        other => Err(format!("expected an integer, found {}", other.type_name())),
    }
}

fn float_to_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
            Ok(Value::Int(*x as i64))
        }
        Value::Float(x) => Err(format!("{} is not a whole number", x)),
        other => Err(format!("expected a float, found {}", other.type_name())),
    }
}

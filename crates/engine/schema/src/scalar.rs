use serde_json::Value;

use crate::EnumDefinition;

#[derive(Debug, Clone)]
pub struct ScalarDefinition {
    pub name: String,
    pub description: Option<String>,
    pub builtin: Option<BuiltinScalar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter, strum::AsRefStr)]
pub enum BuiltinScalar {
    Int,
    Float,
    String,
    Boolean,
    #[strum(serialize = "ID")]
    Id,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("{scalar} cannot represent value: {value}")]
    InvalidScalar { scalar: String, value: Value },
    #[error("Enum {name} cannot represent value: {value}")]
    InvalidEnumValue { name: String, value: Value },
}

impl ScalarDefinition {
    /// Coerces a resolved value into the serialized form of this scalar.
    /// Custom scalars are passed through untouched.
    pub fn coerce_output(&self, value: &Value) -> Result<Value, CoercionError> {
        let Some(builtin) = self.builtin else {
            return Ok(value.clone());
        };
        let coerced = match (builtin, value) {
            (BuiltinScalar::Int, Value::Number(n)) => {
                if let Some(int) = n.as_i64() {
                    i32::try_from(int).ok().map(Value::from)
                } else {
                    n.as_f64().filter(|f| can_coerce_to_int(*f)).map(|f| Value::from(f as i32))
                }
            }
            (BuiltinScalar::Int, Value::Bool(b)) => Some(Value::from(i32::from(*b))),
            (BuiltinScalar::Float, Value::Number(n)) => n.as_f64().map(Value::from),
            (BuiltinScalar::String, Value::String(_)) => Some(value.clone()),
            (BuiltinScalar::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (BuiltinScalar::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (BuiltinScalar::Boolean, Value::Bool(_)) => Some(value.clone()),
            (BuiltinScalar::Id, Value::String(_)) => Some(value.clone()),
            (BuiltinScalar::Id, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(Value::String(n.to_string())),
            _ => None,
        };
        coerced.ok_or_else(|| CoercionError::InvalidScalar {
            scalar: self.name.clone(),
            value: value.clone(),
        })
    }
}

impl EnumDefinition {
    pub fn coerce_output(&self, value: &Value) -> Result<Value, CoercionError> {
        match value {
            Value::String(name) if self.contains(name) => Ok(value.clone()),
            _ => Err(CoercionError::InvalidEnumValue {
                name: self.name.clone(),
                value: value.clone(),
            }),
        }
    }
}

fn can_coerce_to_int(float: f64) -> bool {
    float.floor() == float && float < (i32::MAX as f64) && float > (i32::MIN as f64)
}

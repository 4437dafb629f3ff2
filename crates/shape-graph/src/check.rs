//! Constraints attached to shapes
//!
//! Every check has a string kind tag (`string.max`, `number.gt`, ...) and a
//! parameter. The tag is what consumers match on, so custom checks can share
//! the list with the built-in ones without being interpreted.

use serde_json::{Number, Value};

pub const STRING_MIN_LENGTH: &str = "string.min";
pub const STRING_MAX_LENGTH: &str = "string.max";
pub const STRING_PATTERN: &str = "string.regex";
pub const NUMBER_INTEGER: &str = "number.int";
pub const NUMBER_GTE: &str = "number.gte";
pub const NUMBER_LTE: &str = "number.lte";
pub const NUMBER_GT: &str = "number.gt";
pub const NUMBER_LT: &str = "number.lt";
pub const NUMBER_MULTIPLE_OF: &str = "number.multipleOf";
pub const ARRAY_MIN_LENGTH: &str = "array.min";
pub const ARRAY_MAX_LENGTH: &str = "array.max";
pub const SET_MIN_SIZE: &str = "set.min";
pub const SET_MAX_SIZE: &str = "set.max";

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    StringMinLength(u64),
    StringMaxLength(u64),
    StringPattern(String),
    Integer,
    NumberGreaterThanOrEqual(Number),
    NumberLessThanOrEqual(Number),
    NumberGreaterThan(Number),
    NumberLessThan(Number),
    NumberMultipleOf(Number),
    ArrayMinLength(u64),
    ArrayMaxLength(u64),
    SetMinSize(u64),
    SetMaxSize(u64),
    /// A user-defined check. Ignored by schema generation.
    Custom { kind: String, param: Value },
}

impl Check {
    pub fn custom(kind: impl Into<String>, param: Value) -> Self {
        Check::Custom {
            kind: kind.into(),
            param,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Check::StringMinLength(_) => STRING_MIN_LENGTH,
            Check::StringMaxLength(_) => STRING_MAX_LENGTH,
            Check::StringPattern(_) => STRING_PATTERN,
            Check::Integer => NUMBER_INTEGER,
            Check::NumberGreaterThanOrEqual(_) => NUMBER_GTE,
            Check::NumberLessThanOrEqual(_) => NUMBER_LTE,
            Check::NumberGreaterThan(_) => NUMBER_GT,
            Check::NumberLessThan(_) => NUMBER_LT,
            Check::NumberMultipleOf(_) => NUMBER_MULTIPLE_OF,
            Check::ArrayMinLength(_) => ARRAY_MIN_LENGTH,
            Check::ArrayMaxLength(_) => ARRAY_MAX_LENGTH,
            Check::SetMinSize(_) => SET_MIN_SIZE,
            Check::SetMaxSize(_) => SET_MAX_SIZE,
            Check::Custom { kind, .. } => kind,
        }
    }

    /// The parameter as a JSON value (`null` for parameterless checks).
    pub fn param(&self) -> Value {
        match self {
            Check::StringMinLength(n)
            | Check::StringMaxLength(n)
            | Check::ArrayMinLength(n)
            | Check::ArrayMaxLength(n)
            | Check::SetMinSize(n)
            | Check::SetMaxSize(n) => Value::from(*n),
            Check::StringPattern(pattern) => Value::String(pattern.clone()),
            Check::Integer => Value::Null,
            Check::NumberGreaterThanOrEqual(n)
            | Check::NumberLessThanOrEqual(n)
            | Check::NumberGreaterThan(n)
            | Check::NumberLessThan(n)
            | Check::NumberMultipleOf(n) => Value::Number(n.clone()),
            Check::Custom { param, .. } => param.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Check::StringMaxLength(3).kind(), "string.max");
        assert_eq!(Check::NumberGreaterThan(1.into()).kind(), "number.gt");
        assert_eq!(Check::custom("user.even", json!(null)).kind(), "user.even");
    }

    #[test]
    fn test_param_values() {
        assert_eq!(Check::ArrayMinLength(2).param(), json!(2));
        assert_eq!(Check::StringPattern("^a".into()).param(), json!("^a"));
        assert_eq!(Check::Integer.param(), json!(null));
        assert_eq!(Check::NumberMultipleOf(5.into()).param(), json!(5));
    }
}

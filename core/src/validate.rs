//! Declarative argument checks run before any request is built.
//!
//! Each operation owns a `&'static [Rule]`. `validate` walks the rules in
//! order against the JSON form of the operation's options and stops at the
//! first failure. Field names are wire names; a dotted name such as
//! `container.image` reaches into nested objects.

use serde_json::Value;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The field must be present.
    Required(&'static str),
    /// The field must be present and not `0` or `false`.
    Truthy(&'static str),
    /// At least one of the fields must be present.
    OneOf(&'static [&'static str]),
    /// The two fields must not both be present.
    Exclusive(&'static str, &'static str),
    /// Insert a literal when the top-level field is absent.
    Default(&'static str, Literal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Bool(b) => Value::Bool(b),
        }
    }
}

/// Resolve a dotted field path.
pub fn lookup<'a>(options: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(options, |value, key| value.get(key))
}

/// Present means set, non-null and not an empty string. `0` and `false` are
/// present.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Present and not a zero number or `false`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        other => is_present(other),
    }
}

pub fn validate(
    operation: &'static str,
    rules: &[Rule],
    options: &mut Value,
) -> Result<(), ValidationError> {
    for rule in rules {
        match *rule {
            Rule::Required(field) => {
                if !is_present(lookup(options, field)) {
                    return Err(ValidationError::Missing { operation, field });
                }
            }
            Rule::Truthy(field) => {
                if !is_truthy(lookup(options, field)) {
                    return Err(ValidationError::Missing { operation, field });
                }
            }
            Rule::OneOf(fields) => {
                if !fields.iter().any(|f| is_present(lookup(options, f))) {
                    return Err(ValidationError::MissingOneOf { operation, fields });
                }
            }
            Rule::Exclusive(a, b) => {
                if is_present(lookup(options, a)) && is_present(lookup(options, b)) {
                    return Err(ValidationError::Conflict {
                        operation,
                        fields: [a, b],
                    });
                }
            }
            Rule::Default(field, literal) => {
                if let Value::Object(map) = options {
                    match map.get(field) {
                        None | Some(Value::Null) => {
                            map.insert(field.to_string(), literal.into());
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }
    Ok(())
}

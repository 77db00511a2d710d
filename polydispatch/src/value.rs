//! Runtime value representation for the object system.
//!
//! Values are dynamically typed vectors in the style of the base types the
//! class registry knows about. Every value reports a runtime class name,
//! which is what slot checks and dispatch score against the class graph.

use crate::class::{
    CHARACTER_CLASS, FUNCTION_CLASS, INTEGER_CLASS, LIST_CLASS, LOGICAL_CLASS, NULL_CLASS,
    NUMERIC_CLASS,
};
use crate::error::Result;
use crate::instance::Instance;
use std::fmt;

/// Runtime values handled by slots and generic functions
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The empty object
    Null,
    /// Boolean vector
    Logical(Vec<bool>),
    /// 64-bit signed integer vector
    Integer(Vec<i64>),
    /// 64-bit floating point vector
    Numeric(Vec<f64>),
    /// UTF-8 string vector
    Character(Vec<String>),
    /// Heterogeneous list
    List(Vec<Value>),
    /// Native function
    Function(NativeFunction),
    /// Object of a declared class
    Instance(Instance),
    /// Object owned by a foreign class system
    Foreign(ForeignObject),
}

/// A host function stored as a value
#[derive(Debug, Clone, PartialEq)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub function: fn(&[Value]) -> Result<Value>,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, arity: usize, function: fn(&[Value]) -> Result<Value>) -> Self {
        Self {
            name: name.into(),
            arity,
            function,
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.function)(args)
    }
}

/// An opaque value tagged with the name of a registered foreign class
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignObject {
    pub class: String,
    pub payload: Box<Value>,
}

impl Value {
    pub fn numeric(value: f64) -> Self {
        Value::Numeric(vec![value])
    }

    pub fn integer(value: i64) -> Self {
        Value::Integer(vec![value])
    }

    pub fn logical(value: bool) -> Self {
        Value::Logical(vec![value])
    }

    pub fn character(value: impl Into<String>) -> Self {
        Value::Character(vec![value.into()])
    }

    pub fn foreign(class: impl Into<String>, payload: Value) -> Self {
        Value::Foreign(ForeignObject {
            class: class.into(),
            payload: Box::new(payload),
        })
    }

    /// Get the runtime class name of this value
    pub fn class_name(&self) -> &str {
        match self {
            Value::Null => NULL_CLASS,
            Value::Logical(_) => LOGICAL_CLASS,
            Value::Integer(_) => INTEGER_CLASS,
            Value::Numeric(_) => NUMERIC_CLASS,
            Value::Character(_) => CHARACTER_CLASS,
            Value::List(_) => LIST_CLASS,
            Value::Function(_) => FUNCTION_CLASS,
            Value::Instance(instance) => instance.class_name(),
            Value::Foreign(object) => &object.class,
        }
    }

    /// Number of elements; objects and functions count as one
    pub fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Logical(v) => v.len(),
            Value::Integer(v) => v.len(),
            Value::Numeric(v) => v.len(),
            Value::Character(v) => v.len(),
            Value::List(v) => v.len(),
            Value::Function(_) | Value::Instance(_) | Value::Foreign(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Value::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_character(&self) -> Option<&[String]> {
        match self {
            Value::Character(v) => Some(v),
            _ => None,
        }
    }

    /// First element as a float, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => v.first().copied(),
            Value::Integer(v) => v.first().map(|n| *n as f64),
            _ => None,
        }
    }

    /// First element as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Character(v) => v.first().map(String::as_str),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn to_string_repr(&self) -> String {
        fn join<T: ToString>(items: &[T]) -> String {
            items
                .iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        }

        match self {
            Value::Null => "NULL".to_string(),
            Value::Logical(v) if v.is_empty() => "logical(0)".to_string(),
            Value::Integer(v) if v.is_empty() => "integer(0)".to_string(),
            Value::Numeric(v) if v.is_empty() => "numeric(0)".to_string(),
            Value::Character(v) if v.is_empty() => "character(0)".to_string(),
            Value::Logical(v) => v
                .iter()
                .map(|b| if *b { "TRUE" } else { "FALSE" })
                .collect::<Vec<_>>()
                .join(" "),
            Value::Integer(v) => join(v),
            Value::Numeric(v) => join(v),
            Value::Character(v) => v
                .iter()
                .map(|s| format!("\"{}\"", s))
                .collect::<Vec<_>>()
                .join(" "),
            Value::List(items) => {
                let item_strings: Vec<String> = items.iter().map(|v| v.to_string_repr()).collect();
                format!("list({})", item_strings.join(", "))
            }
            Value::Function(function) => format!("<function {}/{}>", function.name, function.arity),
            Value::Instance(instance) => format!("<object of class \"{}\">", instance.class_name()),
            Value::Foreign(object) => {
                format!("<{}: {}>", object.class, object.payload.to_string_repr())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_repr())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::numeric(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::logical(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::character(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Character(vec![value])
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Numeric(values)
    }
}

impl From<Vec<i64>> for Value {
    fn from(values: Vec<i64>) -> Self {
        Value::Integer(values)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<NativeFunction> for Value {
    fn from(function: NativeFunction) -> Self {
        Value::Function(function)
    }
}

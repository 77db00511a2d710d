//! Objects of declared classes and the slot type rules
//!
//! An [`Instance`] only records its class by name. Slot access is always
//! checked against the class definition current at the time of access, so a
//! redefined class changes what its existing objects may read and write.

use crate::class::{
    SlotDef, SlotType, CHARACTER_CLASS, INTEGER_CLASS, LIST_CLASS, LOGICAL_CLASS, NUMERIC_CLASS,
};
use crate::graph::ClassGraph;
use crate::value::Value;
use indexmap::IndexMap;

/// An object: a class name and its slot values
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    slots: IndexMap<String, Value>,
}

impl Instance {
    pub(crate) fn new(class: impl Into<String>, slots: IndexMap<String, Value>) -> Self {
        Self {
            class: class.into(),
            slots,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Slot values as stored, without consulting the class definition
    pub fn stored_slots(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// A slot value as stored, without consulting the class definition
    pub fn stored(&self, slot: &str) -> Option<&Value> {
        self.slots.get(slot)
    }

    pub(crate) fn store(&mut self, slot: &str, value: Value) {
        self.slots.insert(slot.to_string(), value);
    }

    pub(crate) fn has_stored(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }
}

/// Base types whose zero value is an empty vector rather than `NULL`
fn is_vector_type(name: &str) -> bool {
    matches!(
        name,
        LOGICAL_CLASS | INTEGER_CLASS | NUMERIC_CLASS | CHARACTER_CLASS | LIST_CLASS
    )
}

/// Whether `value` may be stored in a slot declared as `declared`.
///
/// `NULL` stands for an unset object, so it is accepted by object-typed slots
/// but not by vector-typed ones. Length is never checked.
pub fn assignable(graph: &ClassGraph<'_>, declared: &SlotType, value: &Value) -> bool {
    match declared {
        SlotType::Any => true,
        SlotType::Class(class) => {
            if matches!(value, Value::Null) {
                return !is_vector_type(class);
            }
            graph.is_subclass_of(value.class_name(), class)
        }
    }
}

/// Zero value of a declared slot type
pub fn zero_value(declared: &SlotType) -> Value {
    match declared.name() {
        LOGICAL_CLASS => Value::Logical(Vec::new()),
        INTEGER_CLASS => Value::Integer(Vec::new()),
        NUMERIC_CLASS => Value::Numeric(Vec::new()),
        CHARACTER_CLASS => Value::Character(Vec::new()),
        LIST_CLASS => Value::List(Vec::new()),
        // NULL, function, ANY and every object type
        _ => Value::Null,
    }
}

/// Object of `class` with every slot at its prototype or zero value
pub(crate) fn prototype(class: &str, slots: &IndexMap<String, SlotDef>) -> Instance {
    let values = slots
        .iter()
        .map(|(name, def)| {
            let value = def
                .default
                .clone()
                .unwrap_or_else(|| zero_value(&def.declared_type));
            (name.clone(), value)
        })
        .collect();
    Instance::new(class, values)
}

//! Object construction, slot access and validation
//!
//! Construction builds the class prototype, runs it through the `initialize`
//! generic and validates the result. Slot access is checked against the
//! current class definition every time.

use crate::class::{ClassOrigin, ValidityFn};
use crate::dispatch::{Arguments, MethodCall};
use crate::error::{ObjectError, Result};
use crate::generic::INITIALIZE;
use crate::instance::{self, assignable, Instance};
use crate::system::ObjectSystem;
use crate::value::Value;
use tracing::debug;

impl ObjectSystem {
    /// Create an object of `class`.
    ///
    /// Positional arguments are objects of ancestor classes whose slots seed
    /// the new object; named arguments set slots.
    pub fn construct(&self, class: &str, args: impl Into<Arguments>) -> Result<Instance> {
        let prototype = {
            let state = self.read();
            let def = state.classes.require(class)?;
            if def.is_virtual {
                return Err(ObjectError::VirtualInstantiation {
                    class: class.to_string(),
                });
            }
            if matches!(def.origin, ClassOrigin::Builtin | ClassOrigin::Foreign) {
                return Err(ObjectError::NotConstructible {
                    class: class.to_string(),
                });
            }
            let slots = state.classes.effective_slots(class)?;
            instance::prototype(class, &slots)
        };

        let args = args.into().prepend(Value::Instance(prototype));
        let object = match self.invoke(INITIALIZE, args)? {
            Value::Instance(object) if object.class_name() == class => object,
            other => {
                return Err(ObjectError::InvalidInitializeResult {
                    class: class.to_string(),
                    found: other.class_name().to_string(),
                })
            }
        };

        self.validate(&object)?;
        debug!(class = %class, "constructed object");
        Ok(object)
    }

    /// Read a slot declared on the object's class or an ancestor
    pub fn get_slot<'i>(&self, object: &'i Instance, slot: &str) -> Result<&'i Value> {
        let state = self.read();
        let class = object.class_name();
        let slots = state.classes.effective_slots(class)?;
        if !slots.contains_key(slot) {
            return Err(ObjectError::unknown_slot(class, slot));
        }
        object
            .stored(slot)
            .ok_or_else(|| ObjectError::unknown_slot(class, slot))
    }

    /// Write a slot after checking the value against the declared type
    pub fn set_slot(&self, object: &mut Instance, slot: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let state = self.read();
        let class = object.class_name();
        let slots = state.classes.effective_slots(class)?;
        let def = slots
            .get(slot)
            .ok_or_else(|| ObjectError::unknown_slot(class, slot))?;

        if !assignable(&state.classes.graph(), &def.declared_type, &value) {
            return Err(ObjectError::SlotType {
                class: class.to_string(),
                slot: slot.to_string(),
                expected: def.declared_type.name().to_string(),
                found: value.class_name().to_string(),
            });
        }

        object.store(slot, value);
        Ok(())
    }

    /// Check slot types, then run validity functions from the most distant
    /// ancestor down to the object's own class
    pub fn validate(&self, object: &Instance) -> Result<()> {
        let class = object.class_name();
        let checks: Vec<(String, ValidityFn)> = {
            let state = self.read();
            let slots = state.classes.effective_slots(class)?;
            let graph = state.classes.graph();

            if let Some((stale, _)) = object
                .stored_slots()
                .find(|(name, _)| !slots.contains_key(*name))
            {
                return Err(ObjectError::unknown_slot(class, stale));
            }
            for (name, def) in &slots {
                let value = object
                    .stored(name)
                    .ok_or_else(|| ObjectError::unknown_slot(class, name))?;
                if !assignable(&graph, &def.declared_type, value) {
                    return Err(ObjectError::SlotType {
                        class: class.to_string(),
                        slot: name.clone(),
                        expected: def.declared_type.name().to_string(),
                        found: value.class_name().to_string(),
                    });
                }
            }

            let ancestors = graph.ancestors(class).unwrap_or_default();
            ancestors
                .iter()
                .rev()
                .filter_map(|(name, _)| {
                    let check = state.classes.get(name)?.validity.clone()?;
                    Some((name.clone(), check))
                })
                .collect()
        };

        for (owner, check) in checks {
            check(object).map_err(|message| {
                debug!(class = %class, validity_of = %owner, "object failed validity check");
                ObjectError::invalid_object(class, message)
            })?;
        }
        Ok(())
    }

    /// The object's class followed by its ancestors, nearest first
    pub fn classes_of(&self, object: &Instance) -> Result<Vec<String>> {
        self.ancestors_of(object.class_name())
    }

    /// Whether the object belongs to `class` directly or by inheritance
    pub fn instance_of(&self, object: &Instance, class: &str) -> bool {
        self.is_subclass_of(object.class_name(), class)
    }
}

/// Default `initialize` method, registered for `ANY`
pub(crate) fn default_initialize(call: &mut MethodCall<'_>) -> Result<Value> {
    let mut object = call
        .arg(0)
        .and_then(Value::as_instance)
        .cloned()
        .ok_or_else(|| call.fail(".Object must be an object"))?;
    let system = call.system();

    for seed in call.rest() {
        let related = seed
            .as_instance()
            .filter(|seed| system.is_subclass_of(object.class_name(), seed.class_name()));
        let Some(seed) = related else {
            return Err(ObjectError::UnrelatedSeed {
                class: object.class_name().to_string(),
                seed: seed.class_name().to_string(),
            });
        };
        for (slot, value) in seed.stored_slots() {
            if object.has_stored(slot) {
                system.set_slot(&mut object, slot, value.clone())?;
            }
        }
    }

    for (slot, value) in call.rest_named() {
        system.set_slot(&mut object, slot, value.clone())?;
    }

    Ok(Value::Instance(object))
}

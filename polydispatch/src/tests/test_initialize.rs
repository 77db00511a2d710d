//! Construction through the `initialize` generic

use crate::{Arguments, ClassSpec, ObjectError, ObjectSystem, Signature, Value};
use pretty_assertions::assert_eq;

fn people() -> ObjectSystem {
    let system = ObjectSystem::new();
    system
        .declare_class(
            ClassSpec::new("Person")
                .slot("name", "character")
                .slot("age", "numeric"),
        )
        .unwrap();
    system
        .declare_class(
            ClassSpec::new("Student")
                .contains("Person")
                .slot("school", "character"),
        )
        .unwrap();
    system
}

#[test]
fn test_initialize_is_builtin() {
    let system = ObjectSystem::new();
    let initialize = system.generic("initialize").unwrap();

    assert_eq!(initialize.formal_params, vec![".Object", "..."]);
    assert_eq!(initialize.dispatch_arity, 1);
    assert!(system.has_method("initialize", ["ANY"]));
}

#[test]
fn test_hook_validates_then_delegates() {
    let system = people();
    system
        .declare_method("initialize", ["Person"], |call| {
            if let Some(age) = call.arg_named("age").and_then(Value::as_f64) {
                if age < 0.0 {
                    return Err(call.fail("age must not be negative"));
                }
            }
            call.call_next()
        })
        .unwrap();

    let ann = system
        .construct("Person", Arguments::new().named("name", "Ann").named("age", 30.0))
        .unwrap();
    assert_eq!(system.get_slot(&ann, "age").unwrap(), &Value::numeric(30.0));

    assert_eq!(
        system.construct("Person", [("age", -1.0)]).unwrap_err(),
        ObjectError::MethodFailed {
            generic: "initialize".to_string(),
            signature: Signature::new(["Person"]),
            message: "age must not be negative".to_string(),
        }
    );
}

#[test]
fn test_subclass_hook_runs_before_parent_hook() {
    let system = people();
    system
        .declare_method("initialize", ["Student"], |call| {
            if call.arg_named("school").is_none() {
                call.set_named("school", "unknown");
            }
            call.call_next()
        })
        .unwrap();
    system
        .declare_method("initialize", ["Person"], |call| {
            if call.arg_named("name").is_none() {
                return Err(call.fail("name is required"));
            }
            call.call_next()
        })
        .unwrap();

    let bo = system.construct("Student", [("name", "Bo")]).unwrap();
    assert_eq!(system.get_slot(&bo, "school").unwrap(), &Value::character("unknown"));
    assert_eq!(system.get_slot(&bo, "name").unwrap(), &Value::character("Bo"));

    // The parent hook still guards subclasses
    assert!(matches!(
        system.construct("Student", [("school", "MIT")]),
        Err(ObjectError::MethodFailed { .. })
    ));
}

#[test]
fn test_hook_can_fill_slots_itself() {
    let system = people();
    system
        .declare_method("initialize", ["Person"], |call| {
            let mut object = call.call_next()?.into_instance().ok_or_else(|| call.fail("no object"))?;
            if let Some(name) = call.arg_named("name").and_then(Value::as_str) {
                let upper = name.to_uppercase();
                call.system().set_slot(&mut object, "name", upper)?;
            }
            Ok(Value::Instance(object))
        })
        .unwrap();

    let ann = system.construct("Person", [("name", "ann")]).unwrap();
    assert_eq!(system.get_slot(&ann, "name").unwrap(), &Value::character("ANN"));
}

#[test]
fn test_hook_must_return_an_object_of_the_class() {
    let system = people();
    system
        .declare_method("initialize", ["Person"], |_| Ok(Value::Null))
        .unwrap();

    assert_eq!(
        system.construct("Student", Arguments::new()).unwrap_err(),
        ObjectError::InvalidInitializeResult {
            class: "Student".to_string(),
            found: "NULL".to_string(),
        }
    );
}

#[test]
fn test_ancestor_object_seeds_slots() {
    let system = people();
    let ann = system
        .construct("Person", Arguments::new().named("name", "Ann").named("age", 30.0))
        .unwrap();
    let student = system
        .construct("Student", Arguments::new().arg(ann).named("school", "MIT"))
        .unwrap();

    assert_eq!(system.get_slot(&student, "name").unwrap(), &Value::character("Ann"));
    assert_eq!(system.get_slot(&student, "age").unwrap(), &Value::numeric(30.0));
    assert_eq!(system.get_slot(&student, "school").unwrap(), &Value::character("MIT"));
}

#[test]
fn test_named_values_override_seed() {
    let system = people();
    let ann = system.construct("Person", [("name", "Ann")]).unwrap();
    let student = system
        .construct("Student", Arguments::new().arg(ann).named("name", "Bo"))
        .unwrap();

    assert_eq!(system.get_slot(&student, "name").unwrap(), &Value::character("Bo"));
}

#[test]
fn test_unrelated_seed_is_rejected() {
    let system = people();
    let bo = system.construct("Student", Arguments::new()).unwrap();

    assert_eq!(
        system.construct("Person", Arguments::new().arg(bo)).unwrap_err(),
        ObjectError::UnrelatedSeed {
            class: "Person".to_string(),
            seed: "Student".to_string(),
        }
    );
    assert!(matches!(
        system.construct("Person", Arguments::new().arg(3.0)),
        Err(ObjectError::UnrelatedSeed { .. })
    ));
}

#[test]
fn test_initialize_cannot_lose_its_dots() {
    let system = people();

    assert_eq!(
        system.declare_generic("initialize", ["obj"], 1).unwrap_err(),
        ObjectError::BuiltinGeneric {
            generic: "initialize".to_string()
        }
    );
    // Redeclaring with the built-in formals changes nothing
    system.declare_generic("initialize", [".Object", "..."], 1).unwrap();

    let ann = system.construct("Person", [("name", "Ann")]).unwrap();
    assert_eq!(system.get_slot(&ann, "name").unwrap(), &Value::character("Ann"));
}

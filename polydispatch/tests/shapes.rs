//! End-to-end use of the public API: a small shape hierarchy with typed
//! slots, a construction hook, two-argument dispatch and rendering.

use polydispatch::{Arguments, ClassSpec, Instance, ObjectError, ObjectSystem, Result, Value};
use std::f64::consts::PI;

fn shapes() -> Result<ObjectSystem> {
    let system = ObjectSystem::new();

    system.declare_class(ClassSpec::new("Shape").virtual_class().slot("label", "character"))?;
    system.declare_class(ClassSpec::new("Circle").contains("Shape").slot("r", "numeric"))?;
    system.declare_class(
        ClassSpec::new("Rect")
            .contains("Shape")
            .slot("w", "numeric")
            .slot("h", "numeric"),
    )?;
    system.declare_class(ClassSpec::new("Square").contains("Rect"))?;

    // A square only takes a side and keeps its rectangle consistent
    system.declare_method("initialize", ["Square"], |call| {
        if let Some(side) = call.take_named("side") {
            call.set_named("w", side.clone());
            call.set_named("h", side);
        }
        call.call_next()
    })?;

    system.declare_generic("area", ["shape"], 1)?;
    system.declare_method("area", ["Circle"], |call| {
        let circle = shape_arg(call.required("shape")?)?;
        let r = number(call.system(), &circle, "r")?;
        Ok(Value::numeric(PI * r * r))
    })?;
    system.declare_method("area", ["Rect"], |call| {
        let rect = shape_arg(call.required("shape")?)?;
        let system = call.system();
        Ok(Value::numeric(number(system, &rect, "w")? * number(system, &rect, "h")?))
    })?;

    system.declare_generic("fits", ["inner", "outer"], 2)?;
    system.declare_method("fits", ["Shape", "Shape"], |call| {
        let system = call.system();
        let inner = system.invoke("area", vec![call.required("inner")?.clone()])?;
        let outer = system.invoke("area", vec![call.required("outer")?.clone()])?;
        Ok(Value::logical(inner.as_f64() <= outer.as_f64()))
    })?;
    system.declare_method("fits", ["Square", "Square"], |call| {
        let system = call.system();
        let inner = shape_arg(call.required("inner")?)?;
        let outer = shape_arg(call.required("outer")?)?;
        Ok(Value::logical(number(system, &inner, "w")? <= number(system, &outer, "w")?))
    })?;

    Ok(system)
}

fn shape_arg(value: &Value) -> Result<Instance> {
    value.as_instance().cloned().ok_or_else(|| ObjectError::SlotType {
        class: "Shape".to_string(),
        slot: "shape".to_string(),
        expected: "Shape".to_string(),
        found: value.class_name().to_string(),
    })
}

fn number(system: &ObjectSystem, shape: &Instance, slot: &str) -> Result<f64> {
    Ok(system.get_slot(shape, slot)?.as_f64().unwrap_or(0.0))
}

#[test]
fn test_area_dispatches_through_hierarchy() {
    let system = shapes().unwrap();
    let circle = system.construct("Circle", [("r", 1.0)]).unwrap();
    let square = system.construct("Square", [("side", 3.0)]).unwrap();

    let circle_area = system.invoke("area", Arguments::new().arg(circle)).unwrap();
    let square_area = system.invoke("area", Arguments::new().arg(square.clone())).unwrap();

    assert!((circle_area.as_f64().unwrap() - PI).abs() < 1e-9);
    assert_eq!(square_area, Value::numeric(9.0));
    assert_eq!(system.get_slot(&square, "h").unwrap(), &Value::numeric(3.0));
}

#[test]
fn test_two_argument_dispatch() {
    let system = shapes().unwrap();
    let small = system.construct("Square", [("side", 1.0)]).unwrap();
    let large = system.construct("Square", [("side", 2.0)]).unwrap();
    let circle = system.construct("Circle", [("r", 1.0)]).unwrap();

    let squares = Arguments::new().arg(small.clone()).arg(large);
    let mixed = Arguments::new().arg(small).arg(circle);

    assert_eq!(system.invoke("fits", squares).unwrap(), Value::logical(true));
    assert_eq!(system.invoke("fits", mixed).unwrap(), Value::logical(true));
    assert!(system.take_warnings().is_empty());
}

#[test]
fn test_shape_is_abstract() {
    let system = shapes().unwrap();

    assert!(matches!(
        system.construct("Shape", Arguments::new()),
        Err(ObjectError::VirtualInstantiation { .. })
    ));
    assert!(matches!(
        system.invoke("area", vec![Value::numeric(1.0)]),
        Err(ObjectError::NoApplicableMethod { .. })
    ));
}

#[test]
fn test_render_square() {
    let system = shapes().unwrap();
    let square = system
        .construct("Square", Arguments::new().named("side", 2.0).named("label", "box"))
        .unwrap();

    let rendered = system.render(&square);
    assert!(rendered.starts_with("An object of class \"Square\""));
    assert!(rendered.contains("Slot \"label\":\n\"box\""));

    system
        .register_renderer("Shape", |shape| format!("<{} shape>", shape.class_name()))
        .unwrap();
    assert_eq!(system.render(&square), "<Square shape>");
}

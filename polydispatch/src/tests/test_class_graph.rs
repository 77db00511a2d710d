use crate::{ClassSpec, Distance, ObjectError, ObjectSystem};
use pretty_assertions::assert_eq;

fn chain() -> ObjectSystem {
    let system = ObjectSystem::new();
    system.declare_class(ClassSpec::new("A")).unwrap();
    system.declare_class(ClassSpec::new("B").contains("A")).unwrap();
    system.declare_class(ClassSpec::new("C").contains("B")).unwrap();
    system
}

#[test]
fn test_distance_along_chain() {
    let system = chain();

    assert_eq!(system.distance("A", "A"), Distance::Finite(0));
    assert_eq!(system.distance("B", "A"), Distance::Finite(1));
    assert_eq!(system.distance("C", "A"), Distance::Finite(2));
    assert_eq!(system.distance("A", "C"), Distance::Unreachable);
    assert!(system.is_subclass_of("C", "B"));
    assert!(!system.is_subclass_of("B", "C"));
}

#[test]
fn test_unrelated_and_unknown_classes_are_unreachable() {
    let system = chain();
    system.declare_class(ClassSpec::new("Lonely")).unwrap();

    assert_eq!(system.distance("Lonely", "A"), Distance::Unreachable);
    assert_eq!(system.distance("A", "Lonely"), Distance::Unreachable);
    assert_eq!(system.distance("Nope", "A"), Distance::Unreachable);
}

#[test]
fn test_builtin_integer_is_numeric() {
    let system = ObjectSystem::new();

    assert_eq!(system.distance("integer", "numeric"), Distance::Finite(1));
    assert!(system.has_class("character"));
    assert!(system.has_class("NULL"));
}

#[test]
fn test_ancestors_shortest_distance_and_parent_order() {
    let system = ObjectSystem::new();
    system.declare_class(ClassSpec::new("Root")).unwrap();
    system.declare_class(ClassSpec::new("Left").contains("Root")).unwrap();
    system.declare_class(ClassSpec::new("Right").contains("Root")).unwrap();
    system
        .declare_class(ClassSpec::new("Both").contains("Right").contains("Left"))
        .unwrap();

    assert_eq!(
        system.ancestors_of("Both").unwrap(),
        vec!["Both", "Right", "Left", "Root"]
    );
    assert_eq!(system.distance("Both", "Root"), Distance::Finite(2));
}

#[test]
fn test_unknown_parent_is_rejected() {
    let system = ObjectSystem::new();
    let result = system.declare_class(ClassSpec::new("Orphan").contains("Nowhere"));

    assert_eq!(
        result.unwrap_err(),
        ObjectError::UnknownParent {
            class: "Orphan".to_string(),
            parent: "Nowhere".to_string(),
        }
    );
    assert!(!system.has_class("Orphan"));
}

#[test]
fn test_reserved_names_cannot_be_declared() {
    let system = ObjectSystem::new();

    for name in ["ANY", "missing", "numeric", "integer"] {
        assert_eq!(
            system.declare_class(ClassSpec::new(name)).unwrap_err(),
            ObjectError::ReservedClassName {
                class: name.to_string()
            }
        );
    }
}

#[test]
fn test_redeclaring_replaces_parents() {
    let system = chain();
    system.declare_class(ClassSpec::new("Other")).unwrap();
    system.declare_class(ClassSpec::new("B").contains("Other")).unwrap();

    assert_eq!(system.distance("C", "A"), Distance::Unreachable);
    assert_eq!(system.distance("C", "Other"), Distance::Finite(2));
}

#[test]
fn test_cycle_from_redefinition_terminates() {
    let system = chain();
    // A now inherits from its own descendant
    system.declare_class(ClassSpec::new("A").contains("C")).unwrap();

    assert_eq!(system.distance("A", "B"), Distance::Finite(2));
    assert_eq!(system.ancestors_of("A").unwrap(), vec!["A", "C", "B"]);
}

#[test]
fn test_class_union_is_virtual_parent() {
    let system = ObjectSystem::new();
    system.declare_class(ClassSpec::new("Circle")).unwrap();
    system.declare_class(ClassSpec::new("Square")).unwrap();

    let union = system.declare_class_union("Shape", ["Circle", "Square"]).unwrap();

    assert!(union.is_virtual);
    assert!(system.is_virtual_class("Shape"));
    assert!(system.is_subclass_of("Circle", "Shape"));
    assert!(system.is_subclass_of("Square", "Shape"));
    assert_eq!(system.distance("Circle", "Shape"), Distance::Finite(1));
}

#[test]
fn test_class_union_requires_known_members() {
    let system = ObjectSystem::new();
    system.declare_class(ClassSpec::new("Circle")).unwrap();

    assert_eq!(
        system
            .declare_class_union("Shape", ["Circle", "Hexagon"])
            .unwrap_err(),
        ObjectError::UnknownClass {
            class: "Hexagon".to_string()
        }
    );
}

#[test]
fn test_independent_systems_share_nothing() {
    let first = chain();
    let second = ObjectSystem::new();
    let shared = first.clone();

    assert!(!second.has_class("A"));
    shared.declare_class(ClassSpec::new("D").contains("C")).unwrap();
    assert!(first.has_class("D"));
}

#[test]
fn test_reset_restores_builtins_only() {
    let system = chain();
    system.reset();

    assert!(!system.has_class("A"));
    assert!(system.has_class("numeric"));
    assert!(system.generic("initialize").is_some());
}

//! Class registry
//!
//! Holds every class definition by name together with the petgraph graph of
//! parent edges. Declaring a class that already exists replaces it: the old
//! parent edges are dropped and the new ones added, while objects built from
//! the old definition are left alone.

use crate::class::{
    base_types, is_base_type, is_reserved_name, ClassDef, ClassOrigin, SlotDef,
};
use crate::error::{ObjectError, Result};
use crate::graph::ClassGraph;
use crate::instance::assignable;
use indexmap::IndexMap;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Registry of class definitions and their inheritance edges
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    /// Map from class name to definition, in declaration order
    classes: IndexMap<String, ClassDef>,
    /// Parent edges, weighted by the parent's declared position
    graph: DiGraph<String, u32>,
    /// Map from class name to graph node
    nodes: HashMap<String, NodeIndex>,
}

impl ClassRegistry {
    /// Create a registry holding the built-in base types and `extra_base_types`
    pub fn new(extra_base_types: &[String]) -> Self {
        let mut registry = Self {
            classes: IndexMap::new(),
            graph: DiGraph::new(),
            nodes: HashMap::new(),
        };

        for (name, parent) in base_types() {
            let mut def = ClassDef::bare(name, ClassOrigin::Builtin);
            def.parents.extend(parent.map(str::to_string));
            registry.store(def);
        }
        for name in extra_base_types {
            if !registry.classes.contains_key(name) && !is_reserved_name(name) {
                registry.store(ClassDef::bare(name, ClassOrigin::Builtin));
            }
        }

        registry
    }

    /// Get a class definition by name
    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&ClassDef> {
        self.get(name).ok_or_else(|| ObjectError::unknown_class(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn graph(&self) -> ClassGraph<'_> {
        ClassGraph::new(&self.graph, &self.nodes)
    }

    /// Register or replace a declared class
    pub fn declare(&mut self, def: ClassDef) -> Result<ClassDef> {
        if is_reserved_name(&def.name) || self.is_builtin(&def.name) {
            return Err(ObjectError::ReservedClassName { class: def.name });
        }
        for parent in &def.parents {
            if !self.classes.contains_key(parent) {
                return Err(ObjectError::UnknownParent {
                    class: def.name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        if self.classes.contains_key(&def.name) {
            debug!(class = %def.name, "redefining class");
        } else {
            debug!(class = %def.name, parents = ?def.parents, "declaring class");
        }
        self.store(def.clone());
        Ok(def)
    }

    /// Register a class owned by a foreign object system as a slot-less root
    pub fn register_foreign(&mut self, name: &str) -> Result<ClassDef> {
        if is_reserved_name(name) || self.is_builtin(name) {
            return Err(ObjectError::ReservedClassName {
                class: name.to_string(),
            });
        }
        match self.classes.get(name) {
            Some(existing) if existing.origin == ClassOrigin::Foreign => Ok(existing.clone()),
            Some(_) => Err(ObjectError::DuplicateClass {
                class: name.to_string(),
            }),
            None => {
                debug!(class = %name, "registering foreign class");
                let def = ClassDef::bare(name, ClassOrigin::Foreign);
                self.store(def.clone());
                Ok(def)
            }
        }
    }

    /// Declare a virtual class and make it a parent of every member
    pub fn declare_union(&mut self, name: &str, members: &[String]) -> Result<ClassDef> {
        if is_reserved_name(name) || self.is_builtin(name) {
            return Err(ObjectError::ReservedClassName {
                class: name.to_string(),
            });
        }
        if let Some(unknown) = members.iter().find(|m| !self.classes.contains_key(*m)) {
            return Err(ObjectError::unknown_class(unknown));
        }

        let mut union = ClassDef::bare(name, ClassOrigin::Union);
        union.is_virtual = true;
        self.store(union.clone());

        for member in members {
            if let Some(def) = self.classes.get(member) {
                if def.parents.iter().any(|parent| parent == name) {
                    continue;
                }
                let mut def = def.clone();
                def.parents.push(name.to_string());
                self.store(def);
            }
        }

        debug!(union = %name, members = ?members, "declared class union");
        Ok(union)
    }

    /// Effective slots of a class: its own first, then each ancestor's in
    /// breadth-first order. The nearest declaration of a slot wins.
    pub fn effective_slots(&self, name: &str) -> Result<IndexMap<String, SlotDef>> {
        let graph = self.graph();
        let ancestors = graph
            .ancestors(name)
            .ok_or_else(|| ObjectError::unknown_class(name))?;

        let mut slots: IndexMap<String, SlotDef> = IndexMap::new();
        for (ancestor, _) in ancestors {
            let Some(def) = self.classes.get(&ancestor) else {
                continue;
            };
            for (slot, slot_def) in &def.slots {
                match slots.get_mut(slot) {
                    None => {
                        slots.insert(slot.clone(), slot_def.clone());
                    }
                    // Closer declaration without a prototype inherits the
                    // ancestor's, but only one its own type accepts
                    Some(existing) if existing.default.is_none() => {
                        existing.default = slot_def.default.clone().filter(|default| {
                            existing.declared_type == slot_def.declared_type
                                || assignable(&graph, &existing.declared_type, default)
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(slots)
    }

    fn is_builtin(&self, name: &str) -> bool {
        is_base_type(name)
            || matches!(self.classes.get(name), Some(def) if def.origin == ClassOrigin::Builtin)
    }

    fn store(&mut self, def: ClassDef) {
        let node = self.node_for(&def.name);

        while let Some(edge) = self.graph.first_edge(node, Direction::Outgoing) {
            self.graph.remove_edge(edge);
        }
        for (position, parent) in def.parents.iter().enumerate() {
            let parent_node = self.node_for(parent);
            self.graph.add_edge(node, parent_node, position as u32);
        }

        if algo::is_cyclic_directed(&self.graph) {
            warn!(class = %def.name, "class definition introduces an inheritance cycle");
        }

        self.classes.insert(def.name.clone(), def);
    }

    fn node_for(&mut self, name: &str) -> NodeIndex {
        if let Some(node) = self.nodes.get(name) {
            return *node;
        }
        let node = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), node);
        node
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{SlotType, ANY};
    use crate::value::Value;

    fn class(name: &str, parents: &[&str], slots: &[(&str, &str)]) -> ClassDef {
        let mut def = ClassDef::bare(name, ClassOrigin::Declared);
        def.parents = parents.iter().map(|p| p.to_string()).collect();
        for (slot, declared_type) in slots {
            def.slots.insert(
                slot.to_string(),
                SlotDef {
                    declared_type: SlotType::from(*declared_type),
                    default: None,
                },
            );
        }
        def
    }

    #[test]
    fn test_builtins_registered() {
        let registry = ClassRegistry::new(&["Date".to_string()]);

        assert!(registry.contains("numeric"));
        assert!(registry.contains("Date"));
        assert!(!registry.contains(ANY));
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_effective_slots_nearest_first() {
        let mut registry = ClassRegistry::default();
        registry
            .declare(class("Base", &[], &[("id", "numeric"), ("tag", "ANY")]))
            .unwrap();
        registry
            .declare(class("Child", &["Base"], &[("tag", "character"), ("extra", "list")]))
            .unwrap();

        let slots = registry.effective_slots("Child").unwrap();
        let names: Vec<&str> = slots.keys().map(String::as_str).collect();

        assert_eq!(names, vec!["tag", "extra", "id"]);
        assert_eq!(slots["tag"].declared_type, SlotType::from("character"));
    }

    #[test]
    fn test_inherited_default_must_fit_closer_type() {
        let mut registry = ClassRegistry::default();
        let mut base = class("Base", &[], &[("tag", "ANY"), ("size", "ANY")]);
        base.slots["tag"].default = Some(Value::numeric(1.0));
        base.slots["size"].default = Some(Value::numeric(2.0));
        registry.declare(base).unwrap();
        registry
            .declare(class("Child", &["Base"], &[("tag", "character"), ("size", "numeric")]))
            .unwrap();

        let slots = registry.effective_slots("Child").unwrap();
        assert_eq!(slots["tag"].default, None);
        assert_eq!(slots["size"].default, Some(Value::numeric(2.0)));
    }

    #[test]
    fn test_foreign_and_union_origins() {
        let mut registry = ClassRegistry::default();
        registry.declare(class("A", &[], &[])).unwrap();
        registry.register_foreign("Ext").unwrap();
        registry
            .declare_union("AOrExt", &["A".to_string(), "Ext".to_string()])
            .unwrap();

        assert_eq!(registry.get("Ext").map(|def| def.origin), Some(ClassOrigin::Foreign));
        assert_eq!(registry.get("AOrExt").map(|def| def.origin), Some(ClassOrigin::Union));
        assert!(registry.graph().is_subclass_of("Ext", "AOrExt"));
        // Foreign classes keep their identity across re-registration
        assert!(registry.register_foreign("Ext").is_ok());
        assert_eq!(registry.get("Ext").map(|def| def.parents.len()), Some(1));
    }
}

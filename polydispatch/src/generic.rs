//! Generic function registry
//!
//! A generic owns its formal parameter list, how many leading parameters take
//! part in dispatch, and the table of methods registered on it.

use crate::error::{ObjectError, Result};
use crate::graph::ClassGraph;
use crate::method::{MethodEntry, MethodFn, MethodTable, Signature, Specializer};
use indexmap::IndexMap;
use tracing::debug;

/// Name of the built-in construction hook generic
pub const INITIALIZE: &str = "initialize";
/// Formal parameter collecting unmatched arguments
pub const DOTS: &str = "...";

/// A declared generic function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generic {
    pub name: String,
    pub formal_params: Vec<String>,
    pub dispatch_arity: usize,
}

impl Generic {
    /// Whether unmatched arguments are accepted
    pub fn has_dots(&self) -> bool {
        self.formal_params.iter().any(|param| param == DOTS)
    }

    /// Position of a formal parameter, ignoring `...`
    pub fn param_index(&self, name: &str) -> Option<usize> {
        if name == DOTS {
            return None;
        }
        self.formal_params.iter().position(|param| param == name)
    }
}

#[derive(Debug, Clone)]
struct GenericEntry {
    generic: Generic,
    methods: MethodTable,
}

/// Registry of generics and their method tables
#[derive(Debug, Clone, Default)]
pub struct GenericRegistry {
    generics: IndexMap<String, GenericEntry>,
}

impl GenericRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a generic; redeclaring with the same arity keeps its methods
    pub fn declare(
        &mut self,
        name: &str,
        formal_params: Vec<String>,
        dispatch_arity: usize,
    ) -> Result<Generic> {
        if dispatch_arity == 0 || dispatch_arity > formal_params.len() {
            return Err(ObjectError::SignatureArity {
                generic: name.to_string(),
                expected: formal_params.len(),
                found: dispatch_arity,
            });
        }
        // `...` can't be dispatched on
        if let Some(dots_at) = formal_params.iter().position(|param| param == DOTS) {
            if dots_at < dispatch_arity {
                return Err(ObjectError::SignatureArity {
                    generic: name.to_string(),
                    expected: dots_at,
                    found: dispatch_arity,
                });
            }
        }

        let generic = Generic {
            name: name.to_string(),
            formal_params,
            dispatch_arity,
        };

        match self.generics.get_mut(name) {
            Some(existing) if existing.generic.dispatch_arity != dispatch_arity => {
                Err(ObjectError::DuplicateGeneric {
                    generic: name.to_string(),
                    existing: existing.generic.dispatch_arity,
                    requested: dispatch_arity,
                })
            }
            // Construction binds slot names through `...`
            Some(existing)
                if name == INITIALIZE && existing.generic.formal_params != generic.formal_params =>
            {
                Err(ObjectError::BuiltinGeneric {
                    generic: name.to_string(),
                })
            }
            Some(existing) => {
                existing.generic = generic.clone();
                Ok(generic)
            }
            None => {
                debug!(generic = %name, arity = dispatch_arity, "declaring generic");
                self.generics.insert(
                    name.to_string(),
                    GenericEntry {
                        generic: generic.clone(),
                        methods: MethodTable::new(),
                    },
                );
                Ok(generic)
            }
        }
    }

    /// Register a method after checking its signature against the generic and
    /// the class graph
    pub fn add_method(
        &mut self,
        graph: &ClassGraph<'_>,
        generic: &str,
        signature: Signature,
        implementation: MethodFn,
    ) -> Result<MethodEntry> {
        let entry = self
            .generics
            .get_mut(generic)
            .ok_or_else(|| ObjectError::unknown_generic(generic))?;

        if signature.len() != entry.generic.dispatch_arity {
            return Err(ObjectError::SignatureArity {
                generic: generic.to_string(),
                expected: entry.generic.dispatch_arity,
                found: signature.len(),
            });
        }
        for specializer in &signature {
            if let Specializer::Class(class) = specializer {
                if !graph.contains(class) {
                    return Err(ObjectError::UnknownSignatureClass {
                        generic: generic.to_string(),
                        class: class.clone(),
                    });
                }
            }
        }

        debug!(generic = %generic, signature = %signature, "declaring method");
        let method = MethodEntry::new(generic, signature, implementation);
        entry.methods.insert(method.clone());
        Ok(method)
    }

    pub fn remove_method(&mut self, generic: &str, signature: &Signature) -> Result<bool> {
        let entry = self
            .generics
            .get_mut(generic)
            .ok_or_else(|| ObjectError::unknown_generic(generic))?;
        Ok(entry.methods.remove(signature))
    }

    pub fn get(&self, name: &str) -> Option<&Generic> {
        self.generics.get(name).map(|entry| &entry.generic)
    }

    pub fn require(&self, name: &str) -> Result<(&Generic, &MethodTable)> {
        self.generics
            .get(name)
            .map(|entry| (&entry.generic, &entry.methods))
            .ok_or_else(|| ObjectError::unknown_generic(name))
    }

    pub fn methods(&self, name: &str) -> Option<&MethodTable> {
        self.generics.get(name).map(|entry| &entry.methods)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generics.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generics.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_arity_must_fit_formals() {
        let mut registry = GenericRegistry::new();

        assert!(registry.declare("f", params(&["x"]), 0).is_err());
        assert!(registry.declare("f", params(&["x"]), 2).is_err());
        assert!(registry.declare("f", params(&["...", "x"]), 1).is_err());
        assert!(registry.declare("f", params(&["x", "..."]), 1).is_ok());
        assert!(registry.contains("f"));
    }

    #[test]
    fn test_param_index_skips_dots() {
        let generic = Generic {
            name: "f".to_string(),
            formal_params: params(&["x", "...", "y"]),
            dispatch_arity: 1,
        };

        assert!(generic.has_dots());
        assert_eq!(generic.param_index("y"), Some(2));
        assert_eq!(generic.param_index("..."), None);
    }

    #[test]
    fn test_initialize_formals_are_fixed() {
        let mut registry = GenericRegistry::new();
        registry
            .declare(INITIALIZE, params(&[".Object", DOTS]), 1)
            .unwrap();

        assert_eq!(
            registry.declare(INITIALIZE, params(&["obj"]), 1).unwrap_err(),
            ObjectError::BuiltinGeneric {
                generic: INITIALIZE.to_string()
            }
        );
        assert!(registry.declare(INITIALIZE, params(&[".Object", DOTS]), 1).is_ok());
        assert_eq!(
            registry.get(INITIALIZE).map(|generic| generic.formal_params.clone()),
            Some(params(&[".Object", DOTS]))
        );
    }

    #[test]
    fn test_names_in_declaration_order() {
        let mut registry = GenericRegistry::new();
        registry.declare("b", params(&["x"]), 1).unwrap();
        registry.declare("a", params(&["x"]), 1).unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}

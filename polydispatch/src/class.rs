//! Class definitions: slots, parents and the built-in base types

use crate::instance::Instance;
use crate::value::Value;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

/// Marker accepting any class, in slot types and signatures
pub const ANY: &str = "ANY";
/// Marker matching an omitted argument in signatures
pub const MISSING: &str = "missing";

pub const NULL_CLASS: &str = "NULL";
pub const LOGICAL_CLASS: &str = "logical";
pub const INTEGER_CLASS: &str = "integer";
pub const NUMERIC_CLASS: &str = "numeric";
pub const CHARACTER_CLASS: &str = "character";
pub const LIST_CLASS: &str = "list";
pub const FUNCTION_CLASS: &str = "function";

lazy_static! {
    /// Built-in base types with their parent, in registration order
    static ref BASE_TYPES: IndexMap<&'static str, Option<&'static str>> = {
        let mut types = IndexMap::new();
        types.insert(NULL_CLASS, None);
        types.insert(LOGICAL_CLASS, None);
        types.insert(NUMERIC_CLASS, None);
        types.insert(INTEGER_CLASS, Some(NUMERIC_CLASS));
        types.insert(CHARACTER_CLASS, None);
        types.insert(LIST_CLASS, None);
        types.insert(FUNCTION_CLASS, None);
        types
    };
}

/// Iterate the built-in base types as (name, parent)
pub fn base_types() -> impl Iterator<Item = (&'static str, Option<&'static str>)> {
    BASE_TYPES.iter().map(|(name, parent)| (*name, *parent))
}

pub fn is_base_type(name: &str) -> bool {
    BASE_TYPES.contains_key(name)
}

/// Names that can never be declared as classes
pub fn is_reserved_name(name: &str) -> bool {
    name == ANY || name == MISSING || is_base_type(name)
}

/// Declared type of a slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotType {
    Any,
    Class(String),
}

impl SlotType {
    pub fn name(&self) -> &str {
        match self {
            SlotType::Any => ANY,
            SlotType::Class(name) => name,
        }
    }
}

impl From<&str> for SlotType {
    fn from(name: &str) -> Self {
        if name == ANY {
            SlotType::Any
        } else {
            SlotType::Class(name.to_string())
        }
    }
}

impl From<String> for SlotType {
    fn from(name: String) -> Self {
        SlotType::from(name.as_str())
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A slot declaration with an optional prototype value
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDef {
    pub declared_type: SlotType,
    pub default: Option<Value>,
}

/// Validity check run on a fully constructed object
pub type ValidityFn = Arc<dyn Fn(&Instance) -> std::result::Result<(), String> + Send + Sync>;

/// Where a class definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOrigin {
    Builtin,
    Declared,
    Union,
    Foreign,
}

/// A registered class
#[derive(Clone)]
pub struct ClassDef {
    pub name: String,
    pub slots: IndexMap<String, SlotDef>,
    pub parents: Vec<String>,
    pub is_virtual: bool,
    pub origin: ClassOrigin,
    pub validity: Option<ValidityFn>,
}

impl ClassDef {
    /// A slot-less, parent-less class of the given origin
    pub(crate) fn bare(name: &str, origin: ClassOrigin) -> Self {
        Self {
            name: name.to_string(),
            slots: IndexMap::new(),
            parents: Vec::new(),
            is_virtual: false,
            origin,
            validity: None,
        }
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("slots", &self.slots)
            .field("parents", &self.parents)
            .field("is_virtual", &self.is_virtual)
            .field("origin", &self.origin)
            .field("has_validity", &self.validity.is_some())
            .finish()
    }
}

/// Builder for a class declaration
///
/// ```
/// use polydispatch::{ClassSpec, ObjectSystem};
///
/// let system = ObjectSystem::new();
/// system
///     .declare_class(ClassSpec::new("Person").slot("name", "character").slot("age", "numeric"))
///     .unwrap();
/// system
///     .declare_class(ClassSpec::new("Student").contains("Person").slot("school", "character"))
///     .unwrap();
/// assert!(system.is_subclass_of("Student", "Person"));
/// ```
#[derive(Clone)]
pub struct ClassSpec {
    name: String,
    slots: IndexMap<String, SlotDef>,
    parents: Vec<String>,
    is_virtual: bool,
    validity: Option<ValidityFn>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: IndexMap::new(),
            parents: Vec::new(),
            is_virtual: false,
            validity: None,
        }
    }

    /// Declare a slot filled with the zero value of its type
    pub fn slot(mut self, name: impl Into<String>, declared_type: impl Into<SlotType>) -> Self {
        self.slots.insert(
            name.into(),
            SlotDef {
                declared_type: declared_type.into(),
                default: None,
            },
        );
        self
    }

    /// Declare a slot with a prototype value
    pub fn slot_with_default(
        mut self,
        name: impl Into<String>,
        declared_type: impl Into<SlotType>,
        default: impl Into<Value>,
    ) -> Self {
        self.slots.insert(
            name.into(),
            SlotDef {
                declared_type: declared_type.into(),
                default: Some(default.into()),
            },
        );
        self
    }

    /// Add a parent class; order of calls is the declared parent order
    pub fn contains(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn virtual_class(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn validity<F>(mut self, check: F) -> Self
    where
        F: Fn(&Instance) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validity = Some(Arc::new(check));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_def(self) -> ClassDef {
        ClassDef {
            name: self.name,
            slots: self.slots,
            parents: self.parents,
            is_virtual: self.is_virtual,
            origin: ClassOrigin::Declared,
            validity: self.validity,
        }
    }
}

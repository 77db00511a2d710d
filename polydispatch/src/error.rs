//! Error types for the object system
//!
//! Every failure is a variant of [`ObjectError`], reported through miette so
//! hosts get a stable diagnostic code and a hint. Ambiguous dispatch is the
//! only non-fatal condition and has its own warning type.

use crate::method::Signature;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by class, instance, generic and dispatch operations
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ObjectError {
    #[error("Unknown parent class '{parent}' for class '{class}'")]
    #[diagnostic(
        code(polydispatch::class::unknown_parent),
        help("Declare '{parent}' before any class that contains it")
    )]
    UnknownParent { class: String, parent: String },

    #[error("Unknown class '{class}'")]
    #[diagnostic(
        code(polydispatch::class::unknown_class),
        help("Declare the class with declare_class or register it with register_foreign_class")
    )]
    UnknownClass { class: String },

    #[error("Cannot instantiate virtual class '{class}'")]
    #[diagnostic(
        code(polydispatch::class::virtual_instantiation),
        help("Virtual classes only exist to be inherited from; construct a concrete subclass")
    )]
    VirtualInstantiation { class: String },

    #[error("Cannot construct an object of class '{class}'")]
    #[diagnostic(
        code(polydispatch::class::not_constructible),
        help("Base types and foreign classes are values, not objects; pass the value itself")
    )]
    NotConstructible { class: String },

    #[error("Class name '{class}' is reserved")]
    #[diagnostic(
        code(polydispatch::class::reserved_name),
        help("'ANY', 'missing' and the built-in base type names cannot be redeclared")
    )]
    ReservedClassName { class: String },

    #[error("Class '{class}' is already declared")]
    #[diagnostic(
        code(polydispatch::class::duplicate),
        help("A foreign class cannot shadow a class declared with declare_class")
    )]
    DuplicateClass { class: String },

    #[error("Invalid value for slot '{slot}' of class '{class}': expected {expected}, found {found}")]
    #[diagnostic(
        code(polydispatch::instance::slot_type),
        help("The value must be of class {expected} or one of its subclasses")
    )]
    SlotType {
        class: String,
        slot: String,
        expected: String,
        found: String,
    },

    #[error("No slot '{slot}' for an object of class '{class}'")]
    #[diagnostic(
        code(polydispatch::instance::unknown_slot),
        help("The slot is not declared by '{class}' or its ancestors under the current definition")
    )]
    UnknownSlot { class: String, slot: String },

    #[error("Invalid object of class '{class}': {message}")]
    #[diagnostic(code(polydispatch::instance::invalid_object))]
    InvalidObject { class: String, message: String },

    #[error("initialize for class '{class}' returned {found} instead of an object of that class")]
    #[diagnostic(
        code(polydispatch::instance::invalid_initialize_result),
        help("Construction hooks must return the object they were given, or the result of call_next")
    )]
    InvalidInitializeResult { class: String, found: String },

    #[error("Cannot seed an object of class '{class}' from an object of class '{seed}'")]
    #[diagnostic(
        code(polydispatch::instance::unrelated_seed),
        help("Unnamed construction arguments must be instances of an ancestor of '{class}'")
    )]
    UnrelatedSeed { class: String, seed: String },

    #[error("Generic '{generic}' already declared with dispatch arity {existing}, not {requested}")]
    #[diagnostic(
        code(polydispatch::generic::duplicate),
        help("Redeclaring a generic is only allowed with the same dispatch arity")
    )]
    DuplicateGeneric {
        generic: String,
        existing: usize,
        requested: usize,
    },

    #[error("The formal parameters of built-in generic '{generic}' cannot be changed")]
    #[diagnostic(
        code(polydispatch::generic::builtin_formals),
        help("Add methods to '{generic}' instead of redeclaring it")
    )]
    BuiltinGeneric { generic: String },

    #[error("Unknown generic '{generic}'")]
    #[diagnostic(
        code(polydispatch::generic::unknown),
        help("Declare the generic with declare_generic before adding methods or invoking it")
    )]
    UnknownGeneric { generic: String },

    #[error("Signature arity mismatch for '{generic}': expected {expected} entries, found {found}")]
    #[diagnostic(
        code(polydispatch::generic::signature_arity),
        help("A signature has one entry per dispatched parameter")
    )]
    SignatureArity {
        generic: String,
        expected: usize,
        found: usize,
    },

    #[error("Signature for '{generic}' names unknown class '{class}'")]
    #[diagnostic(
        code(polydispatch::generic::unknown_signature_class),
        help("Use a declared class, ANY or missing")
    )]
    UnknownSignatureClass { generic: String, class: String },

    #[error("Unknown argument '{name}' for generic '{generic}'")]
    #[diagnostic(
        code(polydispatch::dispatch::unknown_argument),
        help("Named arguments must match a formal parameter unless the generic declares '...'")
    )]
    UnknownArgument { generic: String, name: String },

    #[error("Unable to find an inherited method for '{generic}' for signature ({arg_classes})")]
    #[diagnostic(
        code(polydispatch::dispatch::no_applicable_method),
        help("Declare a method for these classes, an ancestor of them, or ANY")
    )]
    NoApplicableMethod { generic: String, arg_classes: String },

    #[error("No next method available for '{generic}' from signature {signature}")]
    #[diagnostic(
        code(polydispatch::dispatch::no_next_method),
        help("Check has_next_method before calling call_next")
    )]
    NoNextMethod { generic: String, signature: Signature },

    #[error("Dispatch depth limit of {max_depth} exceeded while calling '{generic}'")]
    #[diagnostic(
        code(polydispatch::dispatch::loop_detected),
        help("A method or construction hook keeps delegating back into dispatch")
    )]
    DispatchLoop { generic: String, max_depth: usize },

    #[error("Method {signature} of '{generic}' failed: {message}")]
    #[diagnostic(code(polydispatch::dispatch::method_failed))]
    MethodFailed {
        generic: String,
        signature: Signature,
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(polydispatch::config::invalid))]
    Config { message: String },
}

impl ObjectError {
    /// Create an unknown class error
    pub fn unknown_class(class: &str) -> Self {
        Self::UnknownClass {
            class: class.to_string(),
        }
    }

    /// Create an unknown slot error
    pub fn unknown_slot(class: &str, slot: &str) -> Self {
        Self::UnknownSlot {
            class: class.to_string(),
            slot: slot.to_string(),
        }
    }

    /// Create an unknown generic error
    pub fn unknown_generic(generic: &str) -> Self {
        Self::UnknownGeneric {
            generic: generic.to_string(),
        }
    }

    /// Create an invalid object error
    pub fn invalid_object(class: &str, message: impl Into<String>) -> Self {
        Self::InvalidObject {
            class: class.to_string(),
            message: message.into(),
        }
    }
}

/// Non-fatal diagnostic raised when several methods tie for the best score
///
/// Dispatch still proceeds with `selected`, the tied signature that sorts
/// first.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error(
    "Ambiguous dispatch for '{generic}' on ({arg_classes}): selected {selected} over {}",
    join_signatures(.tied)
)]
#[diagnostic(
    code(polydispatch::dispatch::ambiguous),
    severity(Warning),
    help("Declare a method for ({arg_classes}) to make the choice explicit")
)]
pub struct AmbiguousDispatchWarning {
    pub generic: String,
    pub arg_classes: String,
    pub selected: Signature,
    pub tied: Vec<Signature>,
}

fn join_signatures(signatures: &[Signature]) -> String {
    signatures
        .iter()
        .map(|signature| signature.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type alias for object system results
pub type Result<T> = std::result::Result<T, ObjectError>;

//! Polydispatch
//!
//! A runtime object system with typed slots and multiple dispatch.

// Allow clippy lints for development
#![allow(clippy::uninlined_format_args)]
//!
//! ## Architecture
//!
//! - **Classes**: named slot sets with ordered parents, held in a registry
//!   backed by a petgraph graph of parent edges
//! - **Instances**: objects whose slots are checked against the current
//!   class definition on every access
//! - **Generics**: functions dispatching on the classes of their leading
//!   arguments, each owning a method table
//! - **Dispatch**: minimal total inheritance distance wins, `ANY` scores
//!   below every concrete class, ties are broken lexicographically and
//!   reported as warnings, and each method can call its next method
//!
//! Everything hangs off an [`ObjectSystem`] handle; independent handles
//! share nothing.
//!
//! ```
//! use polydispatch::{Arguments, ClassSpec, ObjectSystem, Value};
//!
//! let system = ObjectSystem::new();
//! system.declare_class(ClassSpec::new("Shape")).unwrap();
//! system
//!     .declare_class(ClassSpec::new("Circle").contains("Shape").slot("r", "numeric"))
//!     .unwrap();
//!
//! system.declare_generic("area", ["shape"], 1).unwrap();
//! system
//!     .declare_method("area", ["Circle"], |call| {
//!         let circle = call.required("shape")?.as_instance().cloned();
//!         let circle = circle.ok_or_else(|| call.fail("not a circle"))?;
//!         let r = call.system().get_slot(&circle, "r")?.as_f64().unwrap_or(0.0);
//!         Ok(Value::numeric(std::f64::consts::PI * r * r))
//!     })
//!     .unwrap();
//!
//! let circle = system.construct("Circle", [("r", 2.0)]).unwrap();
//! let area = system.invoke("area", Arguments::new().arg(circle)).unwrap();
//! assert!((area.as_f64().unwrap() - 12.566).abs() < 0.001);
//! ```

pub mod class;
pub mod config;
pub mod construct;
pub mod dispatch;
pub mod error;
pub mod generic;
pub mod graph;
pub mod instance;
pub mod interop;
pub mod method;
pub mod registry;
pub mod system;
pub mod value;

// Re-export public API
pub use class::{ClassDef, ClassOrigin, ClassSpec, SlotDef, SlotType, ValidityFn, ANY, MISSING};
pub use config::{ClassConfig, DispatchConfig, SystemConfig};
pub use dispatch::{Arguments, BoundArguments, MethodCall, Resolution};
pub use error::{AmbiguousDispatchWarning, ObjectError, Result};
pub use generic::{Generic, INITIALIZE};
pub use graph::Distance;
pub use instance::Instance;
pub use interop::{default_render, RenderFn};
pub use method::{MethodEntry, MethodFn, Signature, Specializer};
pub use system::ObjectSystem;
pub use value::{ForeignObject, NativeFunction, Value};

#[cfg(test)]
mod tests;
